//! Refugee choropleth library
//!
//! Turns two World Bank CSV exports (population and refugee counts) into one
//! choropleth world map per year, colored by refugees per N inhabitants with
//! a fixed-band stacked legend.
//!
//! Module organization:
//! - `config`: run configuration, legend banding, map bounds
//! - `tables`: CSV loading and per-capita ratio derivation
//! - `bands`: partitioning a year's ratios into legend bands
//! - `figure`: layout chrome and figure assembly
//! - `render`: HTML output and external image export
//! - `pipeline`: the per-year loop tying it all together

pub mod bands;
pub mod config;
pub mod error;
pub mod figure;
pub mod pipeline;
pub mod render;
pub mod tables;
