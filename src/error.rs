use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building or rendering choropleth figures
#[derive(Debug, Error)]
pub enum ChoroplethError {
    /// Band configuration error (threshold/color mismatch, bad ordering)
    #[error("configuration error: {0}")]
    Config(String),

    /// A requested column is absent from a source table
    #[error("column '{column}' not found in {table} table")]
    MissingColumn { column: String, table: &'static str },

    /// Malformed geographic bounding range
    #[error("invalid {axis} range: [{low}, {high}] is not increasing")]
    InvalidRange { axis: &'static str, low: f64, high: f64 },

    /// CSV loading or DataFrame error
    #[error("table error: {0}")]
    Frame(#[from] polars::prelude::PolarsError),

    /// Figure serialization error
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The external image exporter failed
    #[error("image export failed for {path}: {reason}")]
    Render { path: PathBuf, reason: String },
}

/// Type alias for Results using ChoroplethError
pub type Result<T> = std::result::Result<T, ChoroplethError>;
