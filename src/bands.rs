//! Value-to-band partitioning for the fixed-band legend
//!
//! A band is one gap between two adjacent legend thresholds. Every country
//! whose scaled ratio falls inside the gap becomes a member of that band and
//! is later drawn as part of one choropleth trace with the band's two-stop
//! gradient. Band i of N stops owns a fixed slice of the colorbar column, so
//! empty bands still have to be emitted: a placeholder row keeps the legend
//! segment visible without coloring any real country.

use polars::prelude::DataFrame;

use crate::config::BandSpec;
use crate::error::Result;
use crate::tables::{numeric_column, string_column, COUNTRY_CODE, COUNTRY_NAME, RATIO_TABLE};

/// Location code used for the synthetic member of an empty band. Not a real
/// ISO-3 code, so the renderer colors no country for it.
pub const PLACEHOLDER_LOCATION: &str = "NOP";

/// Vertical offset of the whole colorbar stack, as a fraction of plot height.
const COLORBAR_Y_OFFSET: f64 = 0.12;

/// One legend band for one year.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    /// Value range covered by this band
    pub range: (f64, f64),
    /// Gradient endpoints, `rgb(r,g,b)` strings
    pub colors: (String, String),
    /// Member country codes (or the placeholder)
    pub locations: Vec<String>,
    /// Member values, same order as `locations`
    pub values: Vec<f64>,
    /// Member country names, used for hover text
    pub names: Vec<String>,
    /// Position of this band in the colorbar stack
    pub index: usize,
    /// Total number of color stops (N)
    pub n_stops: usize,
}

impl Band {
    /// Whether this band holds no real data, only the placeholder row.
    pub fn is_placeholder(&self) -> bool {
        self.locations.as_slice() == [PLACEHOLDER_LOCATION]
    }

    /// Vertical position of this band's colorbar segment: `i/N + 0.12`.
    pub fn colorbar_y(&self) -> f64 {
        self.index as f64 / self.n_stops as f64 + COLORBAR_Y_OFFSET
    }

    /// Length of this band's colorbar segment: `1/N`.
    pub fn colorbar_len(&self) -> f64 {
        1.0 / self.n_stops as f64
    }

    /// Tick spacing, one tick per band edge.
    pub fn tick_spacing(&self) -> f64 {
        self.range.1 - self.range.0
    }
}

/// Partition one year of the ratio table into legend bands.
///
/// Band i covers `thresholds[i] <= v < thresholds[i+1]`; the final band is
/// closed at the top so the country sitting exactly on the last threshold is
/// kept. Null cells and values outside the full threshold range belong to no
/// band. The band spec is validated first; on failure no bands are produced.
pub fn bucketize(ratio: &DataFrame, year: &str, spec: &BandSpec) -> Result<Vec<Band>> {
    spec.validate()?;

    let names = string_column(ratio, COUNTRY_NAME, RATIO_TABLE)?;
    let codes = string_column(ratio, COUNTRY_CODE, RATIO_TABLE)?;
    let values = numeric_column(ratio, year, RATIO_TABLE)?;

    let rows: Vec<(String, String, f64)> = codes
        .into_iter()
        .zip(names)
        .zip(values)
        .filter_map(|((code, name), value)| {
            Some((code?.to_string(), name.unwrap_or_default().to_string(), value?))
        })
        .collect();

    let n_stops = spec.n_stops();
    let mut bands = Vec::with_capacity(n_stops - 1);

    for i in 0..n_stops - 1 {
        let lo = spec.thresholds[i];
        let hi = spec.thresholds[i + 1];
        let top_band = i == n_stops - 2;

        let mut band = Band {
            range: (lo, hi),
            colors: (spec.colors[i].clone(), spec.colors[i + 1].clone()),
            locations: Vec::new(),
            values: Vec::new(),
            names: Vec::new(),
            index: i,
            n_stops,
        };

        for (code, name, value) in &rows {
            let inside = *value >= lo && (*value < hi || (top_band && *value == hi));
            if inside {
                band.locations.push(code.clone());
                band.values.push(*value);
                band.names.push(name.clone());
            }
        }

        if band.locations.is_empty() {
            band.locations.push(PLACEHOLDER_LOCATION.to_string());
            band.values.push(0.0);
        }

        bands.push(band);
    }

    Ok(bands)
}
