//! Run configuration
//!
//! All configuration is carried by plain value structs constructed fresh per
//! run. Band thresholds and colors travel together in [`BandSpec`] so a
//! length mismatch is caught up front instead of surfacing as a skewed
//! legend, and geographic bounds are validated before any layout is built.

use std::path::PathBuf;

use crate::error::{ChoroplethError, Result};

/// Threshold/color banding for the choropleth legend.
///
/// `thresholds` holds N increasing values; adjacent pairs define N-1 bands.
/// `colors` holds N `rgb(r,g,b)` strings; band i spans the two-stop gradient
/// `colors[i]..colors[i+1]`. The two sequences must have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct BandSpec {
    pub thresholds: Vec<f64>,
    pub colors: Vec<String>,
}

impl Default for BandSpec {
    fn default() -> Self {
        BandSpec {
            thresholds: vec![0.0, 0.5, 1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0],
            colors: [
                "rgb(247,244,249)",
                "rgb(231,225,239)",
                "rgb(212,185,218)",
                "rgb(201,148,199)",
                "rgb(223,101,176)",
                "rgb(231,41,138)",
                "rgb(206,18,86)",
                "rgb(152,0,67)",
                "rgb(103,0,31)",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
        }
    }
}

impl BandSpec {
    /// Number of color stops (N). Bands are `N - 1`.
    pub fn n_stops(&self) -> usize {
        self.thresholds.len()
    }

    /// Validate the spec: equal lengths, at least two stops, strictly
    /// increasing thresholds. Called by the bucketizer before any band is
    /// produced.
    pub fn validate(&self) -> Result<()> {
        if self.thresholds.len() != self.colors.len() {
            return Err(ChoroplethError::Config(format!(
                "thresholds and colors must have the same length ({} != {})",
                self.thresholds.len(),
                self.colors.len()
            )));
        }
        if self.thresholds.len() < 2 {
            return Err(ChoroplethError::Config(format!(
                "need at least two thresholds to form a band, got {}",
                self.thresholds.len()
            )));
        }
        for pair in self.thresholds.windows(2) {
            if pair[0] >= pair[1] {
                return Err(ChoroplethError::Config(format!(
                    "thresholds must be strictly increasing ({} >= {})",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(())
    }
}

/// Geographic view bounds for the map projection.
///
/// Defaults frame Europe, northern Africa and western Asia, matching the
/// region where most of the source data concentrates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    /// Longitude range, degrees east
    pub longitude: [f64; 2],
    /// Latitude range, degrees north
    pub latitude: [f64; 2],
}

impl Default for GeoBounds {
    fn default() -> Self {
        GeoBounds {
            longitude: [-10.0, 70.0],
            latitude: [20.0, 70.0],
        }
    }
}

impl GeoBounds {
    /// Reject non-increasing ranges before they reach the layout.
    pub fn validate(&self) -> Result<()> {
        if self.longitude[0] >= self.longitude[1] {
            return Err(ChoroplethError::InvalidRange {
                axis: "longitude",
                low: self.longitude[0],
                high: self.longitude[1],
            });
        }
        if self.latitude[0] >= self.latitude[1] {
            return Err(ChoroplethError::InvalidRange {
                axis: "latitude",
                low: self.latitude[0],
                high: self.latitude[1],
            });
        }
        Ok(())
    }
}

/// Where rendered figures go.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputMode {
    /// Rewrite a single HTML file per year and pause between iterations so
    /// an external viewer can load each figure before it is overwritten.
    Interactive {
        html_path: PathBuf,
        delay_secs: u64,
    },
    /// Export one JPEG per year into a directory (created on demand).
    Export { directory: PathBuf },
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Interactive {
            html_path: PathBuf::from("refugees.html"),
            delay_secs: 2,
        }
    }
}

/// Full configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Population counts CSV (World Bank export)
    pub population_csv: PathBuf,

    /// Refugee counts CSV (World Bank export)
    pub refugees_csv: PathBuf,

    /// First year to render, inclusive
    pub first_year: i32,

    /// Last year to render, inclusive
    pub last_year: i32,

    /// Ratios are expressed per this many inhabitants
    pub per_n_people: f64,

    /// Interactive HTML or still-image export
    pub mode: OutputMode,

    /// Legend banding
    pub bands: BandSpec,

    /// Map view bounds
    pub bounds: GeoBounds,

    /// External plotly image exporter executable
    pub orca_executable: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            population_csv: PathBuf::from("population.csv"),
            refugees_csv: PathBuf::from("refugees.csv"),
            first_year: 1990,
            last_year: 2017,
            per_n_people: 1000.0,
            mode: OutputMode::default(),
            bands: BandSpec::default(),
            bounds: GeoBounds::default(),
            orca_executable: PathBuf::from("orca"),
        }
    }
}

impl RunConfig {
    /// Year column keys in render order ("1990", "1991", ...).
    pub fn year_keys(&self) -> Vec<String> {
        (self.first_year..=self.last_year)
            .map(|y| y.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_band_spec_is_valid() {
        let spec = BandSpec::default();
        assert_eq!(spec.thresholds.len(), spec.colors.len());
        assert_eq!(spec.n_stops(), 9);
        spec.validate().unwrap();
    }

    #[test]
    fn test_band_spec_length_mismatch() {
        let spec = BandSpec {
            thresholds: vec![0.0, 1.0, 2.0],
            colors: vec!["rgb(0,0,0)".to_string(), "rgb(255,255,255)".to_string()],
        };
        let err = spec.validate().unwrap_err();
        assert!(matches!(err, ChoroplethError::Config(_)));
    }

    #[test]
    fn test_band_spec_non_increasing() {
        let spec = BandSpec {
            thresholds: vec![0.0, 5.0, 5.0],
            colors: vec![
                "rgb(0,0,0)".to_string(),
                "rgb(128,128,128)".to_string(),
                "rgb(255,255,255)".to_string(),
            ],
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_band_spec_too_short() {
        let spec = BandSpec {
            thresholds: vec![0.0],
            colors: vec!["rgb(0,0,0)".to_string()],
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_geo_bounds_validation() {
        GeoBounds::default().validate().unwrap();

        let bad = GeoBounds {
            longitude: [70.0, -10.0],
            latitude: [20.0, 70.0],
        };
        let err = bad.validate().unwrap_err();
        assert!(matches!(
            err,
            ChoroplethError::InvalidRange {
                axis: "longitude",
                ..
            }
        ));
    }

    #[test]
    fn test_year_keys() {
        let config = RunConfig {
            first_year: 2000,
            last_year: 2002,
            ..RunConfig::default()
        };
        assert_eq!(config.year_keys(), vec!["2000", "2001", "2002"]);
    }
}
