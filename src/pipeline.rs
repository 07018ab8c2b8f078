//! Per-year map generation pipeline
//!
//! The pipeline:
//! 1. Loads the population and refugee tables
//! 2. Derives the scaled per-capita ratio table
//! 3. For each configured year: buckets values into legend bands, builds the
//!    layout, assembles the figure, renders it
//!
//! Fully sequential; one year finishes before the next starts. The only
//! pause is the configured inter-render delay in interactive mode, which
//! gives an external viewer time to load each figure before the same HTML
//! file is overwritten. Errors abort the run immediately; every step is
//! deterministic, so retrying could not change the outcome.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use crate::bands::bucketize;
use crate::config::{OutputMode, RunConfig};
use crate::error::Result;
use crate::figure::{assemble, build_layout};
use crate::render;
use crate::tables::{load_table, ratio_table};

/// Run the full pipeline for the configured year range.
pub fn run(config: &RunConfig) -> Result<()> {
    let years = config.year_keys();

    info!(
        population = %config.population_csv.display(),
        refugees = %config.refugees_csv.display(),
        "loading source tables"
    );
    let population = load_table(&config.population_csv)?;
    let refugees = load_table(&config.refugees_csv)?;

    info!(
        countries = refugees.height(),
        years = years.len(),
        per_n_people = config.per_n_people,
        "computing ratio table"
    );
    let ratio = ratio_table(&refugees, &population, &years, config.per_n_people)?;

    if let OutputMode::Export { directory } = &config.mode {
        prepare_output_directory(directory)?;
    }

    for (i, year) in years.iter().enumerate() {
        let bands = bucketize(&ratio, year, &config.bands)?;
        let layout = build_layout(year, config.per_n_people, &config.bounds)?;
        let figure = assemble(&bands, layout);

        match &config.mode {
            OutputMode::Interactive {
                html_path,
                delay_secs,
            } => {
                render::write_html(&figure, html_path)?;
                info!(year = %year, path = %html_path.display(), "rendered figure");
                // Skip the pause after the final year; there is nothing left
                // to overwrite.
                if *delay_secs > 0 && i + 1 < years.len() {
                    std::thread::sleep(Duration::from_secs(*delay_secs));
                }
            }
            OutputMode::Export { directory } => {
                let out = image_path(directory, year);
                render::export_image(&figure, &out, &config.orca_executable)?;
                info!(year = %year, path = %out.display(), "exported figure");
            }
        }
    }

    info!(years = years.len(), "run complete");
    Ok(())
}

/// Create the export directory. A pre-existing directory is fine; its
/// contents get overwritten.
fn prepare_output_directory(directory: &Path) -> Result<()> {
    match fs::create_dir(directory) {
        Ok(()) => {
            info!(path = %directory.display(), "created output directory");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            info!(path = %directory.display(), "output directory exists, overwriting");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn image_path(directory: &Path, year: &str) -> PathBuf {
    directory.join(format!("{year}.jpg"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_world_bank_csv(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "\"Data Source\",\"World Development Indicators\"").unwrap();
        writeln!(file, "\"Last Updated Date\",\"2019-01-30\"").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "\"Country Name\",\"Country Code\",\"2000\",\"2001\"").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        path
    }

    fn test_config(dir: &Path) -> RunConfig {
        let population = write_world_bank_csv(
            dir,
            "population.csv",
            &[
                "\"United States\",\"USA\",100,100",
                "\"France\",\"FRA\",50,50",
            ],
        );
        let refugees = write_world_bank_csv(
            dir,
            "refugees.csv",
            &[
                "\"United States\",\"USA\",10,20",
                "\"France\",\"FRA\",5,10",
            ],
        );

        RunConfig {
            population_csv: population,
            refugees_csv: refugees,
            first_year: 2000,
            last_year: 2001,
            mode: OutputMode::Interactive {
                html_path: dir.join("refugees.html"),
                delay_secs: 0,
            },
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_interactive_run_writes_html() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        run(&config).unwrap();

        let page = std::fs::read_to_string(dir.path().join("refugees.html")).unwrap();
        // last iteration wins: the file holds the final year
        assert!(page.contains("Refugees per 1000 inhabitants in 2001"));
        assert!(page.contains("USA"));
        assert!(page.contains("FRA"));
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        run(&config).unwrap();
        let first = std::fs::read(dir.path().join("refugees.html")).unwrap();
        run(&config).unwrap();
        let second = std::fs::read(dir.path().join("refugees.html")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_year_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            first_year: 1980,
            last_year: 1981,
            ..test_config(dir.path())
        };

        assert!(run(&config).is_err());
        assert!(!dir.path().join("refugees.html").exists());
    }

    #[test]
    fn test_prepare_output_directory_tolerates_existing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("images");

        prepare_output_directory(&out).unwrap();
        assert!(out.is_dir());
        // second call must not fail
        prepare_output_directory(&out).unwrap();
    }

    #[test]
    fn test_image_path_naming() {
        assert_eq!(
            image_path(Path::new("images"), "1990"),
            PathBuf::from("images/1990.jpg")
        );
    }
}
