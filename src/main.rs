//! Refugee choropleth - command line entry point
//!
//! Maps refugees per N inhabitants, one world map per year, from two World
//! Bank CSV exports. By default the maps cycle through a single HTML file
//! for an open browser tab; with `--export` each year is written as a JPEG
//! instead.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::error;
use tracing_subscriber::EnvFilter;

use refugee_choropleth::config::{OutputMode, RunConfig};
use refugee_choropleth::pipeline;

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env).init();

    let args: Vec<String> = std::env::args().collect();
    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(e) = pipeline::run(&config) {
        error!("run failed: {e}");
        std::process::exit(1);
    }
    Ok(())
}

/// Parse command-line arguments into a RunConfig
fn parse_args(args: &[String]) -> Result<RunConfig> {
    let mut config = RunConfig::default();
    let mut export = false;
    let mut out_dir: Option<PathBuf> = None;
    let mut html_path: Option<PathBuf> = None;
    let mut delay_secs: Option<u64> = None;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--export" => {
                export = true;
                i += 1;
                continue;
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            _ => {}
        }

        let Some(value) = args.get(i + 1) else {
            bail!("missing value for {flag}");
        };
        match flag {
            "--population" => config.population_csv = PathBuf::from(value),
            "--refugees" => config.refugees_csv = PathBuf::from(value),
            "--from" => {
                config.first_year = value
                    .parse()
                    .with_context(|| format!("invalid --from year '{value}'"))?
            }
            "--to" => {
                config.last_year = value
                    .parse()
                    .with_context(|| format!("invalid --to year '{value}'"))?
            }
            "--scale" => {
                config.per_n_people = value
                    .parse()
                    .with_context(|| format!("invalid --scale '{value}'"))?
            }
            "--out-dir" => out_dir = Some(PathBuf::from(value)),
            "--html" => html_path = Some(PathBuf::from(value)),
            "--delay" => {
                delay_secs = Some(
                    value
                        .parse()
                        .with_context(|| format!("invalid --delay '{value}'"))?,
                )
            }
            "--orca" => config.orca_executable = PathBuf::from(value),
            other => bail!("unknown argument '{other}'"),
        }
        i += 2;
    }

    if config.first_year > config.last_year {
        bail!(
            "--from {} is after --to {}",
            config.first_year,
            config.last_year
        );
    }

    config.mode = if export {
        OutputMode::Export {
            directory: out_dir.unwrap_or_else(|| PathBuf::from("images")),
        }
    } else {
        let default = OutputMode::default();
        let (default_html, default_delay) = match default {
            OutputMode::Interactive {
                html_path,
                delay_secs,
            } => (html_path, delay_secs),
            OutputMode::Export { .. } => unreachable!(),
        };
        OutputMode::Interactive {
            html_path: html_path.unwrap_or(default_html),
            delay_secs: delay_secs.unwrap_or(default_delay),
        }
    };

    Ok(config)
}

fn print_usage() {
    eprintln!(
        "Usage: refugee_choropleth [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --population <FILE>  Population CSV (default: population.csv)\n\
         \x20 --refugees <FILE>    Refugee CSV (default: refugees.csv)\n\
         \x20 --from <YEAR>        First year (default: 1990)\n\
         \x20 --to <YEAR>          Last year, inclusive (default: 2017)\n\
         \x20 --scale <N>          Ratio per N inhabitants (default: 1000)\n\
         \x20 --export             Write JPEGs instead of refreshing HTML\n\
         \x20 --out-dir <DIR>      Image directory for --export (default: images)\n\
         \x20 --html <FILE>        HTML output path (default: refugees.html)\n\
         \x20 --delay <SECS>       Pause between interactive renders (default: 2)\n\
         \x20 --orca <PATH>        plotly image exporter executable (default: orca)"
    );
}
