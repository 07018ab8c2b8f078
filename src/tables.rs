//! Source table loading and per-capita ratio derivation
//!
//! Both inputs are World Bank CSV exports: a few lines of file metadata, a
//! header row with `Country Name`, `Country Code` and one column per year,
//! then one row per country. Loading goes through polars; the derived ratio
//! table keeps the refugee table's row order and carries one f64 column per
//! requested year.
//!
//! Rows from the two tables are matched by country code, not by position, so
//! the derivation stays correct even if one export is sorted differently.
//! A country missing from the population table, a null cell on either side,
//! or a zero population all yield a null ratio for that cell. Null cells are
//! later excluded from every band; they never abort the run.

use std::collections::HashMap;
use std::path::Path;

use polars::prelude::*;

use crate::error::{ChoroplethError, Result};

/// Country display name column
pub const COUNTRY_NAME: &str = "Country Name";
/// ISO-3 country code column
pub const COUNTRY_CODE: &str = "Country Code";

/// Leading file-metadata lines before the header in World Bank exports
pub const METADATA_ROWS: usize = 3;

pub(crate) const POPULATION_TABLE: &str = "population";
pub(crate) const REFUGEES_TABLE: &str = "refugees";
pub(crate) const RATIO_TABLE: &str = "ratio";

/// Load a World Bank CSV into a DataFrame, skipping the metadata lines.
pub fn load_table(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_skip_rows(METADATA_ROWS)
        .with_has_header(true)
        .with_infer_schema_length(Some(500))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded table"
    );
    Ok(df)
}

/// Fetch a column or fail with the table it was missing from.
pub(crate) fn column<'a>(
    df: &'a DataFrame,
    name: &str,
    table: &'static str,
) -> Result<&'a Column> {
    df.column(name).map_err(|_| ChoroplethError::MissingColumn {
        column: name.to_string(),
        table,
    })
}

/// String column accessor used for country names and codes.
pub(crate) fn string_column<'a>(
    df: &'a DataFrame,
    name: &str,
    table: &'static str,
) -> Result<&'a StringChunked> {
    Ok(column(df, name, table)?.as_materialized_series().str()?)
}

/// Year column as f64 cells; integer-typed CSV columns are cast.
pub(crate) fn numeric_column(
    df: &DataFrame,
    name: &str,
    table: &'static str,
) -> Result<Vec<Option<f64>>> {
    let series = column(df, name, table)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

/// Derive the per-capita ratio table.
///
/// Output columns: `Country Name`, `Country Code` (cloned from the refugees
/// table, preserving its row order) plus one f64 column per entry of `years`
/// holding `refugees / population * per_n_people`.
///
/// Fails with [`ChoroplethError::MissingColumn`] if a requested year column
/// is absent from either input. Does not mutate its inputs.
pub fn ratio_table(
    refugees: &DataFrame,
    population: &DataFrame,
    years: &[String],
    per_n_people: f64,
) -> Result<DataFrame> {
    let refugee_codes = string_column(refugees, COUNTRY_CODE, REFUGEES_TABLE)?;
    let population_codes = string_column(population, COUNTRY_CODE, POPULATION_TABLE)?;

    // Population row lookup keyed by country code. First occurrence wins if
    // an export ever repeats a code.
    let mut population_rows: HashMap<&str, usize> =
        HashMap::with_capacity(population_codes.len());
    for (idx, code) in population_codes.into_iter().enumerate() {
        if let Some(code) = code {
            population_rows.entry(code).or_insert(idx);
        }
    }

    let mut columns: Vec<Column> = vec![
        column(refugees, COUNTRY_NAME, REFUGEES_TABLE)?.clone(),
        column(refugees, COUNTRY_CODE, REFUGEES_TABLE)?.clone(),
    ];

    for year in years {
        let refugee_counts = numeric_column(refugees, year, REFUGEES_TABLE)?;
        let population_counts = numeric_column(population, year, POPULATION_TABLE)?;

        let ratios: Vec<Option<f64>> = refugee_codes
            .into_iter()
            .enumerate()
            .map(|(row, code)| {
                let refugee_count = refugee_counts.get(row).copied().flatten()?;
                let population_row = *population_rows.get(code?)?;
                let population_count = population_counts.get(population_row).copied().flatten()?;
                if population_count == 0.0 {
                    None
                } else {
                    Some(refugee_count / population_count * per_n_people)
                }
            })
            .collect();

        columns.push(Column::new(year.as_str().into(), ratios));
    }

    let ratio = DataFrame::new(columns)?;
    tracing::debug!(rows = ratio.height(), years = years.len(), "derived ratio table");
    Ok(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn refugees_frame() -> DataFrame {
        df!(
            COUNTRY_NAME => ["United States", "France", "Pakistan"],
            COUNTRY_CODE => ["USA", "FRA", "PAK"],
            "2000" => [Some(10.0), Some(5.0), None],
            "2001" => [Some(20.0), Some(10.0), Some(3.0)]
        )
        .unwrap()
    }

    fn population_frame() -> DataFrame {
        df!(
            COUNTRY_NAME => ["United States", "France", "Pakistan"],
            COUNTRY_CODE => ["USA", "FRA", "PAK"],
            "2000" => [Some(100.0), Some(50.0), Some(30.0)],
            "2001" => [Some(100.0), Some(0.0), None]
        )
        .unwrap()
    }

    fn cell(df: &DataFrame, year: &str, row: usize) -> Option<f64> {
        df.column(year)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .get(row)
    }

    #[test]
    fn test_ratio_matches_division() {
        let ratio = ratio_table(
            &refugees_frame(),
            &population_frame(),
            &["2000".to_string()],
            1000.0,
        )
        .unwrap();

        // 10/100 * 1000 and 5/50 * 1000: both land on 100
        assert_eq!(cell(&ratio, "2000", 0), Some(100.0));
        assert_eq!(cell(&ratio, "2000", 1), Some(100.0));
    }

    #[test]
    fn test_row_order_follows_refugees_table() {
        let refugees = refugees_frame();
        let ratio = ratio_table(&refugees, &population_frame(), &["2000".to_string()], 1000.0)
            .unwrap();

        let codes_of = |df: &DataFrame| -> Vec<Option<String>> {
            df.column(COUNTRY_CODE)
                .unwrap()
                .as_materialized_series()
                .str()
                .unwrap()
                .into_iter()
                .map(|c| c.map(str::to_string))
                .collect()
        };

        assert_eq!(codes_of(&refugees), codes_of(&ratio));
    }

    #[test]
    fn test_reordered_population_table_still_matches() {
        // Same population data, rows shuffled: the join is keyed on country
        // code, so results must not change.
        let shuffled = df!(
            COUNTRY_NAME => ["Pakistan", "United States", "France"],
            COUNTRY_CODE => ["PAK", "USA", "FRA"],
            "2000" => [Some(30.0), Some(100.0), Some(50.0)],
            "2001" => [None, Some(100.0), Some(0.0)]
        )
        .unwrap();

        let ratio = ratio_table(&refugees_frame(), &shuffled, &["2000".to_string()], 1000.0)
            .unwrap();
        assert_eq!(cell(&ratio, "2000", 0), Some(100.0));
        assert_eq!(cell(&ratio, "2000", 1), Some(100.0));
    }

    #[test]
    fn test_zero_and_missing_population_yield_null() {
        let ratio = ratio_table(
            &refugees_frame(),
            &population_frame(),
            &["2001".to_string()],
            1000.0,
        )
        .unwrap();

        assert_eq!(cell(&ratio, "2001", 0), Some(200.0));
        // France 2001: population 0 -> null, not inf
        assert_eq!(cell(&ratio, "2001", 1), None);
        // Pakistan 2001: population null -> null
        assert_eq!(cell(&ratio, "2001", 2), None);
    }

    #[test]
    fn test_missing_refugee_count_yields_null() {
        let ratio = ratio_table(
            &refugees_frame(),
            &population_frame(),
            &["2000".to_string()],
            1000.0,
        )
        .unwrap();
        assert_eq!(cell(&ratio, "2000", 2), None);
    }

    #[test]
    fn test_country_absent_from_population_yields_null() {
        let population = df!(
            COUNTRY_NAME => ["United States"],
            COUNTRY_CODE => ["USA"],
            "2000" => [Some(100.0)]
        )
        .unwrap();

        let ratio = ratio_table(&refugees_frame(), &population, &["2000".to_string()], 1000.0)
            .unwrap();
        assert_eq!(cell(&ratio, "2000", 0), Some(100.0));
        assert_eq!(cell(&ratio, "2000", 1), None);
    }

    #[test]
    fn test_missing_year_column_fails() {
        let err = ratio_table(
            &refugees_frame(),
            &population_frame(),
            &["1985".to_string()],
            1000.0,
        )
        .unwrap_err();

        match err {
            ChoroplethError::MissingColumn { column, table } => {
                assert_eq!(column, "1985");
                assert_eq!(table, REFUGEES_TABLE);
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_inputs_not_mutated() {
        let refugees = refugees_frame();
        let population = population_frame();
        ratio_table(&refugees, &population, &["2000".to_string()], 1000.0).unwrap();

        assert!(refugees.equals_missing(&refugees_frame()));
        assert!(population.equals_missing(&population_frame()));
    }

    #[test]
    fn test_load_table_skips_metadata_rows() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "\"Data Source\",\"World Development Indicators\"").unwrap();
        writeln!(file, "\"Last Updated Date\",\"2019-01-30\"").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "\"Country Name\",\"Country Code\",\"2000\",\"2001\"").unwrap();
        writeln!(file, "\"France\",\"FRA\",50,51").unwrap();
        writeln!(file, "\"Pakistan\",\"PAK\",,30").unwrap();
        file.flush().unwrap();

        let df = load_table(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        let names: Vec<&str> = df.get_column_names_str();
        assert!(names.contains(&COUNTRY_NAME));
        assert!(names.contains(&COUNTRY_CODE));
        assert!(names.contains(&"2000"));

        assert_eq!(numeric_column(&df, "2000", REFUGEES_TABLE).unwrap()[1], None);
        assert_eq!(
            numeric_column(&df, "2001", REFUGEES_TABLE).unwrap(),
            vec![Some(51.0), Some(30.0)]
        );
    }
}
