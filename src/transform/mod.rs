//! Transform module - row-level cleaning and normalization

mod coercer;
mod filter;
mod normalizer;

use polars::prelude::*;
use thiserror::Error;

pub use coercer::{coerce_percentage, coerce_percentage_column, integral_key, numeric_value};
pub use filter::{filter_rows, Predicate};
pub use normalizer::{normalize_column, normalize_value};

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Missing required column '{0}'")]
    MissingRequiredColumn(String),
    #[error("Malformed numeric value '{value}' in column '{column}'")]
    MalformedNumericValue { column: String, value: String },
}

/// Look up a column, reporting its absence as a schema error rather
/// than a generic polars failure.
pub(crate) fn required_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, CleanError> {
    df.column(name)
        .map_err(|_| CleanError::MissingRequiredColumn(name.to_string()))
}

/// Project a frame down to the listed columns, preserving row order.
pub fn select_columns(df: &DataFrame, columns: &[&str]) -> Result<DataFrame, CleanError> {
    for name in columns {
        required_column(df, name)?;
    }
    Ok(df.select(columns.iter().copied())?)
}

/// Drop the listed columns; columns not present are ignored.
pub fn drop_columns(df: &DataFrame, columns: &[&str]) -> DataFrame {
    df.drop_many(columns.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_columns_keeps_order_and_errors_on_missing() {
        let df = df!(
            "a" => [1i64, 2],
            "b" => ["x", "y"],
            "c" => [0.5f64, 0.7],
        )
        .unwrap();

        let out = select_columns(&df, &["c", "a"]).unwrap();
        assert_eq!(out.get_column_names_str(), &["c", "a"]);
        assert_eq!(out.height(), 2);

        let err = select_columns(&df, &["a", "missing"]).unwrap_err();
        assert!(matches!(err, CleanError::MissingRequiredColumn(c) if c == "missing"));
    }

    #[test]
    fn drop_columns_ignores_absent_names() {
        let df = df!("a" => [1i64], "b" => [2i64]).unwrap();
        let out = drop_columns(&df, &["b", "not_there"]);
        assert_eq!(out.get_column_names_str(), &["a"]);
    }
}
