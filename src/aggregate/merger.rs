//! Key-Based Merger
//! Outer-joins two per-key summary tables on a numeric key column.

use std::collections::HashMap;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transform::integral_key;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Missing required column '{0}'")]
    MissingRequiredColumn(String),
    #[error("Malformed key value '{0}': keys must be integral numbers before merging")]
    MalformedKey(String),
    #[error("Duplicate key {0}: inputs must be one row per key")]
    DuplicateKey(i64),
}

/// Which side's keys survive the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinMode {
    /// Every key in `left` survives; `right`-only columns are null-filled
    /// for keys absent from `right`.
    LeftOuter,
    /// Symmetric: every key in `right` survives.
    RightOuter,
}

/// Merge two frames on exact key equality. Output columns are always the
/// key, then `left`'s non-key columns, then `right`'s, regardless of
/// mode; unmatched cells are explicit nulls, never omitted.
///
/// Aggregation guarantees key uniqueness, so a duplicate key in either
/// input means an upstream invariant broke; fail instead of picking one.
pub fn merge(
    left: &DataFrame,
    right: &DataFrame,
    key_column: &str,
    mode: JoinMode,
) -> Result<DataFrame, MergeError> {
    let left_keys = key_values(left, key_column)?;
    let right_keys = key_values(right, key_column)?;

    let left_index = unique_index(&left_keys)?;
    let right_index = unique_index(&right_keys)?;

    // For each output row: the surviving key plus the matching row index
    // on each side (None = null-fill).
    let (keys, left_rows, right_rows): (Vec<i64>, Vec<Option<usize>>, Vec<Option<usize>>) =
        match mode {
            JoinMode::LeftOuter => {
                let rows: Vec<Option<usize>> = left_keys
                    .iter()
                    .map(|k| right_index.get(k).copied())
                    .collect();
                let own = (0..left.height()).map(Some).collect();
                (left_keys, own, rows)
            }
            JoinMode::RightOuter => {
                let rows: Vec<Option<usize>> = right_keys
                    .iter()
                    .map(|k| left_index.get(k).copied())
                    .collect();
                let own = (0..right.height()).map(Some).collect();
                (right_keys, rows, own)
            }
        };

    let mut columns: Vec<Column> = Vec::new();
    columns.push(Column::new(key_column.into(), keys));

    for source in left.get_columns() {
        if source.name().as_str() == key_column {
            continue;
        }
        columns.push(take_rows(source, &left_rows)?);
    }
    for source in right.get_columns() {
        if source.name().as_str() == key_column {
            continue;
        }
        columns.push(take_rows(source, &right_rows)?);
    }

    Ok(DataFrame::new(columns)?)
}

fn key_values(df: &DataFrame, key_column: &str) -> Result<Vec<i64>, MergeError> {
    let column = df
        .column(key_column)
        .map_err(|_| MergeError::MissingRequiredColumn(key_column.to_string()))?;

    let mut keys = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let cell = column.get(i)?;
        let key = integral_key(&cell).ok_or_else(|| MergeError::MalformedKey(cell.to_string()))?;
        keys.push(key);
    }
    Ok(keys)
}

fn unique_index(keys: &[i64]) -> Result<HashMap<i64, usize>, MergeError> {
    let mut index = HashMap::with_capacity(keys.len());
    for (i, &key) in keys.iter().enumerate() {
        if index.insert(key, i).is_some() {
            return Err(MergeError::DuplicateKey(key));
        }
    }
    Ok(index)
}

/// Gather one column's values by optional row index, materializing
/// absent rows as nulls. Text columns stay text; everything else is
/// carried as Float64.
fn take_rows(source: &Column, rows: &[Option<usize>]) -> Result<Column, MergeError> {
    let name = source.name().clone();

    if source.dtype() == &DataType::String {
        let ca = source.str()?;
        let values: Vec<Option<String>> = rows
            .iter()
            .map(|row| row.and_then(|i| ca.get(i).map(str::to_string)))
            .collect();
        return Ok(Column::new(name, values));
    }

    let cast = source.cast(&DataType::Float64)?;
    let ca = cast.f64()?;
    let values: Vec<Option<f64>> = rows
        .iter()
        .map(|row| row.and_then(|i| ca.get(i)))
        .collect();
    Ok(Column::new(name, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn left() -> DataFrame {
        df!(
            "Year" => [2019i64, 2020, 2021],
            "Avg_BPM" => [100.0f64, 110.0, 120.0],
        )
        .unwrap()
    }

    fn right() -> DataFrame {
        df!(
            "Year" => [2020i64, 2022],
            "Events" => ["Pandemic", "Eruption"],
        )
        .unwrap()
    }

    #[test]
    fn left_outer_keeps_every_left_key_once() {
        let out = merge(&left(), &right(), "Year", JoinMode::LeftOuter).unwrap();
        assert_eq!(out.height(), left().height());
        assert_eq!(out.get_column_names_str(), &["Year", "Avg_BPM", "Events"]);

        let events = out.column("Events").unwrap();
        assert!(events.get(0).unwrap().is_null()); // 2019: no match
        assert_eq!(
            events.get(1).unwrap().to_string().trim_matches('"'),
            "Pandemic"
        );
        assert!(events.get(2).unwrap().is_null()); // 2021: no match

        // 2022 exists only on the right and is dropped.
        let years: Vec<i64> = out
            .column("Year")
            .unwrap()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(years, vec![2019, 2020, 2021]);
    }

    #[test]
    fn right_outer_is_symmetric() {
        let out = merge(&left(), &right(), "Year", JoinMode::RightOuter).unwrap();
        assert_eq!(out.height(), right().height());
        assert_eq!(out.get_column_names_str(), &["Year", "Avg_BPM", "Events"]);

        let years: Vec<i64> = out
            .column("Year")
            .unwrap()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(years, vec![2020, 2022]);

        let bpm = out.column("Avg_BPM").unwrap();
        assert_eq!(bpm.get(0).unwrap(), AnyValue::Float64(110.0));
        assert!(bpm.get(1).unwrap().is_null()); // 2022: no left match
    }

    #[test]
    fn duplicate_keys_fail_in_either_input() {
        let dup = df!(
            "Year" => [2020i64, 2020],
            "Events" => ["A", "B"],
        )
        .unwrap();

        let err = merge(&left(), &dup, "Year", JoinMode::LeftOuter).unwrap_err();
        assert!(matches!(err, MergeError::DuplicateKey(2020)));

        let err = merge(&dup, &right(), "Year", JoinMode::LeftOuter).unwrap_err();
        assert!(matches!(err, MergeError::DuplicateKey(2020)));
    }

    #[test]
    fn fractional_key_is_malformed_not_truncated() {
        let frac = df!(
            "Year" => [2020.4f64],
            "Events" => ["A"],
        )
        .unwrap();
        let err = merge(&left(), &frac, "Year", JoinMode::LeftOuter).unwrap_err();
        assert!(matches!(err, MergeError::MalformedKey(_)));
    }

    #[test]
    fn join_mode_round_trips_through_serde() {
        for mode in [JoinMode::LeftOuter, JoinMode::RightOuter] {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(serde_json::from_str::<JoinMode>(&json).unwrap(), mode);
        }
    }

    #[test]
    fn missing_key_column_is_a_schema_error() {
        let no_key = df!("Events" => ["A"]).unwrap();
        let err = merge(&left(), &no_key, "Year", JoinMode::LeftOuter).unwrap_err();
        assert!(matches!(err, MergeError::MissingRequiredColumn(_)));
    }
}
