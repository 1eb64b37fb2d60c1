//! Grouped Aggregator
//! Collapses rows sharing a key into one summary row per key.

use std::collections::BTreeMap;

use polars::prelude::*;
use thiserror::Error;

use crate::transform::{integral_key, numeric_value};

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Missing required column '{0}'")]
    MissingRequiredColumn(String),
    #[error("Malformed key value '{0}': keys must be integral numbers before aggregation")]
    MalformedKey(String),
    #[error("Malformed numeric value '{value}' in column '{column}'")]
    MalformedNumericValue { column: String, value: String },
}

/// How a source column collapses across a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    /// Arithmetic mean of a numeric column.
    Mean,
    /// `", "`-joined concatenation of a text column, in input row order.
    Concat,
}

/// One output column of an aggregation: a source column, the reducer
/// collapsing it, and the name it gets in the result.
#[derive(Debug, Clone)]
pub struct ColumnReducer {
    pub source: String,
    pub output: String,
    pub op: Reducer,
}

impl ColumnReducer {
    pub fn mean(source: &str, output: &str) -> Self {
        Self {
            source: source.to_string(),
            output: output.to_string(),
            op: Reducer::Mean,
        }
    }

    pub fn concat(source: &str, output: &str) -> Self {
        Self {
            source: source.to_string(),
            output: output.to_string(),
            op: Reducer::Concat,
        }
    }
}

/// Group `df` by exact equality on the (numeric) key column and reduce
/// each group to one row. Output has one row per distinct key, sorted
/// ascending by key, with the key renamed to `output_key`.
///
/// Rows reaching this point must already have an integral numeric key;
/// the row filter upstream drops the rest. A non-numeric, non-finite or
/// fractional key here is an error, not something to skip.
pub fn aggregate(
    df: &DataFrame,
    key_column: &str,
    output_key: &str,
    reducers: &[ColumnReducer],
) -> Result<DataFrame, AggregateError> {
    let keys = df
        .column(key_column)
        .map_err(|_| AggregateError::MissingRequiredColumn(key_column.to_string()))?;

    // BTreeMap gives the ascending key order for free; row indices are
    // pushed in input order, which the concat reducer relies on.
    let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for i in 0..df.height() {
        let cell = keys.get(i)?;
        let year =
            integral_key(&cell).ok_or_else(|| AggregateError::MalformedKey(cell.to_string()))?;
        groups.entry(year).or_default().push(i);
    }

    let mut columns: Vec<Column> = Vec::with_capacity(reducers.len() + 1);
    let group_keys: Vec<i64> = groups.keys().copied().collect();
    columns.push(Column::new(output_key.into(), group_keys));

    for reducer in reducers {
        let source = df
            .column(&reducer.source)
            .map_err(|_| AggregateError::MissingRequiredColumn(reducer.source.clone()))?;

        match reducer.op {
            Reducer::Mean => {
                let mut means: Vec<f64> = Vec::with_capacity(groups.len());
                for rows in groups.values() {
                    let mut sum = 0.0;
                    for &i in rows {
                        let cell = source.get(i)?;
                        let v = numeric_value(&cell).ok_or_else(|| {
                            AggregateError::MalformedNumericValue {
                                column: reducer.source.clone(),
                                value: cell.to_string(),
                            }
                        })?;
                        sum += v;
                    }
                    // Groups are non-empty by construction.
                    means.push(sum / rows.len() as f64);
                }
                columns.push(Column::new(reducer.output.as_str().into(), means));
            }
            Reducer::Concat => {
                let mut joined: Vec<String> = Vec::with_capacity(groups.len());
                for rows in groups.values() {
                    let mut parts: Vec<String> = Vec::with_capacity(rows.len());
                    for &i in rows {
                        let cell = source.get(i)?;
                        if cell.is_null() {
                            continue;
                        }
                        parts.push(cell.to_string().trim_matches('"').to_string());
                    }
                    joined.push(parts.join(", "));
                }
                columns.push(Column::new(reducer.output.as_str().into(), joined));
            }
        }
    }

    Ok(DataFrame::new(columns)?)
}
