//! Row Filter
//! Drops rows failing validity predicates; never mutates its input.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::{coercer::numeric_value, required_column, CleanError};

/// A row-level validity predicate. Predicates are independent; a row
/// survives only if every predicate in the list accepts it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Predicate {
    /// Drop the row if any listed column is null.
    RequiredColumns(Vec<String>),
    /// Drop the row if the column cannot be read as a number. Parse
    /// failures here are data-quality noise, not errors.
    NumericCoercible(String),
    /// Drop the row if the text column case-insensitively contains the
    /// needle. Null text survives; it has nothing to match against.
    TextExcludes { column: String, needle: String },
}

impl Predicate {
    pub fn required_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::RequiredColumns(columns.into_iter().map(Into::into).collect())
    }

    pub fn numeric_coercible(column: &str) -> Self {
        Predicate::NumericCoercible(column.to_string())
    }

    pub fn text_excludes(column: &str, needle: &str) -> Self {
        Predicate::TextExcludes {
            column: column.to_string(),
            needle: needle.to_string(),
        }
    }
}

/// Apply the predicates in order, returning a new frame with the
/// surviving rows in their original order.
pub fn filter_rows(df: &DataFrame, predicates: &[Predicate]) -> Result<DataFrame, CleanError> {
    let mut keep = vec![true; df.height()];

    for predicate in predicates {
        apply_predicate(df, predicate, &mut keep)?;
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    Ok(df.filter(&mask)?)
}

fn apply_predicate(
    df: &DataFrame,
    predicate: &Predicate,
    keep: &mut [bool],
) -> Result<(), CleanError> {
    match predicate {
        Predicate::RequiredColumns(columns) => {
            for name in columns {
                let column = required_column(df, name)?;
                for (i, flag) in keep.iter_mut().enumerate() {
                    if *flag && column.get(i)?.is_null() {
                        *flag = false;
                    }
                }
            }
        }
        Predicate::NumericCoercible(name) => {
            let column = required_column(df, name)?;
            for (i, flag) in keep.iter_mut().enumerate() {
                if *flag && numeric_value(&column.get(i)?).is_none() {
                    *flag = false;
                }
            }
        }
        Predicate::TextExcludes { column, needle } => {
            let series = required_column(df, column)?;
            let needle = needle.to_lowercase();
            for (i, flag) in keep.iter_mut().enumerate() {
                if !*flag {
                    continue;
                }
                let cell = series.get(i)?;
                let text = match &cell {
                    AnyValue::String(s) => Some(s.to_string()),
                    AnyValue::StringOwned(s) => Some(s.to_string()),
                    _ => None,
                };
                if let Some(text) = text {
                    if text.to_lowercase().contains(&needle) {
                        *flag = false;
                    }
                }
            }
        }
    }
    Ok(())
}
