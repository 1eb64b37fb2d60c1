//! Column Normalizer
//! Rescales percentage-like columns onto a single 0-100 scale.

use polars::prelude::*;

use super::{required_column, CleanError};

/// Threshold below which a value is treated as a fraction of 1.
pub const FRACTION_THRESHOLD: f64 = 1.0;
/// Scale applied to fractional values.
pub const PERCENT_SCALE: f64 = 100.0;

/// Rescale a single value: fractions (<= threshold) are multiplied up,
/// values already on the target scale pass through unchanged.
///
/// Total over the reals; negative values pass through like any other
/// value at or below the threshold.
pub fn normalize_value(value: f64, threshold: f64, scale: f64) -> f64 {
    if value <= threshold {
        value * scale
    } else {
        value
    }
}

/// Apply [`normalize_value`] cell-by-cell to one column, returning a new
/// frame. Nulls pass through untouched; missingness is the row filter's
/// concern, not the normalizer's.
pub fn normalize_column(df: &DataFrame, column: &str) -> Result<DataFrame, CleanError> {
    let source = required_column(df, column)?;
    let values = source.cast(&DataType::Float64)?;
    let normalized = values
        .f64()?
        .apply_values(|v| normalize_value(v, FRACTION_THRESHOLD, PERCENT_SCALE));

    let mut out = df.clone();
    out.with_column(normalized.into_series().with_name(column.into()))?;
    Ok(out)
}
