//! Numeric Coercer
//! Parses percentage-formatted strings and fractional floats onto one
//! 0-100 numeric scale.

use polars::prelude::*;

use super::{required_column, CleanError};

/// Coerce one cell to a 0-100 percentage.
///
/// Textual values are expected to carry a trailing percent sign; the sign
/// is stripped and the remainder parsed, already on the 0-100 scale.
/// Numeric values are taken to be fractions and multiplied by 100. The
/// asymmetry is a convention of the source data, not something to infer
/// around.
pub fn coerce_percentage(value: &AnyValue, column: &str) -> Result<f64, CleanError> {
    let malformed = |value: &AnyValue| CleanError::MalformedNumericValue {
        column: column.to_string(),
        value: value.to_string(),
    };

    match value {
        AnyValue::Null => Err(malformed(value)),
        AnyValue::String(s) => parse_percent_string(s).ok_or_else(|| malformed(value)),
        AnyValue::StringOwned(s) => parse_percent_string(s).ok_or_else(|| malformed(value)),
        other => other
            .extract::<f64>()
            .map(|v| v * 100.0)
            .ok_or_else(|| malformed(value)),
    }
}

fn parse_percent_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed);
    digits.parse::<f64>().ok()
}

/// Coerce an entire column via [`coerce_percentage`], replacing it with a
/// Float64 column. Any malformed cell fails the run; silently dropping a
/// value here would corrupt downstream means.
pub fn coerce_percentage_column(df: &DataFrame, column: &str) -> Result<DataFrame, CleanError> {
    let source = required_column(df, column)?;

    let mut coerced: Vec<f64> = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let cell = source.get(i)?;
        coerced.push(coerce_percentage(&cell, column)?);
    }

    let mut out = df.clone();
    out.with_column(Column::new(column.into(), coerced))?;
    Ok(out)
}

/// Best-effort numeric read of a cell: numeric types extract directly,
/// strings are parsed, anything else (nulls and non-finite values
/// included) is `None`.
pub fn numeric_value(value: &AnyValue) -> Option<f64> {
    let parsed = match value {
        AnyValue::Null => None,
        AnyValue::String(s) => s.trim().parse::<f64>().ok(),
        AnyValue::StringOwned(s) => s.trim().parse::<f64>().ok(),
        other => other.extract::<f64>(),
    };
    // Literal "NaN"/"inf" text parses as f64 but is not a usable value;
    // it counts as unparsable, like any other noise.
    parsed.filter(|v| v.is_finite())
}

/// Read a cell as an integral group key. Fractional values are rejected
/// rather than truncated; truncation would merge distinct keys.
pub fn integral_key(value: &AnyValue) -> Option<i64> {
    let v = numeric_value(value)?;
    if v.fract() != 0.0 {
        return None;
    }
    Some(v as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_strings_are_already_on_scale() {
        let v = coerce_percentage(&AnyValue::String("3.2%"), "Growth").unwrap();
        assert!((v - 3.2).abs() < 1e-12);
    }

    #[test]
    fn numeric_values_are_fractions() {
        let v = coerce_percentage(&AnyValue::Float64(0.032), "Growth").unwrap();
        assert!((v - 3.2).abs() < 1e-12);
    }

    #[test]
    fn unparsable_strings_fail() {
        let err = coerce_percentage(&AnyValue::String("abc%"), "Growth").unwrap_err();
        assert!(matches!(
            err,
            CleanError::MalformedNumericValue { column, .. } if column == "Growth"
        ));
    }

    #[test]
    fn nulls_fail_rather_than_silently_skipping() {
        assert!(coerce_percentage(&AnyValue::Null, "Growth").is_err());
    }

    #[test]
    fn coerce_column_handles_mixed_string_input() {
        // A string column mixing percent strings and fraction-looking text:
        // strings always mean "already a percent".
        let df = df!(
            "Year" => [2019i64, 2020, 2021],
            "Growth" => ["3.2%", "-1.5%", "2.8%"],
        )
        .unwrap();

        let out = coerce_percentage_column(&df, "Growth").unwrap();
        let growth: Vec<f64> = out
            .column("Growth")
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(growth, vec![3.2, -1.5, 2.8]);
    }

    #[test]
    fn coerce_column_is_fatal_on_any_bad_cell() {
        let df = df!("Growth" => ["3.2%", "n/a", "1.0%"]).unwrap();
        assert!(coerce_percentage_column(&df, "Growth").is_err());
    }

    #[test]
    fn numeric_value_reads_numbers_and_numeric_strings() {
        assert_eq!(numeric_value(&AnyValue::Int64(2020)), Some(2020.0));
        assert_eq!(numeric_value(&AnyValue::String("2020")), Some(2020.0));
        assert_eq!(numeric_value(&AnyValue::String("Unknown")), None);
        assert_eq!(numeric_value(&AnyValue::Null), None);
    }

    #[test]
    fn non_finite_values_count_as_unparsable() {
        assert_eq!(numeric_value(&AnyValue::String("NaN")), None);
        assert_eq!(numeric_value(&AnyValue::String("inf")), None);
        assert_eq!(numeric_value(&AnyValue::String("-inf")), None);
        assert_eq!(numeric_value(&AnyValue::Float64(f64::NAN)), None);
        assert_eq!(numeric_value(&AnyValue::Float64(f64::INFINITY)), None);
    }

    #[test]
    fn integral_keys_reject_fractional_and_non_finite_years() {
        assert_eq!(integral_key(&AnyValue::String("2020")), Some(2020));
        assert_eq!(integral_key(&AnyValue::Float64(2020.0)), Some(2020));
        assert_eq!(integral_key(&AnyValue::Int64(-500)), Some(-500));
        assert_eq!(integral_key(&AnyValue::Float64(2020.4)), None);
        assert_eq!(integral_key(&AnyValue::String("NaN")), None);
        assert_eq!(integral_key(&AnyValue::Null), None);
    }
}
