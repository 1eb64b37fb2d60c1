//! CSV Loader
//! Reads a source CSV fully into memory with Polars.

use std::path::Path;

use polars::prelude::*;

use super::DataError;

/// Load a CSV file into a DataFrame.
///
/// Schema inference runs over a generous prefix and malformed cells are
/// tolerated at read time (they surface as nulls); the cleaning stages
/// decide what to do with them.
pub fn load_csv(path: &Path) -> Result<DataFrame, DataError> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(10000))
        .with_ignore_errors(true)
        .finish()?
        .collect()?;
    Ok(df)
}
