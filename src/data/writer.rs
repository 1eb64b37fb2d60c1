//! CSV Writer
//! Writes an output DataFrame with a header row; nulls become empty fields.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;

use super::DataError;

pub fn write_csv(df: &DataFrame, path: &Path) -> Result<(), DataError> {
    let mut file = File::create(path)?;
    let mut df = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    Ok(())
}
