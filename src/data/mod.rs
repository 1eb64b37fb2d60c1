//! Data module - CSV reading and writing

mod loader;
mod writer;

use polars::prelude::PolarsError;
use thiserror::Error;

pub use loader::load_csv;
pub use writer::write_csv;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("CSV error: {0}")]
    CsvError(#[from] PolarsError),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
