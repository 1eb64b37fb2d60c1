//! Aggregate module - per-key grouping and key-based merging

mod aggregator;
mod merger;

pub use aggregator::{aggregate, AggregateError, ColumnReducer, Reducer};
pub use merger::{merge, JoinMode, MergeError};
