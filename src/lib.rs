//! yearbeat - CSV cleaning, per-year aggregation and merge pipeline
//!
//! Cleans three tabular sources (streamed-track metrics, world events,
//! GDP growth), normalizes percentage-like columns onto one 0-100
//! scale, aggregates rows by calendar year and joins the per-year
//! summaries into one table for export.

pub mod aggregate;
pub mod data;
pub mod pipeline;
pub mod transform;
