//! Pipeline Orchestrator
//! Wires cleaning, normalization, aggregation and merging into the
//! concrete per-year pipelines.

use polars::prelude::*;
use thiserror::Error;
use tracing::info;

use crate::aggregate::{aggregate, merge, AggregateError, ColumnReducer, JoinMode, MergeError};
use crate::transform::{
    coerce_percentage_column, drop_columns, filter_rows, normalize_column, select_columns,
    CleanError, Predicate,
};

const TRACK_KEY: &str = "released_year";
const YEAR: &str = "Year";

/// Columns of the cleaned-but-unaggregated per-track export.
const STREAM_COLUMNS: [&str; 4] = ["streams", "bpm", "energy_%", "speechiness_%"];
const STREAM_NORMALIZED: [&str; 2] = ["energy_%", "speechiness_%"];

/// Columns feeding the per-year track aggregation.
const METRIC_COLUMNS: [&str; 5] = [TRACK_KEY, "bpm", "valence_%", "energy_%", "liveness_%"];
const METRIC_NORMALIZED: [&str; 3] = ["valence_%", "energy_%", "liveness_%"];

/// Events-source columns the pipeline never consumes.
const EVENT_DROPPED: [&str; 6] = [
    "Sl. No",
    "Place Name",
    "Affected Population",
    "Month",
    "Date",
    "Important Person/Group Responsible",
];
const EVENT_NAME: &str = "Name of Incident";
const EVENT_PLACEHOLDER: &str = "Unknown";

const GROWTH: &str = "Growth";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Clean(#[from] CleanError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// The non-track side of the per-year merge.
#[derive(Debug, Clone)]
enum Partner {
    /// World events, aggregated to one concatenated row per year. The
    /// placeholder exclusion is a swappable predicate, not baked-in
    /// string logic.
    Events { exclude: Option<Predicate> },
    /// GDP growth, already one row per year; values coerced, never
    /// aggregated.
    Gdp,
}

/// One configured run: which partner joins the per-year track summary,
/// and which side's keys survive.
#[derive(Debug, Clone)]
pub struct Pipeline {
    partner: Partner,
    join_mode: JoinMode,
}

/// The two artifacts of a run.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Per-year summary merged with the partner table.
    pub merged: DataFrame,
    /// Cleaned per-track table, normalized but never aggregated.
    pub tracks_clean: DataFrame,
}

impl Pipeline {
    /// Tracks joined with world events; every track year survives and
    /// placeholder incident names are excluded.
    pub fn tracks_events() -> Self {
        Self {
            partner: Partner::Events {
                exclude: Some(Predicate::text_excludes(EVENT_NAME, EVENT_PLACEHOLDER)),
            },
            join_mode: JoinMode::LeftOuter,
        }
    }

    /// Variant of [`Pipeline::tracks_events`] that only drops rows with
    /// malformed years, keeping placeholder incident names.
    pub fn tracks_events_plain() -> Self {
        Self {
            partner: Partner::Events { exclude: None },
            join_mode: JoinMode::LeftOuter,
        }
    }

    /// Tracks joined with GDP growth; every GDP year survives.
    pub fn tracks_gdp() -> Self {
        Self {
            partner: Partner::Gdp,
            join_mode: JoinMode::RightOuter,
        }
    }

    /// Run the pipeline over fully-loaded source frames. Stateless: the
    /// inputs are untouched and identical inputs produce identical
    /// outputs.
    pub fn run(
        &self,
        tracks: &DataFrame,
        partner: &DataFrame,
    ) -> Result<PipelineOutput, PipelineError> {
        info!(
            track_rows = tracks.height(),
            partner_rows = partner.height(),
            "starting pipeline run"
        );

        let tracks_clean = clean_track_streams(tracks)?;
        info!(rows = tracks_clean.height(), "per-track table cleaned");

        let tracks_by_year = aggregate_tracks_by_year(tracks)?;
        info!(years = tracks_by_year.height(), "track metrics aggregated");

        let partner_by_year = match &self.partner {
            Partner::Events { exclude } => aggregate_events_by_year(partner, exclude.as_ref())?,
            Partner::Gdp => clean_gdp(partner)?,
        };
        info!(years = partner_by_year.height(), "partner table prepared");

        let merged = merge(&tracks_by_year, &partner_by_year, YEAR, self.join_mode)?;
        info!(rows = merged.height(), "per-year tables merged");

        Ok(PipelineOutput {
            merged,
            tracks_clean,
        })
    }
}

/// Per-track export: project the stream metrics, drop incomplete rows,
/// put the percentage columns on the 0-100 scale.
fn clean_track_streams(tracks: &DataFrame) -> Result<DataFrame, PipelineError> {
    let mut df = select_columns(tracks, &STREAM_COLUMNS)?;
    df = filter_rows(&df, &[Predicate::required_columns(STREAM_COLUMNS)])?;
    for column in STREAM_NORMALIZED {
        df = normalize_column(&df, column)?;
    }
    Ok(df)
}

/// Per-year track summary: `Year, Avg_Valence, Avg_BPM, Avg_Liveness,
/// Avg_Energy`.
fn aggregate_tracks_by_year(tracks: &DataFrame) -> Result<DataFrame, PipelineError> {
    let mut df = select_columns(tracks, &METRIC_COLUMNS)?;
    df = filter_rows(&df, &[Predicate::required_columns(METRIC_COLUMNS)])?;
    for column in METRIC_NORMALIZED {
        df = normalize_column(&df, column)?;
    }

    let reducers = [
        ColumnReducer::mean("valence_%", "Avg_Valence"),
        ColumnReducer::mean("bpm", "Avg_BPM"),
        ColumnReducer::mean("liveness_%", "Avg_Liveness"),
        ColumnReducer::mean("energy_%", "Avg_Energy"),
    ];
    Ok(aggregate(&df, TRACK_KEY, YEAR, &reducers)?)
}

/// Per-year events summary: `Year, Events`. Rows with unparsable years
/// are data noise and dropped silently; the placeholder exclusion only
/// applies when configured.
fn aggregate_events_by_year(
    events: &DataFrame,
    exclude: Option<&Predicate>,
) -> Result<DataFrame, PipelineError> {
    let df = drop_columns(events, &EVENT_DROPPED);

    let mut predicates = vec![Predicate::numeric_coercible(YEAR)];
    if let Some(exclude) = exclude {
        predicates.push(exclude.clone());
    }
    let df = filter_rows(&df, &predicates)?;

    let reducers = [ColumnReducer::concat(EVENT_NAME, "Events")];
    Ok(aggregate(&df, YEAR, YEAR, &reducers)?)
}

/// GDP is already one row per year; drop rows with malformed years,
/// then coerce `Growth` onto the 0-100 scale. A malformed growth cell
/// fails the run.
fn clean_gdp(gdp: &DataFrame) -> Result<DataFrame, PipelineError> {
    let df = select_columns(gdp, &[YEAR, GROWTH])?;
    let df = filter_rows(&df, &[Predicate::numeric_coercible(YEAR)])?;
    Ok(coerce_percentage_column(&df, GROWTH)?)
}
