//! yearbeat - CSV cleaning, per-year aggregation and merge pipeline
//!
//! Joins per-year track-metric summaries with world events (or GDP
//! growth) and exports the merged table plus a cleaned per-track table.

use std::path::Path;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use yearbeat::data;
use yearbeat::pipeline::Pipeline;

const TRACKS_CSV: &str = "spotify_most_streamed_songs.csv";
const EVENTS_CSV: &str = "world_important_events.csv";

const MERGED_OUT: &str = "cleaned_data.csv";
const TRACKS_OUT: &str = "cleaned_streams.csv";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("yearbeat=info")),
        )
        .init();

    let tracks = data::load_csv(Path::new(TRACKS_CSV))
        .with_context(|| format!("loading {TRACKS_CSV}"))?;
    let events = data::load_csv(Path::new(EVENTS_CSV))
        .with_context(|| format!("loading {EVENTS_CSV}"))?;

    let output = Pipeline::tracks_events().run(&tracks, &events)?;

    data::write_csv(&output.merged, Path::new(MERGED_OUT))
        .with_context(|| format!("writing {MERGED_OUT}"))?;
    data::write_csv(&output.tracks_clean, Path::new(TRACKS_OUT))
        .with_context(|| format!("writing {TRACKS_OUT}"))?;

    info!(
        merged = MERGED_OUT,
        tracks = TRACKS_OUT,
        "pipeline outputs written"
    );
    Ok(())
}
