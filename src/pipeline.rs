//! Download → fetch → join → write, run once.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::boundary::BoundaryFetcher;
use crate::config::Config;
use crate::http::build_client;
use crate::imd::IndexDownloader;
use crate::join::{join_features, write_collection, WriteSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No CSV rows matched the target regions; nothing was fetched or written.
    NoIndexData,
    Written(WriteSummary),
}

/// Run the whole pipeline.
///
/// The output file is only created once every stage has succeeded; any
/// network or service fault aborts the run before anything is written.
pub async fn run(config: &Config, show_progress: bool) -> Result<RunOutcome> {
    config.validate()?;

    let client = build_client(&config.sources.user_agent)?;

    let index = IndexDownloader::new(client.clone(), config).download().await?;
    if index.is_empty() {
        warn!(
            "No IMD data found for target regions {:?}; nothing written. Check the CSV column names.",
            config.filter.regions
        );
        return Ok(RunOutcome::NoIndexData);
    }

    let boundaries = BoundaryFetcher::new(client, config)
        .with_progress(show_progress)
        .fetch_all(index.codes())
        .await
        .context("Failed to download LSOA boundaries")?;

    let collection = join_features(&index, boundaries, config.output.precision);
    if collection.is_empty() {
        warn!("No boundaries matched the {} index records", index.len());
    }
    let summary = write_collection(&collection, &config.output.path)?;

    info!("Pipeline complete");
    Ok(RunOutcome::Written(summary))
}
