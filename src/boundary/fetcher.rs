//! Batched boundary download from the feature server.

use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, info};

use super::query::{partition, BoundaryQuery};
use crate::config::Config;
use crate::http::{check_status, FetchError};
use crate::models::BoundaryFeature;

/// Downloads LSOA boundaries in batches, one POST per batch.
///
/// Batches run one after another. There is no retry: the first failing batch
/// aborts the whole fetch.
pub struct BoundaryFetcher {
    client: Client,
    url: String,
    timeout: Duration,
    query: BoundaryQuery,
    batch_size: usize,
    show_progress: bool,
}

impl BoundaryFetcher {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            url: config.sources.feature_server_url.clone(),
            timeout: config.sources.boundary_timeout(),
            query: BoundaryQuery::new(&config.columns, &config.fetch),
            batch_size: config.fetch.batch_size,
            show_progress: true,
        }
    }

    /// Enable or disable the progress bar (log lines are always emitted)
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Fetch a single batch of codes
    pub async fn fetch_batch(&self, codes: &[String]) -> Result<Vec<BoundaryFeature>, FetchError> {
        let body = self.query.form_body(codes);

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .timeout(self.timeout)
            .body(body)
            .send()
            .await
            .map_err(|e| FetchError::request(&self.url, e))?;

        let response = check_status(&self.url, response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::request(&self.url, e))?;

        self.query.decode(&self.url, &bytes)
    }

    /// Fetch boundaries for every code, accumulating features across batches.
    pub async fn fetch_all(&self, codes: &[String]) -> Result<Vec<BoundaryFeature>> {
        let batches = partition(codes, self.batch_size);
        info!(
            "Downloading LSOA boundaries for {} LSOAs (batch_size={}, {} batches)",
            codes.len(),
            self.batch_size,
            batches.len()
        );

        let pb = if self.show_progress {
            ProgressBar::new(batches.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches")?
                .progress_chars("#>-"),
        );

        let mut features = Vec::new();
        for (idx, batch) in batches.iter().enumerate() {
            debug!("Batch {} covers {}..{}", idx + 1, batch[0], batch[batch.len() - 1]);

            let batch_features = self.fetch_batch(batch).await.with_context(|| {
                format!(
                    "Boundary batch {}/{} ({} codes) failed",
                    idx + 1,
                    batches.len(),
                    batch.len()
                )
            })?;

            let received = batch_features.len();
            features.extend(batch_features);
            pb.inc(1);
            pb.suspend(|| {
                info!(
                    "Batch {}/{}: {} features (total so far: {})",
                    idx + 1,
                    batches.len(),
                    received,
                    features.len()
                )
            });
        }

        pb.finish_and_clear();
        info!("Received {} boundary features total", features.len());
        Ok(features)
    }
}
