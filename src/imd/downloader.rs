//! Downloads the IMD CSV and builds the index table.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, info, warn};

use super::parse::parse_index;
use crate::config::{ColumnsConfig, Config, FilterConfig};
use crate::http::{check_status, FetchError};
use crate::models::IndexTable;

/// Fetches the deprivation-index CSV and filters it to the target regions.
pub struct IndexDownloader {
    client: Client,
    url: String,
    timeout: Duration,
    columns: ColumnsConfig,
    filter: FilterConfig,
    score_precision: u32,
}

impl IndexDownloader {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            url: config.sources.index_csv_url.clone(),
            timeout: config.sources.csv_timeout(),
            columns: config.columns.clone(),
            filter: config.filter.clone(),
            score_precision: config.output.score_precision,
        }
    }

    /// Fetch the raw CSV text
    pub async fn fetch_csv(&self) -> Result<String, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::request(&self.url, e))?;

        let response = check_status(&self.url, response).await?;
        response
            .text()
            .await
            .map_err(|e| FetchError::request(&self.url, e))
    }

    /// Download, parse and filter. The table may be empty; the caller decides
    /// what that means.
    pub async fn download(&self) -> Result<IndexTable> {
        info!("Downloading IMD CSV from {}", self.url);

        let content = self
            .fetch_csv()
            .await
            .context("Failed to download IMD CSV")?;

        let table = parse_index(&content, &self.columns, &self.filter, self.score_precision)?;

        info!(
            "Found {} LSOAs in {} target regions",
            table.len(),
            self.filter.regions.len()
        );

        let mut per_region: BTreeMap<&str, usize> = BTreeMap::new();
        for record in table.iter() {
            *per_region.entry(record.region_name.as_str()).or_default() += 1;
        }
        for region in &self.filter.regions {
            match per_region.get(region.as_str()) {
                Some(count) => debug!("  {}: {} LSOAs", region, count),
                None => warn!("No rows found for region '{}'", region),
            }
        }

        Ok(table)
    }
}
