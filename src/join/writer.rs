//! Writes the joined collection as compact GeoJSON.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::models::FeatureCollection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub features: usize,
    pub bytes: u64,
}

impl WriteSummary {
    pub fn size_kb(&self) -> u64 {
        self.bytes / 1024
    }
}

/// Serialize `collection` without whitespace to `path`, creating parent
/// directories as needed.
pub fn write_collection(collection: &FeatureCollection, path: &Path) -> Result<WriteSummary> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, collection).context("Failed to serialize GeoJSON")?;
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;

    let bytes = fs::metadata(path)?.len();
    let summary = WriteSummary {
        path: path.to_path_buf(),
        features: collection.len(),
        bytes,
    };

    debug!("Wrote {} bytes to {}", summary.bytes, summary.path.display());
    Ok(summary)
}
