//! IMD CSV parsing and region filtering.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, warn};

use crate::config::{ColumnsConfig, FilterConfig};
use crate::join::round_to;
use crate::models::{IndexRecord, IndexTable};

/// Header names are compared trimmed and lower-cased, so "LSOA code (2011)"
/// and "LSOA Code (2011)" are the same column.
pub fn normalize_header(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Parse a score and round it with [`round_to`]. Missing, unparseable and
/// non-finite values are unknown.
pub fn parse_score(raw: &str, places: u32) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| round_to(v, places))
}

/// Parse a decile; anything outside 1..=10 is unknown.
pub fn parse_decile(raw: &str) -> Option<u8> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|d| (1..=10).contains(d))
}

/// Column positions resolved once from the header row.
#[derive(Debug, Default)]
struct ColumnIndices {
    region: Option<usize>,
    area_code: Option<usize>,
    area_name: Option<usize>,
    score: Option<usize>,
    decile: Option<usize>,
}

impl ColumnIndices {
    fn resolve(headers: &StringRecord, columns: &ColumnsConfig) -> Self {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |name: &str| {
            let wanted = normalize_header(name);
            let idx = normalized.iter().position(|h| *h == wanted);
            if idx.is_none() {
                warn!("Column '{}' not found in IMD CSV", name);
            }
            idx
        };

        Self {
            region: find(&columns.region),
            area_code: find(&columns.area_code),
            area_name: find(&columns.area_name),
            score: find(&columns.score),
            decile: find(&columns.decile),
        }
    }
}

fn field<'r>(record: &'r StringRecord, idx: Option<usize>) -> &'r str {
    idx.and_then(|i| record.get(i)).unwrap_or("")
}

/// Build the index table from CSV text, keeping only rows whose region is in
/// `filter`.
///
/// A missing region or area-code column yields an empty table rather than an
/// error; the caller reports the empty result.
pub fn parse_index(
    content: &str,
    columns: &ColumnsConfig,
    filter: &FilterConfig,
    score_precision: u32,
) -> Result<IndexTable> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers().context("Failed to read IMD CSV header")?.clone();
    let indices = ColumnIndices::resolve(&headers, columns);

    let mut table = IndexTable::new();
    if indices.region.is_none() || indices.area_code.is_none() {
        return Ok(table);
    }

    let mut skipped = 0usize;
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read IMD CSV row {}", row + 1))?;

        let region = field(&record, indices.region);
        if !filter.contains(region) {
            continue;
        }

        let area_code = field(&record, indices.area_code);
        if area_code.is_empty() {
            skipped += 1;
            continue;
        }

        table.insert(IndexRecord {
            area_code: area_code.to_string(),
            area_name: field(&record, indices.area_name).to_string(),
            region_name: region.to_string(),
            score: parse_score(field(&record, indices.score), score_precision),
            decile: parse_decile(field(&record, indices.decile)),
        });
    }

    if skipped > 0 {
        debug!("Skipped {} target-region rows without an area code", skipped);
    }

    Ok(table)
}
