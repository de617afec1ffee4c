//! Deprivation-index download and parsing.

mod downloader;
mod parse;

pub use downloader::IndexDownloader;
pub use parse::{normalize_header, parse_decile, parse_index, parse_score};
