//! propmap - builds the IMD deprivation GeoJSON used by the map front-end.
//!
//! Downloads IMD 2019 scores and ONS LSOA boundaries, joins them by LSOA code
//! and writes a single compact FeatureCollection.

pub mod boundary;
pub mod config;
pub mod http;
pub mod imd;
pub mod join;
pub mod models;
pub mod pipeline;

pub use config::Config;
pub use models::{FeatureCollection, IndexRecord, IndexTable};
pub use pipeline::{run, RunOutcome};
