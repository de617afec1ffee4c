//! LSOA boundary download from the ONS feature server.

mod fetcher;
mod query;

pub use fetcher::BoundaryFetcher;
pub use query::{partition, where_clause, BoundaryQuery};
