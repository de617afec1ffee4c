//! Join, rounding and GeoJSON output.

mod joiner;
mod round;
mod writer;

pub use joiner::join_features;
pub use round::{round_coordinates, round_to};
pub use writer::{write_collection, WriteSummary};
