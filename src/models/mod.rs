//! Core data models shared by the pipeline stages.

pub mod feature;
pub mod index;

pub use feature::{BoundaryFeature, Coordinates, FeatureCollection, Geometry, OutputFeature};
pub use index::{IndexRecord, IndexTable};
