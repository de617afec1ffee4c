//! GeoJSON feature types for boundary input and joined output.

use serde::{Deserialize, Serialize};

use super::IndexRecord;

/// GeoJSON coordinate structure of any depth.
///
/// A position is a flat array of numbers; everything above it (rings,
/// polygons, multipolygons) is an array of nested coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinates {
    Position(Vec<f64>),
    Nested(Vec<Coordinates>),
}

/// GeoJSON geometry object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub geo_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// A boundary polygon returned by the feature service.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub area_code: String,
    pub area_name: String,
    pub geometry: Option<Geometry>,
}

/// A boundary joined with its index record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct OutputFeature {
    pub properties: IndexRecord,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<OutputFeature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
