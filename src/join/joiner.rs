//! Inner join of boundaries against the index table.

use tracing::{debug, info};

use super::round::round_coordinates;
use crate::models::{BoundaryFeature, FeatureCollection, Geometry, IndexTable, OutputFeature};

/// Join boundaries to index records by area code.
///
/// Boundaries whose code is not in `index` are dropped; the feature service
/// covers areas outside the target regions. Output keeps boundary order and
/// takes every property from the matching index record.
pub fn join_features(
    index: &IndexTable,
    boundaries: Vec<BoundaryFeature>,
    precision: u32,
) -> FeatureCollection {
    let total = boundaries.len();
    let mut features = Vec::new();

    for boundary in boundaries {
        let Some(record) = index.get(&boundary.area_code) else {
            debug!("No index record for boundary {}", boundary.area_code);
            continue;
        };

        features.push(OutputFeature {
            properties: record.clone(),
            geometry: boundary.geometry.map(|g| round_geometry(g, precision)),
        });
    }

    info!("Joined {} features (of {} boundaries)", features.len(), total);
    FeatureCollection { features }
}

fn round_geometry(geometry: Geometry, precision: u32) -> Geometry {
    Geometry {
        coordinates: geometry
            .coordinates
            .map(|c| round_coordinates(c, precision)),
        ..geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, IndexRecord};

    fn record(code: &str) -> IndexRecord {
        IndexRecord {
            area_code: code.to_string(),
            area_name: format!("{} name", code),
            region_name: "Hounslow".to_string(),
            score: Some(21.46),
            decile: Some(3),
        }
    }

    fn boundary(code: &str) -> BoundaryFeature {
        BoundaryFeature {
            area_code: code.to_string(),
            area_name: "from service".to_string(),
            geometry: Some(Geometry {
                geo_type: "Polygon".to_string(),
                coordinates: Some(Coordinates::Nested(vec![Coordinates::Nested(vec![
                    Coordinates::Position(vec![-0.123456, 51.654321]),
                ])])),
            }),
        }
    }

    #[test]
    fn test_unmatched_boundary_dropped() {
        let index: IndexTable = vec![record("E01001234")].into_iter().collect();
        let collection = join_features(&index, vec![boundary("E01009999")], 5);
        assert!(collection.is_empty());
    }

    #[test]
    fn test_matched_boundary_joined() {
        let index: IndexTable = vec![record("E01001234"), record("E01005678")]
            .into_iter()
            .collect();
        let collection = join_features(
            &index,
            vec![boundary("E01009999"), boundary("E01001234")],
            5,
        );

        assert_eq!(collection.len(), 1);
        let feature = &collection.features[0];
        assert_eq!(feature.properties, record("E01001234"));
        assert_eq!(
            feature.geometry.as_ref().unwrap().coordinates,
            Some(Coordinates::Nested(vec![Coordinates::Nested(vec![
                Coordinates::Position(vec![-0.12346, 51.65432]),
            ])]))
        );
    }

    #[test]
    fn test_boundary_order_kept() {
        let index: IndexTable = vec![record("A"), record("B"), record("C")]
            .into_iter()
            .collect();
        let collection = join_features(
            &index,
            vec![boundary("C"), boundary("X"), boundary("A"), boundary("B")],
            5,
        );
        let codes: Vec<&str> = collection
            .features
            .iter()
            .map(|f| f.properties.area_code.as_str())
            .collect();
        assert_eq!(codes, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_missing_geometry_kept_as_none() {
        let index: IndexTable = vec![record("E01001234")].into_iter().collect();
        let mut b = boundary("E01001234");
        b.geometry = None;
        let collection = join_features(&index, vec![b], 5);
        assert_eq!(collection.len(), 1);
        assert!(collection.features[0].geometry.is_none());
    }
}
