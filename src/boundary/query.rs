//! Feature-server query construction and response decoding.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use url::form_urlencoded;

use crate::config::{ColumnsConfig, FetchConfig};
use crate::http::FetchError;
use crate::models::{BoundaryFeature, Geometry};

/// Split codes into consecutive batches of at most `batch_size`, keeping
/// input order.
pub fn partition(codes: &[String], batch_size: usize) -> Vec<&[String]> {
    codes.chunks(batch_size.max(1)).collect()
}

/// `FIELD IN ('a','b',...)`. Embedded single quotes are doubled.
pub fn where_clause(code_field: &str, codes: &[String]) -> String {
    let quoted: Vec<String> = codes
        .iter()
        .map(|c| format!("'{}'", c.replace('\'', "''")))
        .collect();
    format!("{} IN ({})", code_field, quoted.join(","))
}

/// Fixed parameters of a boundary query; only the code list varies per batch.
#[derive(Debug, Clone)]
pub struct BoundaryQuery {
    pub code_field: String,
    pub name_field: String,
    pub out_sr: u32,
}

impl BoundaryQuery {
    pub fn new(columns: &ColumnsConfig, fetch: &FetchConfig) -> Self {
        Self {
            code_field: columns.code_field.clone(),
            name_field: columns.name_field.clone(),
            out_sr: fetch.out_sr,
        }
    }

    /// URL-encoded POST body selecting exactly `codes`.
    pub fn form_body(&self, codes: &[String]) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("where", &where_clause(&self.code_field, codes))
            .append_pair(
                "outFields",
                &format!("{},{}", self.code_field, self.name_field),
            )
            .append_pair("outSR", &self.out_sr.to_string())
            .append_pair("f", "geojson")
            .append_pair("returnGeometry", "true")
            .finish()
    }

    /// Decode a query response into boundary features.
    ///
    /// ArcGIS reports query errors as `{"error": {...}}` with HTTP 200.
    pub fn decode(&self, url: &str, body: &[u8]) -> Result<Vec<BoundaryFeature>, FetchError> {
        let response: QueryResponse =
            serde_json::from_slice(body).map_err(|source| FetchError::Decode {
                url: url.to_string(),
                source,
            })?;

        if let Some(error) = response.error {
            return Err(FetchError::Service {
                url: url.to_string(),
                code: error.code,
                message: error.message,
            });
        }

        Ok(response
            .features
            .into_iter()
            .map(|f| {
                let properties = f.properties.unwrap_or_default();
                let area_code = property_string(&properties, &self.code_field);
                let geometry = f.geometry.and_then(|raw| decode_geometry(&area_code, raw));
                BoundaryFeature {
                    area_code,
                    area_name: property_string(&properties, &self.name_field),
                    geometry,
                }
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    features: Vec<RawFeature>,
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<Value>,
}

/// Unreadable geometries decode as `None`; the feature itself is kept.
fn decode_geometry(area_code: &str, raw: Value) -> Option<Geometry> {
    if raw.is_null() {
        return None;
    }
    match serde_json::from_value(raw) {
        Ok(geometry) => Some(geometry),
        Err(e) => {
            debug!("Dropping unreadable geometry for {}: {}", area_code, e);
            None
        }
    }
}

fn property_string(properties: &Map<String, Value>, key: &str) -> String {
    match properties.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;

    fn codes(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("E01{:06}", i)).collect()
    }

    fn query() -> BoundaryQuery {
        BoundaryQuery::new(&ColumnsConfig::default(), &FetchConfig::default())
    }

    #[test]
    fn test_partition_sizes_and_order() {
        let all = codes(120);
        let batches = partition(&all, 50);

        let sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![50, 50, 20]);

        let flattened: Vec<String> = batches.iter().flat_map(|b| b.iter().cloned()).collect();
        assert_eq!(flattened, all);
    }

    #[test]
    fn test_partition_edge_cases() {
        assert!(partition(&[], 50).is_empty());
        assert_eq!(partition(&codes(50), 50).len(), 1);
        assert_eq!(partition(&codes(3), 0).len(), 3);
    }

    #[test]
    fn test_where_clause() {
        let batch = vec!["E01000001".to_string(), "E01000002".to_string()];
        assert_eq!(
            where_clause("LSOA11CD", &batch),
            "LSOA11CD IN ('E01000001','E01000002')"
        );
        assert_eq!(
            where_clause("LSOA11CD", &["O'Brien".to_string()]),
            "LSOA11CD IN ('O''Brien')"
        );
    }

    #[test]
    fn test_form_body_fields() {
        let batch = vec!["E01000001".to_string(), "E01000002".to_string()];
        let body = query().form_body(&batch);

        let pairs: Vec<(String, String)> = form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(
            pairs,
            vec![
                (
                    "where".to_string(),
                    "LSOA11CD IN ('E01000001','E01000002')".to_string()
                ),
                ("outFields".to_string(), "LSOA11CD,LSOA11NM".to_string()),
                ("outSR".to_string(), "4326".to_string()),
                ("f".to_string(), "geojson".to_string()),
                ("returnGeometry".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_decode_features() {
        let body = br#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"LSOA11CD": "E01000001", "LSOA11NM": "Hounslow 001A"},
                 "geometry": {"type": "Polygon", "coordinates": [[[-0.3, 51.4], [-0.2, 51.4], [-0.3, 51.5], [-0.3, 51.4]]]}},
                {"type": "Feature", "properties": null, "geometry": null}
            ]
        }"#;

        let features = query().decode("http://test/query", body).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].area_code, "E01000001");
        assert_eq!(features[0].area_name, "Hounslow 001A");
        let geometry = features[0].geometry.as_ref().unwrap();
        assert_eq!(geometry.geo_type, "Polygon");
        assert!(matches!(geometry.coordinates, Some(Coordinates::Nested(_))));

        assert_eq!(features[1].area_code, "");
        assert!(features[1].geometry.is_none());
    }

    #[test]
    fn test_decode_malformed_geometry_keeps_batch() {
        let body = br#"{
            "features": [
                {"properties": {"LSOA11CD": "E01000001", "LSOA11NM": "Hounslow 001A"},
                 "geometry": {"type": "Polygon", "coordinates": [[[-0.3, 51.4], [-0.2, 51.4], [-0.3, 51.4]]]}},
                {"properties": {"LSOA11CD": "E01000002", "LSOA11NM": "Hounslow 001B"},
                 "geometry": {}},
                {"properties": {"LSOA11CD": "E01000003", "LSOA11NM": "Hounslow 001C"},
                 "geometry": {"type": "Polygon", "coordinates": "not coordinates"}}
            ]
        }"#;

        let features = query().decode("http://test/query", body).unwrap();
        assert_eq!(features.len(), 3);
        assert!(features[0].geometry.is_some());
        assert_eq!(features[1].area_code, "E01000002");
        assert!(features[1].geometry.is_none());
        assert_eq!(features[2].area_code, "E01000003");
        assert!(features[2].geometry.is_none());
    }

    #[test]
    fn test_decode_service_error() {
        let body = br#"{"error": {"code": 400, "message": "Invalid query", "details": []}}"#;
        match query().decode("http://test/query", body) {
            Err(FetchError::Service { code, message, .. }) => {
                assert_eq!(code, 400);
                assert_eq!(message, "Invalid query");
            }
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_garbage() {
        let result = query().decode("http://test/query", b"<html>busy</html>");
        assert!(matches!(result, Err(FetchError::Decode { .. })));
    }
}
