//! Deprivation-index records keyed by LSOA code.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// One small area's deprivation figures.
///
/// Serialized field names are the property names the map front-end reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    /// LSOA code, e.g. "E01001234"
    #[serde(rename = "lsoa_code")]
    pub area_code: String,

    #[serde(rename = "lsoa_name")]
    pub area_name: String,

    /// Local authority district the area belongs to
    #[serde(rename = "borough")]
    pub region_name: String,

    /// IMD score rounded to 2 dp; `None` when missing or unparseable
    #[serde(rename = "imd_score")]
    pub score: Option<f64>,

    /// IMD decile (1 = most deprived); `None` when missing or out of range
    #[serde(rename = "imd_decile")]
    pub decile: Option<u8>,
}

/// Area code → record, remembering the order codes were first seen.
#[derive(Debug, Clone, Default)]
pub struct IndexTable {
    records: HashMap<String, IndexRecord>,
    order: Vec<String>,
}

impl IndexTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. A repeated code replaces the earlier record but keeps
    /// its original position.
    pub fn insert(&mut self, record: IndexRecord) {
        let code = record.area_code.clone();
        if self.records.insert(code.clone(), record).is_none() {
            self.order.push(code);
        }
    }

    pub fn get(&self, area_code: &str) -> Option<&IndexRecord> {
        self.records.get(area_code)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Area codes in first-seen order
    pub fn codes(&self) -> &[String] {
        &self.order
    }

    /// Records in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &IndexRecord> {
        self.order.iter().filter_map(|code| self.records.get(code))
    }
}

#[cfg(test)]
impl FromIterator<IndexRecord> for IndexTable {
    fn from_iter<I: IntoIterator<Item = IndexRecord>>(iter: I) -> Self {
        let mut table = Self::new();
        for record in iter {
            table.insert(record);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, name: &str) -> IndexRecord {
        IndexRecord {
            area_code: code.to_string(),
            area_name: name.to_string(),
            region_name: "Hounslow".to_string(),
            score: Some(12.5),
            decile: Some(4),
        }
    }

    #[test]
    fn test_insertion_order_kept() {
        let table: IndexTable = vec![
            record("E01000003", "c"),
            record("E01000001", "a"),
            record("E01000002", "b"),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 3);
        assert_eq!(table.codes(), &["E01000003", "E01000001", "E01000002"]);
        let names: Vec<&str> = table.iter().map(|r| r.area_name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_duplicate_code_replaces_in_place() {
        let mut table = IndexTable::new();
        table.insert(record("E01000001", "first"));
        table.insert(record("E01000002", "other"));
        table.insert(record("E01000001", "second"));

        assert_eq!(table.len(), 2);
        assert_eq!(table.codes(), &["E01000001", "E01000002"]);
        assert_eq!(table.get("E01000001").unwrap().area_name, "second");
    }

    #[test]
    fn test_serialized_property_names() {
        let mut r = record("E01000001", "Hounslow 001A");
        r.decile = None;
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(
            json,
            r#"{"lsoa_code":"E01000001","lsoa_name":"Hounslow 001A","borough":"Hounslow","imd_score":12.5,"imd_decile":null}"#
        );
    }
}
