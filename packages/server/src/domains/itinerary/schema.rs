//! Versioned database property schemas.
//!
//! The database has drifted over time; older pages carry a Chinese title
//! property. Every read detects which revision a page uses and maps through
//! that revision's property names. Pages matching no known revision are
//! rejected instead of being half-read.

use std::collections::HashMap;

use notion_client::PropertyValue;

/// Property names for one database revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaVersion {
    pub name: &'static str,
    pub title: &'static str,
    pub status: &'static str,
    pub date: &'static str,
    pub area: &'static str,
    pub category: &'static str,
    pub url: &'static str,
    pub maps_url: &'static str,
    pub summary: &'static str,
    pub ai_processing: &'static str,
    pub cost: &'static str,
    pub transport_json: &'static str,
    pub stay_json: &'static str,
    pub lock: &'static str,
}

/// Current revision.
pub const SCHEMA_V2: SchemaVersion = SchemaVersion {
    name: "v2",
    title: "Name",
    status: "Status",
    date: "Date",
    area: "Area",
    category: "Category",
    url: "URL",
    maps_url: "Google Maps",
    summary: "AI Summary",
    ai_processing: "AI Processing",
    cost: "Cost",
    transport_json: "Transport JSON",
    stay_json: "Stay JSON",
    lock: "Lock",
};

/// First revision; identical apart from the Chinese title property.
pub const SCHEMA_V1: SchemaVersion = SchemaVersion {
    name: "v1",
    title: "地點名稱",
    ..SCHEMA_V2
};

/// Known revisions, newest first.
const KNOWN_SCHEMAS: [&SchemaVersion; 2] = [&SCHEMA_V2, &SCHEMA_V1];

/// Pick the revision a page's property map belongs to, keyed off which
/// title property is present. Returns `None` for unrecognized pages.
pub fn detect(properties: &HashMap<String, PropertyValue>) -> Option<&'static SchemaVersion> {
    KNOWN_SCHEMAS
        .into_iter()
        .find(|schema| properties.contains_key(schema.title))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(names: &[&str]) -> HashMap<String, PropertyValue> {
        names
            .iter()
            .map(|n| (n.to_string(), PropertyValue::title("x")))
            .collect()
    }

    #[test]
    fn test_detect_current() {
        let schema = detect(&props(&["Name", "Status", "URL"])).unwrap();
        assert_eq!(schema.name, "v2");
        assert_eq!(schema.title, "Name");
    }

    #[test]
    fn test_detect_legacy() {
        let schema = detect(&props(&["地點名稱", "Status"])).unwrap();
        assert_eq!(schema.name, "v1");
        assert_eq!(schema.title, "地點名稱");
    }

    #[test]
    fn test_detect_prefers_current_when_ambiguous() {
        let schema = detect(&props(&["Name", "地點名稱"])).unwrap();
        assert_eq!(schema.name, "v2");
    }

    #[test]
    fn test_detect_rejects_unknown() {
        assert!(detect(&props(&["Titel", "Status"])).is_none());
        assert!(detect(&HashMap::new()).is_none());
    }
}
