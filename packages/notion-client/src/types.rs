//! Request/response types for the Notion API.
//!
//! Property values are modelled as a single struct with one optional payload
//! per property type rather than a tagged enum, so pages containing property
//! types this client does not use still deserialize cleanly.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A Notion page (the subset of fields this client exposes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
    #[serde(default)]
    pub cover: Option<Cover>,
    #[serde(default)]
    pub last_edited_time: Option<String>,
}

impl Page {
    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Resolve the cover image URL, whichever hosting variant is present.
    pub fn cover_url(&self) -> Option<&str> {
        let cover = self.cover.as_ref()?;
        cover
            .external
            .as_ref()
            .map(|f| f.url.as_str())
            .or_else(|| cover.file.as_ref().map(|f| f.url.as_str()))
    }
}

/// Page cover image (external URL or Notion-hosted file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cover {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<FileRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRef {
    pub url: String,
}

/// One property value on a page.
///
/// Exactly one payload field is set when writing; when reading, the payload
/// matching `kind` is populated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyValue {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Vec<RichText>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_text: Option<Vec<RichText>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_select: Option<Vec<SelectOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateValue>,
    // Double Option so `"url": null` survives a read round-trip; writes
    // always use Some(Some(..)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<Option<f64>>,
}

impl PropertyValue {
    /// Build a title property.
    pub fn title(text: impl Into<String>) -> Self {
        Self {
            title: Some(vec![RichText::new(text)]),
            ..Default::default()
        }
    }

    /// Build a rich-text property. An empty string produces an empty
    /// fragment list, which clears the property on write.
    pub fn rich_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let fragments = if text.is_empty() {
            vec![]
        } else {
            vec![RichText::new(text)]
        };
        Self {
            rich_text: Some(fragments),
            ..Default::default()
        }
    }

    /// Build a select property.
    pub fn select(name: impl Into<String>) -> Self {
        Self {
            select: Some(SelectOption { name: name.into() }),
            ..Default::default()
        }
    }

    /// Build a status property.
    pub fn status(name: impl Into<String>) -> Self {
        Self {
            status: Some(SelectOption { name: name.into() }),
            ..Default::default()
        }
    }

    /// Build a multi-select property.
    pub fn multi_select(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            multi_select: Some(
                names
                    .into_iter()
                    .map(|n| SelectOption { name: n.into() })
                    .collect(),
            ),
            ..Default::default()
        }
    }

    /// Build a URL property.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(Some(url.into())),
            ..Default::default()
        }
    }

    /// Build a date property from an ISO 8601 start value.
    pub fn date(start: impl Into<String>) -> Self {
        Self {
            date: Some(DateValue {
                start: start.into(),
            }),
            ..Default::default()
        }
    }

    /// Build a number property.
    pub fn number(value: f64) -> Self {
        Self {
            number: Some(Some(value)),
            ..Default::default()
        }
    }

    /// Joined plain text of a title or rich-text payload.
    pub fn plain_text(&self) -> Option<String> {
        let fragments = self.title.as_ref().or(self.rich_text.as_ref())?;
        let text: String = fragments.iter().map(|f| f.plain()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Name of a select or status payload.
    pub fn select_name(&self) -> Option<&str> {
        self.select
            .as_ref()
            .or(self.status.as_ref())
            .map(|s| s.name.as_str())
    }

    /// Names of a multi-select payload.
    pub fn multi_select_names(&self) -> Vec<String> {
        self.multi_select
            .as_ref()
            .map(|opts| opts.iter().map(|o| o.name.clone()).collect())
            .unwrap_or_default()
    }

    /// URL payload, if present and non-null.
    pub fn url_value(&self) -> Option<&str> {
        self.url.as_ref()?.as_deref()
    }

    /// Date start value, if present.
    pub fn date_start(&self) -> Option<&str> {
        self.date.as_ref().map(|d| d.start.as_str())
    }

    /// Number payload, if present and non-null.
    pub fn number_value(&self) -> Option<f64> {
        self.number.as_ref().copied().flatten()
    }
}

/// One rich-text fragment. `text.content` is what gets written;
/// `plain_text` is what reads come back with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RichText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
}

impl RichText {
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            plain_text: Some(content.clone()),
            text: Some(TextContent { content }),
        }
    }

    /// Plain text of this fragment, whichever representation is present.
    pub fn plain(&self) -> &str {
        self.plain_text
            .as_deref()
            .or_else(|| self.text.as_ref().map(|t| t.content.as_str()))
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateValue {
    pub start: String,
}

/// Sort directive for database queries.
#[derive(Debug, Clone, Serialize)]
pub struct Sort {
    pub property: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl Sort {
    pub fn ascending(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Database query request. Filters follow Notion's nested JSON shape; the
/// helper constructors below cover the conditions this client needs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryDatabaseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub sorts: Vec<Sort>,
}

impl QueryDatabaseRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on a status property not equalling a value.
    pub fn filter_status_does_not_equal(
        mut self,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.filter = Some(serde_json::json!({
            "property": property.into(),
            "status": { "does_not_equal": value.into() },
        }));
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryDatabaseResponse {
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Page creation request.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePageRequest {
    pub parent: Parent,
    pub properties: HashMap<String, PropertyValue>,
}

impl CreatePageRequest {
    pub fn in_database(
        database_id: impl Into<String>,
        properties: HashMap<String, PropertyValue>,
    ) -> Self {
        Self {
            parent: Parent {
                database_id: database_id.into(),
            },
            properties,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Parent {
    pub database_id: String,
}

/// Page update request (partial property patch and/or archival).
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdatePageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, PropertyValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

/// Error body returned by the Notion API.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_round_trip() {
        let prop = PropertyValue::title("Fuglen Tokyo");
        let json = serde_json::to_string(&prop).unwrap();
        let back: PropertyValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back.plain_text().as_deref(), Some("Fuglen Tokyo"));
    }

    #[test]
    fn test_read_only_plain_text() {
        // Reads only carry plain_text, not text.content
        let json = r#"{"type":"rich_text","rich_text":[{"plain_text":"hello "},{"plain_text":"world"}]}"#;
        let prop: PropertyValue = serde_json::from_str(json).unwrap();
        assert_eq!(prop.plain_text().as_deref(), Some("hello world"));
    }

    #[test]
    fn test_null_url_deserializes() {
        let json = r#"{"type":"url","url":null}"#;
        let prop: PropertyValue = serde_json::from_str(json).unwrap();
        assert_eq!(prop.url_value(), None);
    }

    #[test]
    fn test_unknown_property_type_ignored() {
        // A checkbox property should not break page deserialization
        let json = r#"{
            "id": "abc",
            "properties": {
                "Done?": {"type": "checkbox", "checkbox": true},
                "Name": {"type": "title", "title": [{"plain_text": "x"}]}
            }
        }"#;
        let page: Page = serde_json::from_str(json).unwrap();
        assert_eq!(
            page.property("Name").and_then(|p| p.plain_text()).as_deref(),
            Some("x")
        );
    }

    #[test]
    fn test_empty_rich_text_clears() {
        let prop = PropertyValue::rich_text("");
        let json = serde_json::to_value(&prop).unwrap();
        assert_eq!(json["rich_text"], serde_json::json!([]));
    }

    #[test]
    fn test_query_filter_shape() {
        let req = QueryDatabaseRequest::new()
            .filter_status_does_not_equal("Status", "Done")
            .sort(Sort::ascending("Date"));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["filter"]["property"], "Status");
        assert_eq!(json["filter"]["status"]["does_not_equal"], "Done");
        assert_eq!(json["sorts"][0]["direction"], "ascending");
    }
}
