//! Core itinerary types.
//!
//! `ItineraryItem` is the JSON shape served to clients; it is produced by a
//! store from the underlying document properties. Field names serialize in
//! camelCase to match the client contract.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::visuals::Visual;

/// Trip planning status of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    Inbox,
    #[serde(rename = "To Review")]
    ToReview,
    Scheduled,
    Done,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Inbox => "Inbox",
            ItemStatus::ToReview => "To Review",
            ItemStatus::Scheduled => "Scheduled",
            ItemStatus::Done => "Done",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Inbox" => Some(ItemStatus::Inbox),
            "To Review" => Some(ItemStatus::ToReview),
            "Scheduled" => Some(ItemStatus::Scheduled),
            "Done" => Some(ItemStatus::Done),
            _ => None,
        }
    }
}

impl Default for ItemStatus {
    fn default() -> Self {
        ItemStatus::Inbox
    }
}

/// AI enrichment state of an item. Absent on items that never entered the
/// enrichment pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiStatus {
    Pending,
    Processing,
    Done,
    Error,
}

impl AiStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiStatus::Pending => "Pending",
            AiStatus::Processing => "Processing",
            AiStatus::Done => "Done",
            AiStatus::Error => "Error",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Pending" => Some(AiStatus::Pending),
            "Processing" => Some(AiStatus::Processing),
            "Done" => Some(AiStatus::Done),
            "Error" => Some(AiStatus::Error),
            _ => None,
        }
    }
}

/// Coarse item kind derived from categories, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Food,
    Transport,
    Activity,
    Shop,
    Stay,
}

impl ItemType {
    /// Display label in Traditional Chinese.
    pub fn label(&self) -> &'static str {
        match self {
            ItemType::Food => "美食",
            ItemType::Transport => "交通",
            ItemType::Activity => "景點",
            ItemType::Shop => "購物",
            ItemType::Stay => "住宿",
        }
    }
}

/// Title prefix that marks an item as a transit leg regardless of category.
const TRANSIT_TITLE_PREFIX: &str = "前往";

/// Area value used for transit legs.
pub const TRANSIT_AREA: &str = "交通";

/// Derive the item kind from its categories, with a reclassification pass
/// for transit legs that were categorized as something else.
pub fn derive_type(categories: &[String], title: &str, area: Option<&str>) -> ItemType {
    let mut kind = ItemType::Activity;

    'outer: for category in categories {
        let c = category.to_lowercase();
        let matchers: [(&[&str], ItemType); 4] = [
            (&["food", "cafe", "restaurant", "美食", "咖啡", "餐廳"], ItemType::Food),
            (&["transport", "train", "bus", "flight", "交通", "電車"], ItemType::Transport),
            (&["shop", "market", "購物", "商店"], ItemType::Shop),
            (&["stay", "hotel", "hostel", "住宿", "飯店", "旅館"], ItemType::Stay),
        ];
        for (keywords, candidate) in matchers {
            if keywords.iter().any(|k| c.contains(k)) {
                kind = candidate;
                break 'outer;
            }
        }
    }

    if kind != ItemType::Transport
        && (title.starts_with(TRANSIT_TITLE_PREFIX) || area == Some(TRANSIT_AREA))
    {
        kind = ItemType::Transport;
    }

    kind
}

/// Structured details for a transit leg.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransportInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// Structured details for an accommodation stay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccommodationInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_breakfast_included: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_dinner_included: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facilities: Vec<String>,
}

/// Enrichment lock lease, stored alongside the record while a worker holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockLease {
    /// Random token identifying the worker that acquired the lock.
    pub owner: String,
    pub acquired_at: DateTime<Utc>,
}

impl LockLease {
    pub fn acquire(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            acquired_at: Utc::now(),
        }
    }

    /// A lease older than the TTL no longer protects the record; a stuck
    /// Processing state becomes retryable once it expires.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        Utc::now() - self.acquired_at > ttl
    }
}

/// A single itinerary record in client-facing form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryItem {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_processing: Option<AiStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    pub categories: Vec<String>,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maps_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    /// Deterministic placeholder, populated only when there is no cover.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual: Option<Visual>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accommodation: Option<AccommodationInfo>,
    /// Internal enrichment lease, never serialized to clients.
    #[serde(skip)]
    pub lock: Option<LockLease>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_edited: Option<DateTime<Utc>>,
}

impl Default for ItineraryItem {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            date: None,
            time: None,
            status: ItemStatus::Inbox,
            ai_processing: None,
            area: None,
            categories: Vec::new(),
            item_type: ItemType::Activity,
            url: None,
            maps_url: None,
            summary: None,
            cost: None,
            cover_image: None,
            visual: None,
            transport: None,
            accommodation: None,
            lock: None,
            last_edited: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ItemStatus::Inbox,
            ItemStatus::ToReview,
            ItemStatus::Scheduled,
            ItemStatus::Done,
        ] {
            assert_eq!(ItemStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ItemStatus::parse("Backlog"), None);
    }

    #[test]
    fn test_ai_status_round_trip() {
        for status in [
            AiStatus::Pending,
            AiStatus::Processing,
            AiStatus::Done,
            AiStatus::Error,
        ] {
            assert_eq!(AiStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(AiStatus::parse("Queued"), None);
    }

    #[test]
    fn test_derive_type_from_categories() {
        let cats = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert_eq!(derive_type(&cats(&["Food"]), "Ichiran", None), ItemType::Food);
        assert_eq!(derive_type(&cats(&["咖啡廳"]), "Fuglen", None), ItemType::Food);
        assert_eq!(derive_type(&cats(&["Shopping Mall"]), "Parco", None), ItemType::Shop);
        assert_eq!(derive_type(&cats(&["Hotel"]), "Mustard Hotel", None), ItemType::Stay);
        assert_eq!(derive_type(&cats(&["Museum"]), "teamLab", None), ItemType::Activity);
        assert_eq!(derive_type(&[], "Somewhere", None), ItemType::Activity);
    }

    #[test]
    fn test_derive_type_transit_reclassification() {
        let cats = vec!["Activity".to_string()];
        assert_eq!(derive_type(&cats, "前往新宿", None), ItemType::Transport);
        assert_eq!(derive_type(&cats, "Narita Express", Some("交通")), ItemType::Transport);
        assert_eq!(derive_type(&cats, "Narita Express", Some("新宿")), ItemType::Activity);
    }

    #[test]
    fn test_lease_expiry() {
        let fresh = LockLease::acquire("worker-a");
        assert!(!fresh.is_expired(Duration::minutes(10)));

        let stale = LockLease {
            owner: "worker-b".to_string(),
            acquired_at: Utc::now() - Duration::minutes(30),
        };
        assert!(stale.is_expired(Duration::minutes(10)));
    }

    #[test]
    fn test_item_serializes_camel_case() {
        let item = ItineraryItem {
            id: "p1".to_string(),
            title: "Fuglen Tokyo".to_string(),
            maps_url: Some("https://maps.app.goo.gl/x".to_string()),
            ai_processing: Some(AiStatus::Done),
            item_type: ItemType::Food,
            lock: Some(LockLease::acquire("w")),
            ..Default::default()
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["mapsUrl"], "https://maps.app.goo.gl/x");
        assert_eq!(json["aiProcessing"], "Done");
        assert_eq!(json["type"], "food");
        // the lease is internal state
        assert!(json.get("lock").is_none());
    }
}
