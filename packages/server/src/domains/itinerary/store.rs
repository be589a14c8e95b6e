//! Itinerary persistence behind the `ItineraryStore` trait.
//!
//! `NotionItineraryStore` is the production implementation, mapping pages
//! to and from `ItineraryItem` through a detected schema revision. The
//! in-memory implementation for tests lives in [`super::memory`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

use notion_client::{
    CreatePageRequest, NotionClient, NotionError, Page, PropertyValue, QueryDatabaseRequest, Sort,
};

use super::models::{
    derive_type, AccommodationInfo, AiStatus, ItemStatus, ItineraryItem, LockLease, TransportInfo,
};
use super::schema::{self, SchemaVersion, SCHEMA_V2};
use super::visuals::visual_for_item;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {page_id}")]
    NotFound { page_id: String },
    #[error("record {page_id} matches no known property schema")]
    UnknownSchema { page_id: String },
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("document store error: {0}")]
    Notion(#[from] NotionError),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// List query options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListFilter {
    /// Include records whose planning status is Done (excluded by default).
    pub include_done: bool,
}

/// Fields for a new record. Everything except the title is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemDraft {
    pub title: String,
    pub url: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub status: Option<ItemStatus>,
    pub ai_processing: Option<AiStatus>,
    pub area: Option<String>,
    pub categories: Vec<String>,
    pub summary: Option<String>,
    pub maps_url: Option<String>,
    pub cost: Option<f64>,
    pub transport: Option<TransportInfo>,
    pub accommodation: Option<AccommodationInfo>,
}

/// Partial update. Only fields set to `Some` are written; the rest of the
/// record is left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub url: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub status: Option<ItemStatus>,
    pub ai_processing: Option<AiStatus>,
    pub area: Option<String>,
    pub categories: Option<Vec<String>>,
    pub summary: Option<String>,
    pub maps_url: Option<String>,
    pub cost: Option<f64>,
    pub transport: Option<TransportInfo>,
    pub accommodation: Option<AccommodationInfo>,
    /// Lease changes never come from client JSON.
    #[serde(skip)]
    pub lock: Option<LockUpdate>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.url.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.status.is_none()
            && self.ai_processing.is_none()
            && self.area.is_none()
            && self.categories.is_none()
            && self.summary.is_none()
            && self.maps_url.is_none()
            && self.cost.is_none()
            && self.transport.is_none()
            && self.accommodation.is_none()
            && self.lock.is_none()
    }
}

/// Lease mutation carried on a patch.
#[derive(Debug, Clone)]
pub enum LockUpdate {
    Set(LockLease),
    Clear,
}

/// Persistence seam for itinerary records.
#[async_trait]
pub trait ItineraryStore: Send + Sync {
    /// All records, sorted by date ascending.
    async fn list(&self, filter: ListFilter) -> Result<Vec<ItineraryItem>>;
    /// Create a record; returns its id.
    async fn create(&self, draft: ItemDraft) -> Result<String>;
    /// Fetch one record.
    async fn get(&self, id: &str) -> Result<ItineraryItem>;
    /// Apply a partial update.
    async fn update(&self, id: &str, patch: ItemPatch) -> Result<()>;
    /// Soft-delete a record.
    async fn archive(&self, id: &str) -> Result<()>;
}

/// Notion-backed store. All writes target the current schema revision;
/// reads accept any known revision.
pub struct NotionItineraryStore {
    client: NotionClient,
    database_id: String,
}

impl NotionItineraryStore {
    pub fn new(client: NotionClient, database_id: impl Into<String>) -> Self {
        Self {
            client,
            database_id: database_id.into(),
        }
    }
}

#[async_trait]
impl ItineraryStore for NotionItineraryStore {
    async fn list(&self, filter: ListFilter) -> Result<Vec<ItineraryItem>> {
        let mut request = QueryDatabaseRequest::new().sort(Sort::ascending(SCHEMA_V2.date));
        if !filter.include_done {
            request =
                request.filter_status_does_not_equal(SCHEMA_V2.status, ItemStatus::Done.as_str());
        }

        let response = self.client.query_database(&self.database_id, request).await?;

        let mut items = Vec::with_capacity(response.results.len());
        for page in response.results {
            match page_to_item(&page) {
                Ok(item) => items.push(item),
                // One alien record must not take the whole list down.
                Err(StoreError::UnknownSchema { page_id }) => {
                    warn!(page_id = %page_id, "Skipping record with unrecognized schema");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(items)
    }

    async fn create(&self, draft: ItemDraft) -> Result<String> {
        if draft.title.trim().is_empty() {
            return Err(StoreError::Invalid("title must not be empty".into()));
        }

        let properties = draft_properties(&draft, &SCHEMA_V2);
        let page = self
            .client
            .create_page(CreatePageRequest::in_database(&self.database_id, properties))
            .await?;
        Ok(page.id)
    }

    async fn get(&self, id: &str) -> Result<ItineraryItem> {
        let page = self.client.retrieve_page(id).await.map_err(|e| {
            if e.is_not_found() {
                StoreError::NotFound {
                    page_id: id.to_string(),
                }
            } else {
                e.into()
            }
        })?;

        if page.archived {
            return Err(StoreError::NotFound {
                page_id: id.to_string(),
            });
        }
        page_to_item(&page)
    }

    async fn update(&self, id: &str, patch: ItemPatch) -> Result<()> {
        let properties = patch_properties(&patch, &SCHEMA_V2);
        if properties.is_empty() {
            return Ok(());
        }

        self.client.update_page(id, properties).await.map_err(|e| {
            if e.is_not_found() {
                StoreError::NotFound {
                    page_id: id.to_string(),
                }
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    async fn archive(&self, id: &str) -> Result<()> {
        self.client.archive_page(id).await.map_err(|e| {
            if e.is_not_found() {
                StoreError::NotFound {
                    page_id: id.to_string(),
                }
            } else {
                e.into()
            }
        })?;
        Ok(())
    }
}

/// Combine date and optional time into a Notion date start value.
fn compose_date_start(date: &str, time: Option<&str>) -> String {
    match time {
        Some(t) if !t.is_empty() => format!("{date}T{t}:00"),
        _ => date.to_string(),
    }
}

/// Split a Notion date start value back into date and HH:MM time.
fn split_date_start(start: &str) -> (String, Option<String>) {
    match start.split_once('T') {
        Some((date, rest)) if rest.len() >= 5 => (date.to_string(), Some(rest[..5].to_string())),
        Some((date, _)) => (date.to_string(), None),
        None => (start.to_string(), None),
    }
}

fn format_cost(cost: f64) -> String {
    if cost.fract() == 0.0 {
        format!("{}", cost as i64)
    } else {
        format!("{cost}")
    }
}

/// Map a page onto the client-facing item through its detected schema.
pub fn page_to_item(page: &Page) -> Result<ItineraryItem> {
    let schema = schema::detect(&page.properties).ok_or_else(|| StoreError::UnknownSchema {
        page_id: page.id.clone(),
    })?;

    let prop = |name: &str| page.property(name);
    let text = |name: &str| prop(name).and_then(|p| p.plain_text());

    let title = text(schema.title).unwrap_or_else(|| "Untitled".to_string());

    let (date, time) = prop(schema.date)
        .and_then(|p| p.date_start())
        .map(split_date_start)
        .map(|(d, t)| (Some(d), t))
        .unwrap_or((None, None));

    let status = prop(schema.status)
        .and_then(|p| p.select_name())
        .and_then(ItemStatus::parse)
        .unwrap_or_default();

    let ai_processing = prop(schema.ai_processing)
        .and_then(|p| p.select_name())
        .and_then(AiStatus::parse);

    let area = prop(schema.area)
        .and_then(|p| p.select_name())
        .map(str::to_string);

    let categories = prop(schema.category)
        .map(|p| p.multi_select_names())
        .unwrap_or_default();

    let url = prop(schema.url).and_then(|p| p.url_value()).map(str::to_string);
    let maps_url = prop(schema.maps_url)
        .and_then(|p| p.url_value())
        .map(str::to_string);

    let summary = text(schema.summary);
    let cost = text(schema.cost).and_then(|c| c.trim().parse::<f64>().ok());

    let transport: Option<TransportInfo> =
        text(schema.transport_json).and_then(|raw| serde_json::from_str(&raw).ok());
    let accommodation: Option<AccommodationInfo> =
        text(schema.stay_json).and_then(|raw| serde_json::from_str(&raw).ok());

    let lock: Option<LockLease> =
        text(schema.lock).and_then(|raw| serde_json::from_str(&raw).ok());

    let item_type = derive_type(&categories, &title, area.as_deref());

    let cover_image = page.cover_url().map(str::to_string);
    let visual = if cover_image.is_none() {
        Some(visual_for_item(
            &page.id,
            item_type,
            &title,
            transport.as_ref().and_then(|t| t.mode.as_deref()),
        ))
    } else {
        None
    };

    let last_edited = page
        .last_edited_time
        .as_deref()
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.with_timezone(&Utc));

    Ok(ItineraryItem {
        id: page.id.clone(),
        title,
        date,
        time,
        status,
        ai_processing,
        area,
        categories,
        item_type,
        url,
        maps_url,
        summary,
        cost,
        cover_image,
        visual,
        transport,
        accommodation,
        lock,
        last_edited,
    })
}

/// Property map for creating a record.
pub fn draft_properties(
    draft: &ItemDraft,
    schema: &SchemaVersion,
) -> HashMap<String, PropertyValue> {
    let mut props = HashMap::new();
    props.insert(schema.title.to_string(), PropertyValue::title(&draft.title));
    props.insert(
        schema.status.to_string(),
        PropertyValue::status(draft.status.unwrap_or_default().as_str()),
    );

    if let Some(url) = &draft.url {
        props.insert(schema.url.to_string(), PropertyValue::url(url));
    }
    if let Some(date) = &draft.date {
        props.insert(
            schema.date.to_string(),
            PropertyValue::date(compose_date_start(date, draft.time.as_deref())),
        );
    }
    if let Some(ai) = draft.ai_processing {
        props.insert(
            schema.ai_processing.to_string(),
            PropertyValue::select(ai.as_str()),
        );
    }
    if let Some(area) = &draft.area {
        props.insert(schema.area.to_string(), PropertyValue::select(area));
    }
    if !draft.categories.is_empty() {
        props.insert(
            schema.category.to_string(),
            PropertyValue::multi_select(draft.categories.clone()),
        );
    }
    if let Some(summary) = &draft.summary {
        props.insert(schema.summary.to_string(), PropertyValue::rich_text(summary));
    }
    if let Some(maps_url) = &draft.maps_url {
        props.insert(schema.maps_url.to_string(), PropertyValue::url(maps_url));
    }
    if let Some(cost) = draft.cost {
        props.insert(
            schema.cost.to_string(),
            PropertyValue::rich_text(format_cost(cost)),
        );
    }
    if let Some(transport) = &draft.transport {
        if let Ok(raw) = serde_json::to_string(transport) {
            props.insert(schema.transport_json.to_string(), PropertyValue::rich_text(raw));
        }
    }
    if let Some(stay) = &draft.accommodation {
        if let Ok(raw) = serde_json::to_string(stay) {
            props.insert(schema.stay_json.to_string(), PropertyValue::rich_text(raw));
        }
    }

    props
}

/// Property map for a partial update. Only patched fields appear.
pub fn patch_properties(
    patch: &ItemPatch,
    schema: &SchemaVersion,
) -> HashMap<String, PropertyValue> {
    let mut props = HashMap::new();

    if let Some(title) = &patch.title {
        props.insert(schema.title.to_string(), PropertyValue::title(title));
    }
    if let Some(url) = &patch.url {
        props.insert(schema.url.to_string(), PropertyValue::url(url));
    }
    if let Some(date) = &patch.date {
        props.insert(
            schema.date.to_string(),
            PropertyValue::date(compose_date_start(date, patch.time.as_deref())),
        );
    }
    if let Some(status) = patch.status {
        props.insert(
            schema.status.to_string(),
            PropertyValue::status(status.as_str()),
        );
    }
    if let Some(ai) = patch.ai_processing {
        props.insert(
            schema.ai_processing.to_string(),
            PropertyValue::select(ai.as_str()),
        );
    }
    if let Some(area) = &patch.area {
        props.insert(schema.area.to_string(), PropertyValue::select(area));
    }
    if let Some(categories) = &patch.categories {
        props.insert(
            schema.category.to_string(),
            PropertyValue::multi_select(categories.clone()),
        );
    }
    if let Some(summary) = &patch.summary {
        props.insert(schema.summary.to_string(), PropertyValue::rich_text(summary));
    }
    if let Some(maps_url) = &patch.maps_url {
        props.insert(schema.maps_url.to_string(), PropertyValue::url(maps_url));
    }
    if let Some(cost) = patch.cost {
        props.insert(
            schema.cost.to_string(),
            PropertyValue::rich_text(format_cost(cost)),
        );
    }
    if let Some(transport) = &patch.transport {
        if let Ok(raw) = serde_json::to_string(transport) {
            props.insert(schema.transport_json.to_string(), PropertyValue::rich_text(raw));
        }
    }
    if let Some(stay) = &patch.accommodation {
        if let Ok(raw) = serde_json::to_string(stay) {
            props.insert(schema.stay_json.to_string(), PropertyValue::rich_text(raw));
        }
    }
    match &patch.lock {
        Some(LockUpdate::Set(lease)) => {
            if let Ok(raw) = serde_json::to_string(lease) {
                props.insert(schema.lock.to_string(), PropertyValue::rich_text(raw));
            }
        }
        Some(LockUpdate::Clear) => {
            props.insert(schema.lock.to_string(), PropertyValue::rich_text(""));
        }
        None => {}
    }

    props
}
