//! In-memory itinerary store for tests and local development.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use super::models::{derive_type, ItineraryItem};
use super::store::{
    ItemDraft, ItemPatch, ItineraryStore, ListFilter, LockUpdate, Result, StoreError,
};
use super::visuals::visual_for_item;
use crate::domains::itinerary::ItemStatus;

/// HashMap-backed store. Mirrors the document store's mapping behavior
/// (type derivation, placeholder visuals, patch merge semantics) so workflow
/// tests exercise the same item shapes production produces.
#[derive(Default)]
pub struct MemoryItineraryStore {
    items: RwLock<HashMap<String, ItineraryItem>>,
    next_id: AtomicU64,
}

impl MemoryItineraryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing draft validation.
    pub fn seed(&self, item: ItineraryItem) {
        self.items.write().unwrap().insert(item.id.clone(), item);
    }

    /// Snapshot of a record including internal state such as the lease.
    pub fn snapshot(&self, id: &str) -> Option<ItineraryItem> {
        self.items.read().unwrap().get(id).cloned()
    }

    fn refresh_derived(item: &mut ItineraryItem) {
        item.item_type = derive_type(&item.categories, &item.title, item.area.as_deref());
        item.visual = if item.cover_image.is_none() {
            Some(visual_for_item(
                &item.id,
                item.item_type,
                &item.title,
                item.transport.as_ref().and_then(|t| t.mode.as_deref()),
            ))
        } else {
            None
        };
        item.last_edited = Some(Utc::now());
    }
}

#[async_trait]
impl ItineraryStore for MemoryItineraryStore {
    async fn list(&self, filter: ListFilter) -> Result<Vec<ItineraryItem>> {
        let items = self.items.read().unwrap();
        let mut result: Vec<ItineraryItem> = items
            .values()
            .filter(|i| filter.include_done || i.status != ItemStatus::Done)
            .cloned()
            .collect();
        // date ascending, undated records last
        result.sort_by(|a, b| match (&a.date, &b.date) {
            (Some(x), Some(y)) => x.cmp(y).then_with(|| a.time.cmp(&b.time)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        });
        Ok(result)
    }

    async fn create(&self, draft: ItemDraft) -> Result<String> {
        if draft.title.trim().is_empty() {
            return Err(StoreError::Invalid("title must not be empty".into()));
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = format!("mem-{n}");

        let mut item = ItineraryItem {
            id: id.clone(),
            title: draft.title,
            date: draft.date,
            time: draft.time,
            status: draft.status.unwrap_or_default(),
            ai_processing: draft.ai_processing,
            area: draft.area,
            categories: draft.categories,
            url: draft.url,
            maps_url: draft.maps_url,
            summary: draft.summary,
            cost: draft.cost,
            transport: draft.transport,
            accommodation: draft.accommodation,
            ..Default::default()
        };
        Self::refresh_derived(&mut item);

        self.items.write().unwrap().insert(id.clone(), item);
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<ItineraryItem> {
        self.items
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                page_id: id.to_string(),
            })
    }

    async fn update(&self, id: &str, patch: ItemPatch) -> Result<()> {
        let mut items = self.items.write().unwrap();
        let item = items.get_mut(id).ok_or_else(|| StoreError::NotFound {
            page_id: id.to_string(),
        })?;

        if let Some(title) = patch.title {
            item.title = title;
        }
        if let Some(url) = patch.url {
            item.url = Some(url);
        }
        if let Some(date) = patch.date {
            item.date = Some(date);
        }
        if let Some(time) = patch.time {
            item.time = Some(time);
        }
        if let Some(status) = patch.status {
            item.status = status;
        }
        if let Some(ai) = patch.ai_processing {
            item.ai_processing = Some(ai);
        }
        if let Some(area) = patch.area {
            item.area = Some(area);
        }
        if let Some(categories) = patch.categories {
            item.categories = categories;
        }
        if let Some(summary) = patch.summary {
            item.summary = Some(summary);
        }
        if let Some(maps_url) = patch.maps_url {
            item.maps_url = Some(maps_url);
        }
        if let Some(cost) = patch.cost {
            item.cost = Some(cost);
        }
        if let Some(transport) = patch.transport {
            item.transport = Some(transport);
        }
        if let Some(accommodation) = patch.accommodation {
            item.accommodation = Some(accommodation);
        }
        match patch.lock {
            Some(LockUpdate::Set(lease)) => item.lock = Some(lease),
            Some(LockUpdate::Clear) => item.lock = None,
            None => {}
        }

        Self::refresh_derived(item);
        Ok(())
    }

    async fn archive(&self, id: &str) -> Result<()> {
        self.items
            .write()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                page_id: id.to_string(),
            })
    }
}
