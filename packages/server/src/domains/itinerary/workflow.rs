//! Capture and enrichment workflow.
//!
//! Capture writes a minimal record immediately; enrichment runs later and
//! fills in AI-derived fields. Enrichment follows a check / lock / execute /
//! update sequence over the `aiProcessing` state machine:
//!
//! ```text
//! (absent)            never enriched, ineligible
//! Pending ----------> Processing ----------> Done
//!                        |                     eligible only via stale lease
//!                        +------------------> Error (retryable)
//! ```
//!
//! The lock is a lease: a worker writes its own token plus a timestamp,
//! re-reads to confirm it won, and any lease older than the TTL is treated
//! as abandoned so a crashed worker cannot wedge a record in Processing.

use chrono::Duration;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::kernel::ServerDeps;

use super::models::{AiStatus, ItemStatus, ItineraryItem, LockLease};
use super::store::{ItemDraft, ItemPatch, LockUpdate, StoreError};

/// How long a Processing lease protects a record.
pub const LOCK_TTL_MINUTES: i64 = 10;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("either a url or a title is required")]
    MissingInput,
    #[error("record {page_id} has no URL to analyze")]
    NoUrl { page_id: String },
    #[error("content extraction failed: {0}")]
    Scrape(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Quick-capture input. At least one of `url` and `title` must be present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureRequest {
    pub url: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub area: Option<String>,
    pub status: Option<ItemStatus>,
}

#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub page_id: String,
    /// Whether the record entered the enrichment queue (it carried a URL).
    pub enqueued: bool,
}

/// Result of one enrichment attempt.
#[derive(Debug, Clone)]
pub enum EnrichOutcome {
    /// The record was analyzed and updated.
    Enriched { item: ItineraryItem },
    /// Nothing was done; the record was already handled or is being handled.
    Skipped { ai_status: AiStatus, message: String },
}

/// Enrichment state probe for polling clients.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub page_id: String,
    /// "Pending" / "Processing" / "Done" / "Error", or "Unknown" for records
    /// that never entered the pipeline.
    pub ai_status: String,
    pub title: String,
}

/// Capture a record now, enrich later. The title falls back to the URL so
/// the record is identifiable before analysis names it properly.
pub async fn capture(
    deps: &ServerDeps,
    request: CaptureRequest,
) -> Result<CaptureOutcome, WorkflowError> {
    let has_url = request.url.as_deref().is_some_and(|u| !u.trim().is_empty());
    let title = request
        .title
        .filter(|t| !t.trim().is_empty())
        .or_else(|| request.url.clone().filter(|u| !u.trim().is_empty()))
        .ok_or(WorkflowError::MissingInput)?;

    let draft = ItemDraft {
        title,
        url: request.url.filter(|u| !u.trim().is_empty()),
        date: request.date,
        time: request.time,
        area: request.area,
        status: Some(request.status.unwrap_or(ItemStatus::Inbox)),
        ai_processing: has_url.then_some(AiStatus::Pending),
        ..Default::default()
    };

    let page_id = deps.store.create(draft).await?;
    info!(page_id = %page_id, enqueued = has_url, "Captured record");

    Ok(CaptureOutcome {
        page_id,
        enqueued: has_url,
    })
}

/// Create a full record from client-supplied fields. As with capture, the
/// title falls back to the URL, and pipeline eligibility is decided here,
/// not by the client: a URL enqueues the record, its absence keeps
/// `aiProcessing` unset.
pub async fn create_item(deps: &ServerDeps, mut draft: ItemDraft) -> Result<String, WorkflowError> {
    let has_url = draft.url.as_deref().is_some_and(|u| !u.trim().is_empty());
    if draft.title.trim().is_empty() {
        match &draft.url {
            Some(url) if has_url => draft.title = url.clone(),
            _ => return Err(WorkflowError::MissingInput),
        }
    }
    draft.ai_processing = has_url.then_some(AiStatus::Pending);

    Ok(deps.store.create(draft).await?)
}

/// Run one enrichment attempt against a record. On failure the record is
/// marked Error (best effort) so it is visibly retryable rather than stuck.
pub async fn enrich(deps: &ServerDeps, page_id: &str) -> Result<EnrichOutcome, WorkflowError> {
    let result = enrich_inner(deps, page_id).await;

    if let Err(e) = &result {
        // Leave the record alone when it does not exist at all.
        if !matches!(e, WorkflowError::Store(StoreError::NotFound { .. })) {
            mark_error(deps, page_id).await;
        }
    }
    result
}

async fn enrich_inner(deps: &ServerDeps, page_id: &str) -> Result<EnrichOutcome, WorkflowError> {
    // Check
    let item = deps.store.get(page_id).await?;

    match item.ai_processing {
        Some(AiStatus::Done) => {
            return Ok(EnrichOutcome::Skipped {
                ai_status: AiStatus::Done,
                message: "already processed".into(),
            });
        }
        Some(AiStatus::Processing) => {
            let lease_fresh = item
                .lock
                .as_ref()
                .is_some_and(|l| !l.is_expired(Duration::minutes(LOCK_TTL_MINUTES)));
            if lease_fresh {
                return Ok(EnrichOutcome::Skipped {
                    ai_status: AiStatus::Processing,
                    message: "analysis already in progress".into(),
                });
            }
            warn!(page_id = %page_id, "Reclaiming record with expired lease");
        }
        _ => {}
    }

    let url = match &item.url {
        Some(u) if !u.trim().is_empty() => u.clone(),
        _ => {
            return Err(WorkflowError::NoUrl {
                page_id: page_id.to_string(),
            });
        }
    };

    // Lock
    let lease = LockLease::acquire(Uuid::new_v4().to_string());
    deps.store
        .update(
            page_id,
            ItemPatch {
                ai_processing: Some(AiStatus::Processing),
                lock: Some(LockUpdate::Set(lease.clone())),
                ..Default::default()
            },
        )
        .await?;

    // Verify the lease landed; a concurrent worker may have overwritten it
    // between our write and this read.
    let reread = deps.store.get(page_id).await?;
    match &reread.lock {
        Some(held) if held.owner == lease.owner => {}
        _ => {
            return Ok(EnrichOutcome::Skipped {
                ai_status: AiStatus::Processing,
                message: "another worker claimed this record".into(),
            });
        }
    }

    // Execute
    let context = match deps.scraper.scrape(&url).await {
        Ok(text) => Some(text),
        Err(e) => {
            return Err(WorkflowError::Scrape(e.to_string()));
        }
    };

    let maps_candidate = item
        .maps_url
        .clone()
        .or_else(|| is_maps_url(&url).then(|| url.clone()));
    let place = match (&deps.places, &maps_candidate) {
        (Some(places), Some(maps_url)) => places.lookup(maps_url).await,
        _ => None,
    };

    let analysis = deps
        .analyzer
        .analyze(&url, context.as_deref(), place.as_ref())
        .await;

    // Update: write only fields the analysis actually produced
    let mut patch = ItemPatch {
        ai_processing: Some(AiStatus::Done),
        lock: Some(LockUpdate::Clear),
        ..Default::default()
    };
    if !analysis.title.trim().is_empty() {
        patch.title = Some(analysis.title.clone());
    }
    if !analysis.summary.trim().is_empty() {
        patch.summary = Some(analysis.summary.clone());
    }
    if !analysis.area.trim().is_empty() {
        patch.area = Some(analysis.area.clone());
    }
    if !analysis.category.is_empty() {
        patch.categories = Some(analysis.category.clone());
    }
    if let Some(maps_url) = analysis
        .maps_url
        .clone()
        .filter(|m| !m.trim().is_empty())
        .or(maps_candidate)
    {
        patch.maps_url = Some(maps_url);
    }

    deps.store.update(page_id, patch).await?;
    info!(page_id = %page_id, title = %analysis.title, "Enrichment complete");

    let item = deps.store.get(page_id).await?;
    Ok(EnrichOutcome::Enriched { item })
}

/// Probe the enrichment state of a record.
pub async fn enrich_status(deps: &ServerDeps, page_id: &str) -> Result<StatusReport, WorkflowError> {
    let item = deps.store.get(page_id).await?;
    Ok(StatusReport {
        page_id: page_id.to_string(),
        ai_status: item
            .ai_processing
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| "Unknown".to_string()),
        title: item.title,
    })
}

/// Best-effort Error marker. A failure here must not mask the original
/// error, so it only logs.
async fn mark_error(deps: &ServerDeps, page_id: &str) {
    let patch = ItemPatch {
        ai_processing: Some(AiStatus::Error),
        lock: Some(LockUpdate::Clear),
        ..Default::default()
    };
    if let Err(write_err) = deps.store.update(page_id, patch).await {
        warn!(page_id = %page_id, error = %write_err, "Could not mark record as Error");
    }
}

/// Heuristic for URLs the place lookup can resolve.
fn is_maps_url(url: &str) -> bool {
    url.contains("maps.app.goo.gl")
        || url.contains("goo.gl/maps")
        || url.contains("google.com/maps")
        || url.contains("maps.google")
}
