//! Data migration: lift legacy emoji-tagged summary lines into structured
//! transport and accommodation fields.
//!
//! Early records encoded transit and stay details as text lines at the top
//! of the AI summary:
//!
//! ```text
//! 🚆 新幹線 | 東京 → 京都 | 月台 14 | 3車 12A | 2小時15分
//! 🏨 15:00 入住 | 11:00 退房 | 含早餐 | 溫泉 · 大浴場
//! ```
//!
//! The read path no longer parses these. This migration extracts them into
//! the structured JSON fields once, removes the lines from the summary, and
//! leaves records without markers untouched.

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domains::itinerary::{
    AccommodationInfo, ItemPatch, ItineraryItem, ItineraryStore, ListFilter, TransportInfo,
};

use super::{DataMigration, MigrationContext, MigrationReport};

const TRANSPORT_MARKER: char = '🚆';
const STAY_MARKER: char = '🏨';

pub struct BackfillStructuredDetails;

#[async_trait]
impl DataMigration for BackfillStructuredDetails {
    fn name(&self) -> &'static str {
        "backfill_structured_details"
    }

    fn description(&self) -> &'static str {
        "Extract legacy emoji-tagged summary lines into structured transport and stay fields"
    }

    async fn estimate(&self, store: &Arc<dyn ItineraryStore>) -> Result<usize> {
        let items = store.list(ListFilter { include_done: true }).await?;
        Ok(items.iter().filter(|i| needs_migration(i)).count())
    }

    async fn run(&self, ctx: &MigrationContext) -> Result<MigrationReport> {
        let items = ctx.store.list(ListFilter { include_done: true }).await?;
        let mut report = MigrationReport::default();

        for item in items {
            report.scanned += 1;
            if !needs_migration(&item) {
                report.skipped += 1;
                continue;
            }

            let summary = item.summary.as_deref().unwrap_or("");
            let extraction = extract_details(summary);

            if ctx.dry_run {
                info!(page_id = %item.id, "Would migrate");
                report.migrated += 1;
                continue;
            }

            let patch = ItemPatch {
                summary: Some(extraction.cleaned_summary),
                transport: extraction.transport,
                accommodation: extraction.accommodation,
                ..Default::default()
            };
            match ctx.store.update(&item.id, patch).await {
                Ok(()) => {
                    info!(page_id = %item.id, "Migrated");
                    report.migrated += 1;
                }
                Err(e) => {
                    warn!(page_id = %item.id, error = %e, "Migration failed for record");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

fn needs_migration(item: &ItineraryItem) -> bool {
    let has_markers = item
        .summary
        .as_deref()
        .is_some_and(|s| s.contains(TRANSPORT_MARKER) || s.contains(STAY_MARKER));
    // Records already carrying structured fields were migrated or written
    // by the current pipeline.
    has_markers && item.transport.is_none() && item.accommodation.is_none()
}

struct Extraction {
    transport: Option<TransportInfo>,
    accommodation: Option<AccommodationInfo>,
    cleaned_summary: String,
}

/// Pull marker lines out of a summary. The first line of each kind wins;
/// every marker line is removed from the remaining text.
fn extract_details(summary: &str) -> Extraction {
    let mut transport = None;
    let mut accommodation = None;
    let mut kept_lines = Vec::new();

    for line in summary.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with(TRANSPORT_MARKER) {
            if transport.is_none() {
                transport = parse_transport_line(trimmed);
            }
        } else if trimmed.starts_with(STAY_MARKER) {
            if accommodation.is_none() {
                accommodation = parse_stay_line(trimmed);
            }
        } else {
            kept_lines.push(line);
        }
    }

    Extraction {
        transport,
        accommodation,
        cleaned_summary: kept_lines.join("\n").trim().to_string(),
    }
}

/// `🚆 mode | from → to | 月台 p | c車 s | duration`
/// Only the mode segment is mandatory; the rest are recognized by shape.
fn parse_transport_line(line: &str) -> Option<TransportInfo> {
    let rest = line.strip_prefix(TRANSPORT_MARKER)?.trim();
    if rest.is_empty() {
        return None;
    }

    let car_seat = Regex::new(r"^(.+車)\s+(\S+)$").ok()?;
    let duration = Regex::new(r"^[\d\.]+\s*(?:分鐘|分|小時)").ok()?;

    let mut info = TransportInfo::default();
    for (index, segment) in rest.split('|').map(str::trim).enumerate() {
        if index == 0 {
            info.mode = Some(segment.to_string());
        } else if let Some((from, to)) = segment.split_once('→') {
            info.from = Some(from.trim().to_string());
            info.to = Some(to.trim().to_string());
        } else if let Some(platform) = segment.strip_prefix("月台") {
            info.platform = Some(platform.trim().to_string());
        } else if let Some(caps) = car_seat.captures(segment) {
            info.car = Some(caps[1].to_string());
            info.seat = Some(caps[2].to_string());
        } else if duration.is_match(segment) || segment.contains("小時") {
            info.duration = Some(segment.to_string());
        }
    }

    info.mode.is_some().then_some(info)
}

/// `🏨 in 入住 | out 退房 | 含早餐/含晚餐 | facility · facility`
fn parse_stay_line(line: &str) -> Option<AccommodationInfo> {
    let rest = line.strip_prefix(STAY_MARKER)?.trim();
    if rest.is_empty() {
        return None;
    }

    let mut info = AccommodationInfo::default();
    for segment in rest.split('|').map(str::trim) {
        if let Some(time) = segment.strip_suffix("入住") {
            info.check_in = Some(time.trim().to_string());
        } else if let Some(time) = segment.strip_suffix("退房") {
            info.check_out = Some(time.trim().to_string());
        } else if segment.contains("含早餐") || segment.contains("含晚餐") {
            if segment.contains("含早餐") {
                info.is_breakfast_included = Some(true);
            }
            if segment.contains("含晚餐") {
                info.is_dinner_included = Some(true);
            }
        } else if !segment.is_empty() {
            info.facilities
                .extend(segment.split('·').map(|f| f.trim().to_string()));
        }
    }

    let empty = info == AccommodationInfo::default();
    (!empty).then_some(info)
}
