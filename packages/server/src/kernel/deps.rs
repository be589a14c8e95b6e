//! Server dependencies (using traits for testability)
//!
//! This module provides the central dependency container used by the
//! workflow and route handlers. All external services sit behind trait
//! abstractions so tests can substitute doubles; nothing here is a
//! module-level global.

use std::sync::Arc;

use crate::domains::itinerary::ItineraryStore;
use crate::kernel::{BaseAnalyzer, BasePlaceLookup, BaseScraper};

/// Server dependencies accessible to route handlers and the workflow
#[derive(Clone)]
pub struct ServerDeps {
    /// The document store holding all itinerary records
    pub store: Arc<dyn ItineraryStore>,
    /// Content extraction (URL to plain text)
    pub scraper: Arc<dyn BaseScraper>,
    /// AI analysis (total - never raises)
    pub analyzer: Arc<dyn BaseAnalyzer>,
    /// Verified place lookup (optional - not all envs carry an API key)
    pub places: Option<Arc<dyn BasePlaceLookup>>,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn ItineraryStore>,
        scraper: Arc<dyn BaseScraper>,
        analyzer: Arc<dyn BaseAnalyzer>,
        places: Option<Arc<dyn BasePlaceLookup>>,
    ) -> Self {
        Self {
            store,
            scraper,
            analyzer,
            places,
        }
    }
}
