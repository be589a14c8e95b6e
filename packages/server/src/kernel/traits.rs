// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (like the capture/enrich workflow) lives in domain
// functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseScraper, BaseAnalyzer)

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// =============================================================================
// Scraper Trait (Infrastructure - URL to plain text)
// =============================================================================

#[async_trait]
pub trait BaseScraper: Send + Sync {
    /// Fetch a URL and reduce it to a plain-text approximation of the page
    /// (title, meta description, main body text).
    ///
    /// Propagates fetch failures - callers decide whether a failed scrape
    /// aborts their operation.
    async fn scrape(&self, url: &str) -> Result<String>;
}

// =============================================================================
// Analyzer Trait (Infrastructure - LLM content analysis)
// =============================================================================

/// Normalized result of analyzing one captured URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub title: String,
    pub summary: String,
    pub area: String,
    pub category: Vec<String>,
    pub maps_url: Option<String>,
}

impl AnalysisResult {
    /// Fixed stub returned whenever analysis cannot produce real data.
    pub fn fallback(url: &str) -> Self {
        Self {
            title: "New Item".to_string(),
            summary: "Processed without AI details.".to_string(),
            area: "Unknown".to_string(),
            category: vec!["Activity".to_string()],
            maps_url: Some(url.to_string()),
        }
    }
}

#[async_trait]
pub trait BaseAnalyzer: Send + Sync {
    /// Analyze a captured URL, optionally with scraped page text and
    /// verified place data as extra context.
    ///
    /// Total: implementations absorb their own failures (missing
    /// credentials, network errors, malformed replies) and return
    /// `AnalysisResult::fallback` instead of raising.
    async fn analyze(
        &self,
        url: &str,
        context: Option<&str>,
        place: Option<&PlaceDetails>,
    ) -> AnalysisResult;
}

// =============================================================================
// Place Lookup Trait (Infrastructure - maps URL to verified place data)
// =============================================================================

/// Verified place data from a places-search API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetails {
    pub title: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_rating_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_maps_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub opening_hours: Vec<String>,
}

#[async_trait]
pub trait BasePlaceLookup: Send + Sync {
    /// Resolve a maps URL to verified place data.
    ///
    /// Returns None when the URL yields no searchable query, the API finds
    /// nothing, or the lookup fails - place data is enrichment, never a
    /// hard requirement.
    async fn lookup(&self, maps_url: &str) -> Option<PlaceDetails>;
}
