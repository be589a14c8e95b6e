//! Testing utilities including mock adapter implementations.
//!
//! These are useful for exercising the capture/enrich workflow without
//! making real AI or network calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{AnalysisResult, BaseAnalyzer, BasePlaceLookup, BaseScraper, PlaceDetails};

/// A mock scraper returning predefined page text per URL.
#[derive(Default)]
pub struct MockScraper {
    pages: Arc<RwLock<HashMap<String, String>>>,
    fail_urls: Arc<RwLock<Vec<String>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockScraper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add predefined page text for a URL.
    pub fn with_page(self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.pages.write().unwrap().insert(url.into(), text.into());
        self
    }

    /// Mark a URL as failing.
    pub fn fail_url(self, url: impl Into<String>) -> Self {
        self.fail_urls.write().unwrap().push(url.into());
        self
    }

    /// URLs scraped so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl BaseScraper for MockScraper {
    async fn scrape(&self, url: &str) -> anyhow::Result<String> {
        self.calls.write().unwrap().push(url.to_string());

        if self.fail_urls.read().unwrap().contains(&url.to_string()) {
            anyhow::bail!("mock scrape failure for {}", url);
        }

        Ok(self
            .pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| format!("Title: page at {}\nDescription: \nContent: ", url)))
    }
}

/// A mock analyzer returning predefined results per URL, falling back to the
/// adapter's standard stub for unknown URLs (mirroring the real adapter's
/// total behavior).
#[derive(Default)]
pub struct MockAnalyzer {
    results: Arc<RwLock<HashMap<String, AnalysisResult>>>,
    calls: Arc<RwLock<Vec<MockAnalyzerCall>>>,
}

/// Record of a call made to the mock analyzer.
#[derive(Debug, Clone)]
pub struct MockAnalyzerCall {
    pub url: String,
    pub had_context: bool,
    pub had_place: bool,
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predefined result for a URL.
    pub fn with_result(self, url: impl Into<String>, result: AnalysisResult) -> Self {
        self.results.write().unwrap().insert(url.into(), result);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockAnalyzerCall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl BaseAnalyzer for MockAnalyzer {
    async fn analyze(
        &self,
        url: &str,
        context: Option<&str>,
        place: Option<&PlaceDetails>,
    ) -> AnalysisResult {
        self.calls.write().unwrap().push(MockAnalyzerCall {
            url: url.to_string(),
            had_context: context.is_some(),
            had_place: place.is_some(),
        });

        self.results
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| AnalysisResult::fallback(url))
    }
}

/// A mock place lookup returning predefined place data per maps URL.
#[derive(Default)]
pub struct MockPlaceLookup {
    places: Arc<RwLock<HashMap<String, PlaceDetails>>>,
}

impl MockPlaceLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(self, url: impl Into<String>, place: PlaceDetails) -> Self {
        self.places.write().unwrap().insert(url.into(), place);
        self
    }
}

#[async_trait]
impl BasePlaceLookup for MockPlaceLookup {
    async fn lookup(&self, maps_url: &str) -> Option<PlaceDetails> {
        self.places.read().unwrap().get(maps_url).cloned()
    }
}
