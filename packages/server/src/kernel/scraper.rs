//! Simple web scraper - local HTTP fetch + HTML-to-text reduction
//!
//! This implementation:
//! - Uses reqwest for HTTP requests
//! - Uses scraper crate for HTML parsing
//! - Reduces a page to "Title / Description / Content" plain text for the
//!   analyzer's prompt
//!
//! Limitations:
//! - No JavaScript rendering; the analyzer is told to ignore JS-disabled
//!   interstitial text when it slips through

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};

use super::BaseScraper;

/// Simple web scraper using reqwest + scraper
pub struct SimpleScraper {
    client: reqwest::Client,
}

impl SimpleScraper {
    pub fn new() -> Result<Self> {
        // Use a browser-like User-Agent to avoid bot detection
        let user_agent = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .parse()
                .unwrap(),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            "en-US,en;q=0.5".parse().unwrap(),
        );
        headers.insert(reqwest::header::CONNECTION, "keep-alive".parse().unwrap());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Fetch raw HTML from a URL
    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {} for {}", status, url);
        }

        response
            .text()
            .await
            .context("Failed to read response body")
    }

    /// Extract title from HTML document
    fn extract_title(document: &Html) -> Option<String> {
        let title_selector = Selector::parse("title").ok()?;
        document
            .select(&title_selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Extract meta description content
    fn extract_meta_description(document: &Html) -> Option<String> {
        let selector = Selector::parse(r#"meta[name="description"]"#).ok()?;
        document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
    }

    /// Extract main content text: first non-empty candidate among the usual
    /// content containers, with boilerplate elements stripped
    fn extract_main_text(document: &Html) -> String {
        let main_selectors = ["article", "main", "#content", ".content", "body"];

        for selector_str in main_selectors {
            if let Ok(selector) = Selector::parse(selector_str) {
                if let Some(element) = document.select(&selector).next() {
                    let cleaned = Self::remove_boilerplate(&element.html());
                    let text = Self::collapse_whitespace(&cleaned);
                    if !text.is_empty() {
                        return text;
                    }
                }
            }
        }

        String::new()
    }

    /// Re-parse an HTML fragment and return its text with boilerplate
    /// elements (nav, ads, scripts) removed
    fn remove_boilerplate(html: &str) -> String {
        let document = Html::parse_fragment(html);
        let unwanted = [
            "script", "style", "noscript", "iframe", "nav", "footer", "aside", ".ad",
            ".ads", ".advertisement",
        ];

        // scraper has no DOM mutation, so collect the text of unwanted
        // subtrees and subtract it from the full text
        let full_text: String = document.root_element().text().collect();
        let mut result = full_text;
        for selector_str in unwanted {
            if let Ok(selector) = Selector::parse(selector_str) {
                for element in document.select(&selector) {
                    let element_text: String = element.text().collect();
                    if !element_text.is_empty() {
                        result = result.replace(&element_text, "");
                    }
                }
            }
        }

        result
    }

    /// Collapse all whitespace runs to single spaces
    fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Assemble the plain-text page representation the analyzer consumes
    fn compose(title: Option<String>, description: Option<String>, content: String) -> String {
        format!(
            "Title: {}\nDescription: {}\nContent: {}",
            title.unwrap_or_default(),
            description.unwrap_or_default(),
            content
        )
    }
}

#[async_trait]
impl BaseScraper for SimpleScraper {
    async fn scrape(&self, url: &str) -> Result<String> {
        debug!(url = %url, "Scraping page");

        let html = self.fetch_html(url).await?;
        let document = Html::parse_document(&html);

        let title = Self::extract_title(&document);
        let description = Self::extract_meta_description(&document);
        let content = Self::extract_main_text(&document);

        if content.len() < 100 {
            warn!(url = %url, "Page has minimal content");
        }

        Ok(Self::compose(title, description, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title() {
        let html = r#"<html><head><title>Test Page</title></head><body></body></html>"#;
        let document = Html::parse_document(html);
        assert_eq!(
            SimpleScraper::extract_title(&document),
            Some("Test Page".to_string())
        );
    }

    #[test]
    fn test_extract_meta_description() {
        let html = r#"<html><head><meta name="description" content="A cosy cafe"></head><body></body></html>"#;
        let document = Html::parse_document(html);
        assert_eq!(
            SimpleScraper::extract_meta_description(&document),
            Some("A cosy cafe".to_string())
        );
    }

    #[test]
    fn test_main_text_prefers_article() {
        let html = r#"<html><body>
            <nav>Menu Menu Menu</nav>
            <article>Great coffee in Shibuya.</article>
            <footer>Copyright</footer>
        </body></html>"#;
        let document = Html::parse_document(html);
        let text = SimpleScraper::extract_main_text(&document);
        assert_eq!(text, "Great coffee in Shibuya.");
    }

    #[test]
    fn test_boilerplate_stripped_from_body() {
        let html = r#"<html><body>
            <script>var x = 1;</script>
            <nav>Site navigation links</nav>
            <p>Open daily from 8am.</p>
        </body></html>"#;
        let document = Html::parse_document(html);
        let text = SimpleScraper::extract_main_text(&document);
        assert!(text.contains("Open daily from 8am."));
        assert!(!text.contains("var x"));
        assert!(!text.contains("navigation"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(
            SimpleScraper::collapse_whitespace("  a \n\n b\t c  "),
            "a b c"
        );
    }

    #[test]
    fn test_compose_shape() {
        let composed = SimpleScraper::compose(
            Some("Fuglen".to_string()),
            Some("Coffee".to_string()),
            "Body text".to_string(),
        );
        assert_eq!(composed, "Title: Fuglen\nDescription: Coffee\nContent: Body text");
    }
}
