//! Pure Notion REST API client
//!
//! A clean, minimal client for the Notion API with no domain-specific logic.
//! Supports database queries, page retrieval, page creation, property
//! updates, and archival (Notion's soft delete).
//!
//! # Example
//!
//! ```rust,ignore
//! use notion_client::{NotionClient, PropertyValue, QueryDatabaseRequest, Sort};
//!
//! let client = NotionClient::from_env()?;
//!
//! // Query a database
//! let pages = client
//!     .query_database(
//!         "db-id",
//!         QueryDatabaseRequest::new()
//!             .filter_status_does_not_equal("Status", "Done")
//!             .sort(Sort::ascending("Date")),
//!     )
//!     .await?;
//!
//! // Update a property
//! let mut props = std::collections::HashMap::new();
//! props.insert("Name".to_string(), PropertyValue::title("Fuglen Tokyo"));
//! client.update_page("page-id", props).await?;
//! ```

pub mod error;
pub mod types;

pub use error::{NotionError, Result};
pub use types::*;

use reqwest::Client;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Notion API version header value this client speaks.
const NOTION_VERSION: &str = "2022-06-28";

/// Pure Notion API client.
#[derive(Clone)]
pub struct NotionClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl NotionClient {
    /// Create a new Notion client with the given integration token.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.notion.com/v1".to_string(),
        }
    }

    /// Create from environment variable `NOTION_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("NOTION_API_KEY")
            .map_err(|_| NotionError::Config("NOTION_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for proxies and tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Query a database with filters and sorts.
    pub async fn query_database(
        &self,
        database_id: &str,
        request: QueryDatabaseRequest,
    ) -> Result<QueryDatabaseResponse> {
        let url = format!("{}/databases/{}/query", self.base_url, database_id);
        let response = self.send(self.http_client.post(&url).json(&request)).await?;

        response
            .json()
            .await
            .map_err(|e| NotionError::Parse(e.to_string()))
    }

    /// Retrieve a single page by id.
    pub async fn retrieve_page(&self, page_id: &str) -> Result<Page> {
        let url = format!("{}/pages/{}", self.base_url, page_id);
        let response = self.send(self.http_client.get(&url)).await?;

        response
            .json()
            .await
            .map_err(|e| NotionError::Parse(e.to_string()))
    }

    /// Create a page in a database. Returns the new page.
    pub async fn create_page(&self, request: CreatePageRequest) -> Result<Page> {
        let url = format!("{}/pages", self.base_url);
        let response = self.send(self.http_client.post(&url).json(&request)).await?;

        let page: Page = response
            .json()
            .await
            .map_err(|e| NotionError::Parse(e.to_string()))?;

        debug!(page_id = %page.id, "Created Notion page");
        Ok(page)
    }

    /// Patch page properties. Only the provided properties change.
    pub async fn update_page(
        &self,
        page_id: &str,
        properties: HashMap<String, PropertyValue>,
    ) -> Result<Page> {
        self.patch_page(
            page_id,
            UpdatePageRequest {
                properties: Some(properties),
                archived: None,
            },
        )
        .await
    }

    /// Archive a page. This is Notion's soft delete; the page is
    /// recoverable from the trash, not physically removed.
    pub async fn archive_page(&self, page_id: &str) -> Result<Page> {
        self.patch_page(
            page_id,
            UpdatePageRequest {
                properties: None,
                archived: Some(true),
            },
        )
        .await
    }

    async fn patch_page(&self, page_id: &str, request: UpdatePageRequest) -> Result<Page> {
        let url = format!("{}/pages/{}", self.base_url, page_id);
        let response = self
            .send(self.http_client.patch(&url).json(&request))
            .await?;

        response
            .json()
            .await
            .map_err(|e| NotionError::Parse(e.to_string()))
    }

    /// Attach auth headers, send, and map non-2xx responses to typed errors.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Notion-Version", NOTION_VERSION)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Notion request failed");
                NotionError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(body);
            warn!(status = %status, message = %message, "Notion API error");
            return Err(NotionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        let err = NotionError::Api {
            status: 404,
            message: "Could not find page".into(),
        };
        assert!(err.is_not_found());

        let err = NotionError::Api {
            status: 429,
            message: "rate limited".into(),
        };
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    #[ignore] // Requires API key and a shared database
    async fn test_retrieve_page() {
        let client = NotionClient::from_env().expect("NOTION_API_KEY must be set");
        let page_id = std::env::var("NOTION_TEST_PAGE_ID").expect("NOTION_TEST_PAGE_ID must be set");

        let page = client
            .retrieve_page(&page_id)
            .await
            .expect("page retrieval should succeed");

        assert_eq!(page.id.replace('-', ""), page_id.replace('-', ""));
    }
}
