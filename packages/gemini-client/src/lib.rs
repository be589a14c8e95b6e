//! Pure Gemini REST API client
//!
//! A clean, minimal client for the Google generative-language API with no
//! domain-specific logic. Supports text generation and JSON-mode responses.
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_client::GeminiClient;
//!
//! let client = GeminiClient::from_env()?;
//!
//! // Free-form completion
//! let text = client.generate_text("gemini-2.5-flash", "Say hello").await?;
//!
//! // JSON-mode completion (the model is constrained to emit JSON)
//! let json = client.generate_json("gemini-2.5-flash", "Describe a cafe as JSON").await?;
//! ```

pub mod error;
pub mod types;

pub use error::{GeminiError, Result};
pub use types::*;

use reqwest::Client;
use tracing::{debug, warn};

/// Pure Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }

    /// Create from environment variable `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::Config("GEMINI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for proxies and tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Generate content with full request control.
    pub async fn generate_content(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let start = std::time::Instant::now();
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, model = model, "Gemini request failed");
                GeminiError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Gemini API error");
            return Err(GeminiError::Api(format!(
                "Gemini API error: {}",
                error_text
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        debug!(
            model = model,
            duration_ms = start.elapsed().as_millis(),
            "Gemini generateContent"
        );

        Ok(parsed)
    }

    /// Single-prompt text generation.
    pub async fn generate_text(&self, model: &str, prompt: &str) -> Result<String> {
        let response = self
            .generate_content(model, GenerateContentRequest::from_prompt(prompt))
            .await?;

        response
            .text()
            .ok_or_else(|| GeminiError::Api("No candidates in Gemini response".into()))
    }

    /// Single-prompt generation with the JSON response MIME type set.
    /// Returns the raw JSON string; parse with `serde_json` in calling code.
    pub async fn generate_json(&self, model: &str, prompt: &str) -> Result<String> {
        let response = self
            .generate_content(
                model,
                GenerateContentRequest::from_prompt(prompt).with_json_response(),
            )
            .await?;

        response
            .text()
            .ok_or_else(|| GeminiError::Api("No candidates in Gemini response".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires API key
    async fn test_generate_text() {
        let client = GeminiClient::from_env().expect("GEMINI_API_KEY must be set");

        let response = client
            .generate_text("gemini-2.5-flash", "Say 'Hello, World!' and nothing else.")
            .await
            .expect("generation should succeed");

        assert!(response.contains("Hello"));
    }
}
