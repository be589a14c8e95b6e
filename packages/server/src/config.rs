use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub notion_api_key: String,
    pub notion_database_id: String,
    /// Optional: without it the analyzer degrades to fallback records.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// Optional: without it place lookup is disabled.
    pub google_maps_api_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            notion_api_key: env::var("NOTION_API_KEY")
                .context("NOTION_API_KEY must be set")?,
            notion_database_id: env::var("NOTION_DATABASE_ID")
                .context("NOTION_DATABASE_ID must be set")?,
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            google_maps_api_key: env::var("GOOGLE_MAPS_API_KEY").ok(),
        })
    }
}
