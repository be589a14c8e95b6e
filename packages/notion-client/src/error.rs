//! Error types for the Notion client.

use thiserror::Error;

/// Result type for Notion client operations.
pub type Result<T> = std::result::Result<T, NotionError>;

/// Notion client errors.
#[derive(Debug, Error)]
pub enum NotionError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response)
    #[error("Notion API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl NotionError {
    /// True when the API rejected the request because the page or database
    /// does not exist (or is not shared with the integration).
    pub fn is_not_found(&self) -> bool {
        matches!(self, NotionError::Api { status: 404, .. })
    }
}
