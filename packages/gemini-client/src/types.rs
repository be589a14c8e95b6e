//! Request/response types for the Gemini generateContent API.

use serde::{Deserialize, Serialize};

/// Content generation request.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Single-turn user prompt.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.into(),
                }],
                role: None,
            }],
            generation_config: None,
        }
    }

    /// Ask the model to reply with a JSON document instead of prose.
    pub fn with_json_response(mut self) -> Self {
        self.generation_config = Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
        });
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if any.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Content,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let req = GenerateContentRequest::from_prompt("hello").with_json_response();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_response_text() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}],"role":"model"}}]}"#;
        let resp: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.text().as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_empty_response() {
        let resp: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.text().is_none());
    }
}
