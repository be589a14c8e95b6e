// AI analysis adapter backed by Gemini
//
// This is the infrastructure implementation of BaseAnalyzer. The adapter is
// total: every internal failure (missing credentials, network error,
// malformed model reply) degrades to AnalysisResult::fallback so the
// workflow never sees an analysis error, only an uninformative result.

use async_trait::async_trait;
use gemini_client::GeminiClient;
use serde_json::Value;
use tracing::{debug, warn};

use super::{AnalysisResult, BaseAnalyzer, PlaceDetails};

/// Character budget for scraped context embedded in the prompt, to respect
/// the model's context limit.
const CONTEXT_CHAR_BUDGET: usize = 5000;

/// Gemini implementation of content analysis
pub struct GeminiAnalyzer {
    client: Option<GeminiClient>,
    model: String,
}

impl GeminiAnalyzer {
    /// Create an analyzer. A missing API key is allowed - the adapter then
    /// always returns fallback records.
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: api_key.map(GeminiClient::new),
            model: model.into(),
        }
    }

    fn build_prompt(url: &str, context: Option<&str>, place: Option<&PlaceDetails>) -> String {
        let mut prompt = String::from("You are a travel assistant. I will provide a URL");
        if context.is_some() {
            prompt.push_str(" and its scraped content");
        }
        prompt.push_str(".\n");
        if place.is_some() {
            prompt.push_str(
                "I will also provide VERIFIED DATA from Google Maps. Use this as the primary source of truth.\n",
            );
        }
        prompt.push_str(
            "\nCRITICAL: If the Scraped Content contains messages like \"JavaScript is disabled\", \
             \"Enable JavaScript\", or \"Browser not supported\", IGNORE the content completely \
             and infer details solely from other sources.\n",
        );

        prompt.push_str(&format!("\nURL: {}\n", url));

        if let Some(context) = context {
            let truncated: String = context.chars().take(CONTEXT_CHAR_BUDGET).collect();
            prompt.push_str(&format!("\nPage Content:\n{}\n", truncated));
        }

        if let Some(place) = place {
            let place_json = serde_json::to_string_pretty(place).unwrap_or_default();
            prompt.push_str(&format!("\n[VERIFIED GOOGLE MAPS DATA]:\n{}\n", place_json));
        }

        let maps_url = place
            .and_then(|p| p.google_maps_uri.as_deref())
            .unwrap_or(url);

        prompt.push_str(&format!(
            r#"
Task:
1. Identify the specific place (Restaurant, Hotel, Attraction, etc).
2. Provide a practical summary in Traditional Chinese (Taiwan).
3. Categorize it.
4. Return structured data.

Return strictly JSON format:
{{
    "title": "Place Name (Traditional Chinese preferred)",
    "summary": "2-3 sentences practical tips. Include rating/price if available.",
    "area": "District Name (e.g. Shibuya, Kyoto)",
    "category": ["Food" | "Shop" | "Activity" | "Stay" | "Transport"],
    "mapsUrl": "{}"
}}
"#,
            maps_url
        ));

        prompt
    }

    /// Remove Markdown code-fence wrapping the model sometimes adds despite
    /// the JSON response MIME type.
    fn strip_code_fences(text: &str) -> String {
        text.replace("```json", "").replace("```", "").trim().to_string()
    }

    /// Coerce `category` into a list: a bare string becomes a one-element
    /// list, anything else defaults to ["Activity"].
    fn coerce_categories(value: Option<&Value>) -> Vec<String> {
        match value {
            Some(Value::Array(items)) => {
                let categories: Vec<String> = items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
                if categories.is_empty() {
                    vec!["Activity".to_string()]
                } else {
                    categories
                }
            }
            Some(Value::String(s)) => vec![s.clone()],
            _ => vec!["Activity".to_string()],
        }
    }

    /// Parse the model's JSON reply into a normalized result.
    fn parse_reply(url: &str, raw: &str, place: Option<&PlaceDetails>) -> Option<AnalysisResult> {
        let clean = Self::strip_code_fences(raw);
        let data: Value = serde_json::from_str(&clean).ok()?;

        let non_empty = |v: Option<&Value>| {
            v.and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let place_title = place.map(|p| p.title.clone());
        let place_maps_uri = place.and_then(|p| p.google_maps_uri.clone());

        Some(AnalysisResult {
            title: non_empty(data.get("title"))
                .or(place_title)
                .unwrap_or_else(|| "Unknown Title".to_string()),
            summary: non_empty(data.get("summary")).unwrap_or_default(),
            area: non_empty(data.get("area")).unwrap_or_else(|| "Unknown Area".to_string()),
            category: Self::coerce_categories(data.get("category")),
            maps_url: non_empty(data.get("mapsUrl"))
                .or(place_maps_uri)
                .or_else(|| Some(url.to_string())),
        })
    }
}

#[async_trait]
impl BaseAnalyzer for GeminiAnalyzer {
    async fn analyze(
        &self,
        url: &str,
        context: Option<&str>,
        place: Option<&PlaceDetails>,
    ) -> AnalysisResult {
        let Some(client) = &self.client else {
            warn!("GEMINI_API_KEY is not set, returning fallback");
            return AnalysisResult::fallback(url);
        };

        let prompt = Self::build_prompt(url, context, place);
        debug!(
            url = %url,
            prompt_length = prompt.len(),
            has_context = context.is_some(),
            has_place = place.is_some(),
            model = %self.model,
            "Analyzing captured URL"
        );

        let raw = match client.generate_json(&self.model, &prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(url = %url, error = %e, "Gemini analysis failed, returning fallback");
                return AnalysisResult::fallback(url);
            }
        };

        match Self::parse_reply(url, &raw, place) {
            Some(result) => result,
            None => {
                warn!(url = %url, "Gemini reply was not valid JSON, returning fallback");
                AnalysisResult::fallback(url)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        let raw = "```json\n{\"title\": \"x\"}\n```";
        assert_eq!(GeminiAnalyzer::strip_code_fences(raw), "{\"title\": \"x\"}");

        let bare = "{\"title\": \"x\"}";
        assert_eq!(GeminiAnalyzer::strip_code_fences(bare), bare);
    }

    #[test]
    fn test_coerce_categories() {
        let arr = serde_json::json!(["Food", "Shop"]);
        assert_eq!(
            GeminiAnalyzer::coerce_categories(Some(&arr)),
            vec!["Food", "Shop"]
        );

        let bare = serde_json::json!("Food");
        assert_eq!(GeminiAnalyzer::coerce_categories(Some(&bare)), vec!["Food"]);

        let bad = serde_json::json!(42);
        assert_eq!(
            GeminiAnalyzer::coerce_categories(Some(&bad)),
            vec!["Activity"]
        );
        assert_eq!(GeminiAnalyzer::coerce_categories(None), vec!["Activity"]);
    }

    #[test]
    fn test_parse_reply() {
        let raw = r#"{"title":"Fuglen Tokyo","summary":"Great coffee.","area":"Shibuya","category":["Food"],"mapsUrl":"https://maps/x"}"#;
        let result = GeminiAnalyzer::parse_reply("https://example.com", raw, None).unwrap();
        assert_eq!(result.title, "Fuglen Tokyo");
        assert_eq!(result.area, "Shibuya");
        assert_eq!(result.maps_url.as_deref(), Some("https://maps/x"));
    }

    #[test]
    fn test_parse_reply_defaults_missing_fields_to_url() {
        let raw = r#"{"summary":""}"#;
        let result = GeminiAnalyzer::parse_reply("https://example.com", raw, None).unwrap();
        assert_eq!(result.title, "Unknown Title");
        assert_eq!(result.area, "Unknown Area");
        assert_eq!(result.category, vec!["Activity"]);
        assert_eq!(result.maps_url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_parse_reply_prefers_place_data_for_gaps() {
        let place = PlaceDetails {
            title: "Verified Name".to_string(),
            google_maps_uri: Some("https://maps.google.com/verified".to_string()),
            ..Default::default()
        };
        let raw = r#"{"summary":"ok"}"#;
        let result = GeminiAnalyzer::parse_reply("https://example.com", raw, Some(&place)).unwrap();
        assert_eq!(result.title, "Verified Name");
        assert_eq!(
            result.maps_url.as_deref(),
            Some("https://maps.google.com/verified")
        );
    }

    #[test]
    fn test_parse_reply_rejects_garbage() {
        assert!(GeminiAnalyzer::parse_reply("https://x", "not json", None).is_none());
    }

    #[tokio::test]
    async fn test_missing_credentials_returns_fallback() {
        let analyzer = GeminiAnalyzer::new(None, "gemini-2.5-flash");
        let result = analyzer.analyze("https://example.com/cafe", None, None).await;
        assert_eq!(result, AnalysisResult::fallback("https://example.com/cafe"));
        assert_eq!(result.title, "New Item");
        assert_eq!(result.category, vec!["Activity"]);
    }

    #[test]
    fn test_prompt_mentions_context_and_place_only_when_present() {
        let bare = GeminiAnalyzer::build_prompt("https://x", None, None);
        assert!(!bare.contains("scraped content"));
        assert!(!bare.contains("VERIFIED GOOGLE MAPS DATA"));

        let place = PlaceDetails::default();
        let full = GeminiAnalyzer::build_prompt("https://x", Some("page text"), Some(&place));
        assert!(full.contains("scraped content"));
        assert!(full.contains("page text"));
        assert!(full.contains("[VERIFIED GOOGLE MAPS DATA]"));
    }

    #[test]
    fn test_prompt_truncates_context() {
        let long_context = "a".repeat(20_000);
        let prompt = GeminiAnalyzer::build_prompt("https://x", Some(&long_context), None);
        assert!(prompt.len() < 10_000);
    }
}
