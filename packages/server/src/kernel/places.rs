// Google Places lookup adapter
//
// Resolves a (possibly shortened) Google Maps URL to verified place data:
// resolve redirects, extract a searchable query from the long URL, then hit
// the Places Text Search (New) endpoint with a field mask.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{BasePlaceLookup, PlaceDetails};

const SEARCH_ENDPOINT: &str = "https://places.googleapis.com/v1/places:searchText";

const FIELD_MASK: &str = "places.displayName,places.formattedAddress,places.rating,\
places.userRatingCount,places.googleMapsUri,places.websiteUri,places.types,\
places.priceLevel,places.editorialSummary,places.regularOpeningHours";

/// Places API implementation of place lookup
pub struct GooglePlacesClient {
    client: reqwest::Client,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest {
    text_query: String,
    language_code: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    places: Vec<RawPlace>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlace {
    display_name: Option<LocalizedText>,
    formatted_address: Option<String>,
    rating: Option<f64>,
    user_rating_count: Option<u32>,
    website_uri: Option<String>,
    google_maps_uri: Option<String>,
    price_level: Option<String>,
    editorial_summary: Option<LocalizedText>,
    regular_opening_hours: Option<OpeningHours>,
}

#[derive(Deserialize)]
struct LocalizedText {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpeningHours {
    #[serde(default)]
    weekday_descriptions: Vec<String>,
}

impl GooglePlacesClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: api_key.into(),
        }
    }

    /// Follow the redirect of a short maps URL (maps.app.goo.gl) to the
    /// long form. Returns the input unchanged when it does not redirect.
    async fn resolve_short_url(&self, short_url: &str) -> String {
        match self.client.head(short_url).send().await {
            Ok(response) => response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|loc| loc.to_str().ok())
                .map(str::to_string)
                .unwrap_or_else(|| short_url.to_string()),
            Err(e) => {
                debug!(url = %short_url, error = %e, "Short URL resolution failed");
                short_url.to_string()
            }
        }
    }

    /// Extract a searchable place name from a Google Maps URL.
    fn extract_query(url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        let path = parsed.path();

        // Type A: /maps/place/NAME/@...
        // Type B: /maps/search/NAME
        for prefix in ["/maps/place/", "/maps/search/"] {
            if let Some(rest) = path.strip_prefix(prefix) {
                let raw_name = rest.split('/').next()?;
                if raw_name.is_empty() {
                    return None;
                }
                let decoded = percent_decode(raw_name);
                return Some(decoded.replace('+', " "));
            }
        }

        // Type C: query parameter ?q=...
        parsed
            .query_pairs()
            .find(|(k, _)| k == "q")
            .map(|(_, v)| v.into_owned())
    }

    async fn search_place(&self, query: &str) -> Option<PlaceDetails> {
        let request = SearchRequest {
            text_query: query.to_string(),
            language_code: "zh-TW".to_string(),
        };

        let response = self
            .client
            .post(SEARCH_ENDPOINT)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&request)
            .send()
            .await
            .map_err(|e| warn!(error = %e, "Places search request failed"))
            .ok()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Places API error");
            return None;
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| warn!(error = %e, "Places response parse failed"))
            .ok()?;

        let place = parsed.places.into_iter().next()?;

        Some(PlaceDetails {
            title: place
                .display_name
                .and_then(|t| t.text)
                .unwrap_or_else(|| query.to_string()),
            address: place.formatted_address.unwrap_or_default(),
            rating: place.rating,
            user_rating_count: place.user_rating_count,
            website_uri: place.website_uri,
            google_maps_uri: place.google_maps_uri,
            price_level: place.price_level,
            summary: place.editorial_summary.and_then(|t| t.text),
            opening_hours: place
                .regular_opening_hours
                .map(|h| h.weekday_descriptions)
                .unwrap_or_default(),
        })
    }
}

/// Minimal percent-decoding for maps path segments (UTF-8, lossy).
fn percent_decode(input: &str) -> String {
    let mut bytes = Vec::with_capacity(input.len());
    let mut chars = input.bytes();
    while let Some(b) = chars.next() {
        if b == b'%' {
            let hi = chars.next();
            let lo = chars.next();
            if let (Some(hi), Some(lo)) = (hi, lo) {
                let hex = [hi, lo];
                if let Ok(hex_str) = std::str::from_utf8(&hex) {
                    if let Ok(decoded) = u8::from_str_radix(hex_str, 16) {
                        bytes.push(decoded);
                        continue;
                    }
                }
                bytes.push(b'%');
                bytes.push(hi);
                bytes.push(lo);
            } else {
                bytes.push(b'%');
            }
        } else {
            bytes.push(b);
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

#[async_trait]
impl BasePlaceLookup for GooglePlacesClient {
    async fn lookup(&self, maps_url: &str) -> Option<PlaceDetails> {
        let long_url = self.resolve_short_url(maps_url).await;
        debug!(url = %long_url, "Resolved maps URL");

        let query = match Self::extract_query(&long_url) {
            Some(q) => q,
            None => {
                debug!(url = %long_url, "Could not extract query from maps URL");
                return None;
            }
        };
        debug!(query = %query, "Extracted place query");

        self.search_place(&query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_query_from_place_path() {
        let url = "https://www.google.com/maps/place/Fuglen+Tokyo/@35.66,139.69,17z/data=abc";
        assert_eq!(
            GooglePlacesClient::extract_query(url).as_deref(),
            Some("Fuglen Tokyo")
        );
    }

    #[test]
    fn test_extract_query_from_search_path() {
        let url = "https://www.google.com/maps/search/ramen+shinjuku";
        assert_eq!(
            GooglePlacesClient::extract_query(url).as_deref(),
            Some("ramen shinjuku")
        );
    }

    #[test]
    fn test_extract_query_from_q_param() {
        let url = "https://maps.google.com/?q=Tsukiji+Market";
        // query_pairs already decodes '+' as space
        assert_eq!(
            GooglePlacesClient::extract_query(url).as_deref(),
            Some("Tsukiji Market")
        );
    }

    #[test]
    fn test_extract_query_percent_encoded() {
        let url = "https://www.google.com/maps/place/%E6%B8%8B%E8%B0%B7/@35.65,139.7,15z";
        assert_eq!(
            GooglePlacesClient::extract_query(url).as_deref(),
            Some("渋谷")
        );
    }

    #[test]
    fn test_extract_query_none() {
        assert!(GooglePlacesClient::extract_query("https://example.com/not-maps").is_none());
        assert!(GooglePlacesClient::extract_query("not a url").is_none());
    }

    #[test]
    fn test_percent_decode_passthrough() {
        assert_eq!(percent_decode("plain"), "plain");
        assert_eq!(percent_decode("a%2Fb"), "a/b");
        assert_eq!(percent_decode("bad%zz"), "bad%zz");
    }
}
