//! BrightData SERP API backend.
//!
//! BrightData proxies a Google results page and returns it pre-parsed. The
//! envelope is `{status_code, headers, body}` where `body` may be either an
//! object or a JSON document serialized into a string, so parsing tolerates
//! both shapes.

use crate::search::traits::{SearchError, SearchProvider, SearchResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.brightdata.com/request";
pub const DEFAULT_ZONE: &str = "serp_api1";

/// Keys under which the organic listings have been observed.
const ORGANIC_KEYS: [&str; 2] = ["organic", "organic_results"];

pub struct BrightDataSearch {
    api_url: String,
    api_key: Option<String>,
    zone: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct SerpRequest<'a> {
    zone: &'a str,
    format: &'static str,
    data_format: &'static str,
    url: String,
}

impl BrightDataSearch {
    pub fn new(
        api_url: &str,
        api_key: Option<&str>,
        zone: &str,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            api_url: api_url.trim().to_string(),
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(ToString::to_string),
            zone: zone.to_string(),
            client,
        })
    }
}

/// Google search URL for `query`, form-encoded the way browsers do
/// (spaces become `+`).
pub(crate) fn google_search_url(query: &str, count: usize) -> String {
    let encoded = urlencoding::encode(query).replace("%20", "+");
    format!("https://www.google.com/search?q={encoded}&num={count}")
}

fn error_detail(body: &str) -> String {
    let detail = match serde_json::from_str::<Value>(body) {
        Ok(value) => match value.get("error") {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        Err(_) => body.to_string(),
    };
    crate::providers::sanitize_api_error(&detail)
}

/// First non-empty string among `keys` on `item`, or `""`.
fn first_non_empty<'a>(item: &'a Value, keys: &[&str]) -> &'a str {
    keys.iter()
        .filter_map(|key| item.get(*key).and_then(Value::as_str))
        .find(|value| !value.is_empty())
        .unwrap_or("")
}

/// Extract organic listings from a SERP response.
///
/// Listings without a title or URL are dropped silently.
pub fn parse_search_results(data: &Value) -> Vec<SearchResult> {
    let body = data.get("body").unwrap_or(data);

    let reparsed;
    let body = match body {
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(value) => {
                reparsed = value;
                &reparsed
            }
            Err(error) => {
                tracing::warn!("SERP body string is not valid JSON: {error}");
                return Vec::new();
            }
        },
        other => other,
    };

    let Some(organic) = ORGANIC_KEYS.iter().find_map(|key| {
        body.get(*key)
            .and_then(Value::as_array)
            .filter(|items| !items.is_empty())
    }) else {
        return Vec::new();
    };

    organic
        .iter()
        .filter_map(|item| {
            let title = first_non_empty(item, &["title"]);
            let url = first_non_empty(item, &["link", "url"]);
            if title.is_empty() || url.is_empty() {
                return None;
            }
            let description = first_non_empty(item, &["description", "snippet"]);
            Some(SearchResult::new(title, url, description))
        })
        .collect()
}

#[async_trait]
impl SearchProvider for BrightDataSearch {
    fn name(&self) -> &str {
        "brightdata"
    }

    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>, SearchError> {
        let request = SerpRequest {
            zone: &self.zone,
            format: "json",
            data_format: "parsed_light",
            url: google_search_url(query, count),
        };

        let mut builder = self.client.post(&self.api_url).json(&request);
        if let Some(key) = self.api_key.as_deref() {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SearchError::Api {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        let data: Value = serde_json::from_str(&body).map_err(|error| {
            SearchError::Payload(format!(
                "{error}; body={}",
                crate::providers::sanitize_api_error(&body)
            ))
        })?;

        let mut results = parse_search_results(&data);
        results.truncate(count);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn drops_records_missing_title_or_url() {
        let data = json!({
            "organic": [
                {"title": "", "link": "http://x"},
                {"title": "A", "link": "http://y", "snippet": "d"}
            ]
        });
        assert_eq!(
            parse_search_results(&data),
            vec![SearchResult::new("A", "http://y", "d")]
        );
    }

    #[test]
    fn drops_records_without_any_url_field() {
        let data = json!({"organic": [{"title": "No link", "description": "d"}]});
        assert!(parse_search_results(&data).is_empty());
    }

    #[test]
    fn reads_nested_body_object() {
        let data = json!({
            "status_code": 200,
            "body": {"organic": [{"title": "T", "url": "https://t.example", "description": "desc"}]}
        });
        assert_eq!(
            parse_search_results(&data),
            vec![SearchResult::new("T", "https://t.example", "desc")]
        );
    }

    #[test]
    fn reparses_body_serialized_as_string() {
        let inner = json!({"organic": [{"title": "T", "link": "https://t.example"}]}).to_string();
        let data = json!({"status_code": 200, "body": inner});
        assert_eq!(
            parse_search_results(&data),
            vec![SearchResult::new("T", "https://t.example", "")]
        );
    }

    #[test]
    fn unparseable_body_string_yields_no_results() {
        let data = json!({"body": "<html>captcha</html>"});
        assert!(parse_search_results(&data).is_empty());
    }

    #[test]
    fn falls_back_to_organic_results_key() {
        let data = json!({
            "organic": [],
            "organic_results": [{"title": "R", "link": "https://r.example"}]
        });
        assert_eq!(parse_search_results(&data).len(), 1);
    }

    #[test]
    fn prefers_link_over_url_and_description_over_snippet() {
        let data = json!({"organic": [{
            "title": "T",
            "link": "https://link.example",
            "url": "https://url.example",
            "description": "long",
            "snippet": "short"
        }]});
        let results = parse_search_results(&data);
        assert_eq!(results[0].url, "https://link.example");
        assert_eq!(results[0].description, "long");
    }

    #[test]
    fn preserves_provider_order() {
        let data = json!({"organic": [
            {"title": "first", "link": "https://1.example"},
            {"title": "second", "link": "https://2.example"},
            {"title": "third", "link": "https://3.example"}
        ]});
        let titles: Vec<_> = parse_search_results(&data)
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn non_object_payload_yields_no_results() {
        assert!(parse_search_results(&json!([1, 2, 3])).is_empty());
        assert!(parse_search_results(&json!({"body": 42})).is_empty());
    }

    #[test]
    fn google_search_url_form_encodes_query() {
        assert_eq!(
            google_search_url("rust 1.80 release+notes", 5),
            "https://www.google.com/search?q=rust+1.80+release%2Bnotes&num=5"
        );
    }

    #[test]
    fn error_detail_uses_error_field() {
        assert_eq!(error_detail(r#"{"error":"zone not found"}"#), "zone not found");
        assert_eq!(error_detail("Forbidden"), "Forbidden");
    }

    #[test]
    fn constructor_trims_blank_key() {
        let search = BrightDataSearch::new(DEFAULT_API_URL, Some(" "), DEFAULT_ZONE, 30).unwrap();
        assert!(search.api_key.is_none());
        assert_eq!(search.name(), "brightdata");
    }
}
