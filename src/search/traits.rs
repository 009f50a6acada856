use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result count used when the search port is invoked without one.
///
/// The research agent asks for fewer results (see `AgentConfig`).
pub const DEFAULT_SEARCH_RESULTS: usize = 10;

/// One organic search listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub description: String,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description: description.into(),
        }
    }
}

/// Failure of a search backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("Request timed out")]
    Timeout,

    #[error("API request failed: {detail}")]
    Api { status: u16, detail: String },

    #[error("Request failed: {0}")]
    Transport(String),

    /// Success status, but the body was not JSON.
    #[error("Unexpected search payload: {0}")]
    Payload(String),
}

impl SearchError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(crate::providers::sanitize_api_error(&error.to_string()))
        }
    }
}

/// Web search capability: keyword query in, ordered listings out.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Run one search and return up to `count` results in provider order.
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>, SearchError>;

    /// Search with [`DEFAULT_SEARCH_RESULTS`].
    async fn search_default(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        self.search(query, DEFAULT_SEARCH_RESULTS).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct CountRecorder {
        counts: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl SearchProvider for CountRecorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn search(
            &self,
            _query: &str,
            count: usize,
        ) -> Result<Vec<SearchResult>, SearchError> {
            self.counts.lock().push(count);
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn search_default_uses_ten_results() {
        let recorder = CountRecorder {
            counts: Mutex::new(Vec::new()),
        };
        recorder.search_default("rust").await.unwrap();
        assert_eq!(*recorder.counts.lock(), vec![DEFAULT_SEARCH_RESULTS]);
    }

    #[test]
    fn search_result_serializes_with_plain_field_names() {
        let result = SearchResult::new("A", "http://y", "d");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"title": "A", "url": "http://y", "description": "d"})
        );
    }

    #[test]
    fn search_error_status_code() {
        let err = SearchError::Api {
            status: 403,
            detail: "zone disabled".into(),
        };
        assert_eq!(err.status_code(), Some(403));
        assert_eq!(err.to_string(), "API request failed: zone disabled");
        assert_eq!(SearchError::Timeout.status_code(), None);
    }
}
