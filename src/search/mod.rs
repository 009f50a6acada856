//! Web search backends.

pub mod brightdata;
pub mod traits;

pub use brightdata::BrightDataSearch;
pub use traits::{SearchError, SearchProvider, SearchResult, DEFAULT_SEARCH_RESULTS};

use crate::config::SearchConfig;

/// Build the configured search backend.
pub fn create_search_provider(config: &SearchConfig) -> anyhow::Result<BrightDataSearch> {
    BrightDataSearch::new(
        &config.api_url,
        config.api_key.as_deref(),
        &config.zone,
        config.timeout_secs,
    )
}
