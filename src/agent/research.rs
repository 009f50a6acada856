//! Research agent: decide whether a question needs the web, optionally search,
//! then answer.
//!
//! Every stage before synthesis is fail-open. A broken decision degrades to a
//! direct answer, a broken keyword extraction searches with the raw question,
//! and a failed search behaves like an empty one. Only the final synthesis
//! call can fail, and [`ResearchAgent::answer`] turns that failure into an
//! apology in the answer text, so callers always get an [`AnswerResult`].

use crate::agent::decoder::decode_structured;
use crate::agent::prompts;
use crate::config::Config;
use crate::providers::{self, Provider, ProviderError};
use crate::search::{self, SearchProvider, SearchResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Write;
use std::sync::Arc;

/// Classification stages want literal, repeatable output.
pub const DECISION_TEMPERATURE: f64 = 0.1;
/// Answer synthesis is open-ended.
pub const ANSWER_TEMPERATURE: f64 = 0.7;
/// Results requested per search unless configured otherwise.
pub const DEFAULT_AGENT_SEARCH_RESULTS: usize = 5;

pub const SEARCH_DISABLED_REASON: &str = "Web search disabled";
pub const DECISION_FALLBACK_REASON: &str = "Failed to determine, using direct answer";
pub const ERROR_ANSWER_PREFIX: &str = "Sorry, I encountered an error: ";

/// Outcome of the search-need decision, as returned by the model.
///
/// Missing and `null` fields both read as `false` / `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOutcome {
    #[serde(default, deserialize_with = "null_as_default")]
    pub needs_search: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl DecisionOutcome {
    fn fallback() -> Self {
        Self {
            needs_search: false,
            reason: DECISION_FALLBACK_REASON.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct KeywordReply {
    #[serde(default)]
    keywords: Option<String>,
}

/// Final result of one [`ResearchAgent::answer`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub question: String,
    pub answer: String,
    /// A search was attempted and its outcome drove the answer branch.
    pub used_search: bool,
    pub search_results: Vec<SearchResult>,
    pub reason: String,
}

impl AnswerResult {
    fn new(question: &str) -> Self {
        Self {
            question: question.to_string(),
            ..Self::default()
        }
    }
}

/// Render search results as the numbered block embedded in the synthesis
/// prompt.
pub fn format_search_results(results: &[SearchResult]) -> String {
    let mut formatted = String::new();
    for (i, result) in results.iter().enumerate() {
        let _ = write!(
            formatted,
            "\n{}. {}\n   URL: {}\n   {}\n",
            i + 1,
            result.title,
            result.url,
            result.description
        );
    }
    formatted
}

/// Question-answering agent over a completion backend and a search backend.
///
/// Holds no per-request state; one instance can serve concurrent requests.
pub struct ResearchAgent {
    provider: Arc<dyn Provider>,
    search: Arc<dyn SearchProvider>,
    search_results: usize,
}

impl ResearchAgent {
    pub fn new(provider: Arc<dyn Provider>, search: Arc<dyn SearchProvider>) -> Self {
        Self {
            provider,
            search,
            search_results: DEFAULT_AGENT_SEARCH_RESULTS,
        }
    }

    /// Build an agent wired to the configured production backends.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = providers::create_provider(&config.provider)?;
        let search = search::create_search_provider(&config.search)?;
        Ok(Self::new(Arc::new(provider), Arc::new(search))
            .with_search_results(config.agent.search_results))
    }

    /// Override how many results each search requests (minimum 1).
    pub fn with_search_results(mut self, count: usize) -> Self {
        self.search_results = count.max(1);
        self
    }

    pub fn model(&self) -> &str {
        self.provider.default_model()
    }

    /// Answer `question`, searching the web first when the model thinks it
    /// is needed and `allow_search` permits it.
    ///
    /// The caller is responsible for rejecting blank questions.
    pub async fn answer(&self, question: &str, allow_search: bool) -> AnswerResult {
        tracing::info!(allow_search, "Processing question");

        let mut result = AnswerResult::new(question);
        if let Err(error) = self.run(question, allow_search, &mut result).await {
            tracing::error!(status = ?error.status_code(), "LLM error: {error}");
            result.answer = format!("{ERROR_ANSWER_PREFIX}{}", error.message());
        }

        tracing::info!(used_search = result.used_search, "Question processing complete");
        result
    }

    async fn run(
        &self,
        question: &str,
        allow_search: bool,
        result: &mut AnswerResult,
    ) -> Result<(), ProviderError> {
        if !allow_search {
            tracing::info!("Web search disabled, answering directly");
            result.reason = SEARCH_DISABLED_REASON.to_string();
            result.answer = self.answer_direct(question).await?;
            return Ok(());
        }

        let decision = self.decide(question).await;
        result.reason = decision.reason;

        if !decision.needs_search {
            result.answer = self.answer_direct(question).await?;
            return Ok(());
        }

        let keywords = self.extract_keywords(question).await;
        result.search_results = self.search_web(&keywords).await;
        result.used_search = true;

        result.answer = if result.search_results.is_empty() {
            tracing::warn!("No search results, falling back to direct answer");
            self.answer_direct(question).await?
        } else {
            self.answer_with_results(question, &result.search_results)
                .await?
        };
        Ok(())
    }

    /// Ask the model whether `question` needs current web information.
    async fn decide(&self, question: &str) -> DecisionOutcome {
        tracing::info!("Deciding if web search is needed");

        let raw = match self
            .provider
            .simple_chat(&prompts::decision_prompt(question), DECISION_TEMPERATURE)
            .await
        {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!("Decision call failed, defaulting to no search: {error}");
                return DecisionOutcome::fallback();
            }
        };

        match decode_structured::<DecisionOutcome>(&raw) {
            Some(decision) => {
                tracing::info!(
                    needs_search = decision.needs_search,
                    reason = %decision.reason,
                    "Search decision"
                );
                decision
            }
            None => {
                tracing::warn!("Failed to parse decision, defaulting to no search");
                DecisionOutcome::fallback()
            }
        }
    }

    /// Turn the question into a search query, or return it verbatim.
    async fn extract_keywords(&self, question: &str) -> String {
        tracing::info!("Extracting search keywords");

        let raw = match self
            .provider
            .simple_chat(&prompts::keyword_prompt(question), DECISION_TEMPERATURE)
            .await
        {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!("Keyword call failed, using original question: {error}");
                return question.to_string();
            }
        };

        let keywords = decode_structured::<KeywordReply>(&raw)
            .and_then(|reply| reply.keywords)
            .filter(|keywords| !keywords.trim().is_empty());

        match keywords {
            Some(keywords) => {
                tracing::info!(keywords = %keywords, "Search keywords");
                keywords
            }
            None => {
                tracing::warn!("Failed to extract keywords, using original question");
                question.to_string()
            }
        }
    }

    async fn search_web(&self, keywords: &str) -> Vec<SearchResult> {
        tracing::info!(backend = self.search.name(), "Searching web for: {keywords}");

        match self.search.search(keywords, self.search_results).await {
            Ok(results) => {
                tracing::info!("Found {} search results", results.len());
                results
            }
            Err(error) => {
                tracing::error!(status = ?error.status_code(), "Web search failed: {error}");
                Vec::new()
            }
        }
    }

    async fn answer_with_results(
        &self,
        question: &str,
        results: &[SearchResult],
    ) -> Result<String, ProviderError> {
        tracing::info!("Generating answer from search results");
        let prompt = prompts::answer_with_search_prompt(question, &format_search_results(results));
        self.provider.simple_chat(&prompt, ANSWER_TEMPERATURE).await
    }

    async fn answer_direct(&self, question: &str) -> Result<String, ProviderError> {
        tracing::info!("Generating direct answer from model knowledge");
        self.provider
            .simple_chat(&prompts::answer_direct_prompt(question), ANSWER_TEMPERATURE)
            .await
    }
}
