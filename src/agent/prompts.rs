//! Prompt templates for each research stage.
//!
//! Templates are filled with plain `str::replace` on `{question}` /
//! `{search_results}` so that the literal JSON braces in the instructions
//! need no escaping.

const DECISION_PROMPT: &str = r#"You are a helpful assistant that decides whether a question requires current information from the web.

Analyze the following question and determine if it needs web search to provide an accurate, up-to-date answer.

Questions that typically NEED web search:
- Current events, news, or recent developments
- Real-time data (prices, weather, stock prices)
- Information that changes frequently
- Questions about specific recent dates or events
- Questions about current versions of software, products, etc.

Questions that typically DON'T need web search:
- General knowledge, concepts, or explanations
- Historical facts
- How-to guides for established processes
- Mathematical or logical problems
- Definitions or explanations of well-known topics

Question: {question}

Respond with ONLY a JSON object (no markdown, no explanation):
{"needs_search": true/false, "reason": "brief explanation"}"#;

const KEYWORD_PROMPT: &str = r#"Extract the best search keywords from this question to find relevant information on Google.

Question: {question}

Respond with ONLY a JSON object (no markdown, no explanation):
{"keywords": "optimized search query"}"#;

const ANSWER_WITH_SEARCH_PROMPT: &str = "You are a helpful research assistant. Answer the user's question using the search results provided.

Question: {question}

Search Results:
{search_results}

Instructions:
- Provide a comprehensive answer based on the search results
- If the search results don't contain relevant information, say so
- Cite sources when possible by mentioning the source title
- Be concise but thorough";

const ANSWER_DIRECT_PROMPT: &str = "You are a helpful assistant. Answer the following question based on your knowledge.

Question: {question}

Provide a clear, accurate, and helpful response.";

pub fn decision_prompt(question: &str) -> String {
    DECISION_PROMPT.replace("{question}", question)
}

pub fn keyword_prompt(question: &str) -> String {
    KEYWORD_PROMPT.replace("{question}", question)
}

/// `formatted_results` is the output of
/// [`format_search_results`](super::research::format_search_results).
pub fn answer_with_search_prompt(question: &str, formatted_results: &str) -> String {
    // Substitute results first: a question containing "{search_results}"
    // must not be expanded.
    ANSWER_WITH_SEARCH_PROMPT
        .replace("{search_results}", formatted_results)
        .replacen("{question}", question, 1)
}

pub fn answer_direct_prompt(question: &str) -> String {
    ANSWER_DIRECT_PROMPT.replace("{question}", question)
}
