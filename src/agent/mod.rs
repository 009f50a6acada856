pub mod decoder;
pub mod prompts;
pub mod research;

pub use research::{format_search_results, AnswerResult, DecisionOutcome, ResearchAgent};
