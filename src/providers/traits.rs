use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Failure of a completion backend.
///
/// The `Display` text is the human-readable message that ends up in
/// user-facing answers when synthesis fails, so it must never carry
/// credentials (see [`super::sanitize_api_error`]).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("Request timed out")]
    Timeout,

    /// Backend answered with a non-success status.
    #[error("API request failed: {detail}")]
    Api { status: u16, detail: String },

    #[error("Request failed: {0}")]
    Transport(String),

    /// Success status, but the body was not a usable completion.
    #[error("Unexpected completion payload: {0}")]
    Payload(String),
}

impl ProviderError {
    /// HTTP status reported by the backend, when there was one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(super::sanitize_api_error(&error.to_string()))
        }
    }
}

/// Completion capability: role-tagged messages in, assistant text out.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send a conversation and return the assistant's reply.
    ///
    /// `model` falls back to the provider's configured default; `max_tokens`
    /// is only forwarded when set.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: f64,
        model: Option<&str>,
        max_tokens: Option<u32>,
    ) -> Result<String, ProviderError>;

    /// One-shot chat with an optional system prompt.
    async fn chat_with_system(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        temperature: f64,
    ) -> Result<String, ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(message));
        self.chat(&messages, temperature, None, None).await
    }

    /// Simple one-shot chat (single user message, no system prompt).
    ///
    /// This is what the research agent uses for every stage.
    async fn simple_chat(&self, message: &str, temperature: f64) -> Result<String, ProviderError> {
        self.chat_with_system(None, message, temperature).await
    }

    /// Model used when a call does not name one.
    fn default_model(&self) -> &str;
}
