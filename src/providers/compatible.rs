//! Generic OpenAI-compatible completion provider.
//! The Zeabur AI Hub and most hosted gateways accept the same
//! `/v1/chat/completions` request shape, so one implementation covers them.

use crate::providers::traits::{ChatMessage, Provider, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://sfo1.aihub.zeabur.ai";

/// A provider that speaks the OpenAI-compatible chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    pub(crate) base_url: String,
    pub(crate) credential: Option<String>,
    model: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ApiChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    /// Reasoning models may put their whole output here instead of `content`.
    #[serde(default)]
    reasoning_content: Option<String>,
}

impl ResponseMessage {
    fn effective_content(self) -> Option<String> {
        match self.content {
            Some(c) if !c.is_empty() => Some(c),
            _ => self.reasoning_content.filter(|c| !c.is_empty()),
        }
    }
}

impl OpenAiCompatibleProvider {
    pub fn new(
        base_url: &str,
        credential: Option<&str>,
        model: &str,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credential: credential
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(ToString::to_string),
            model: model.to_string(),
            client,
        })
    }

    /// Build the full chat-completions URL.
    ///
    /// Accepts a bare host (`https://host`), a versioned base
    /// (`https://host/v1`) or the full endpoint.
    fn chat_completions_url(&self) -> String {
        let path = reqwest::Url::parse(&self.base_url)
            .map(|url| url.path().trim_end_matches('/').to_string())
            .unwrap_or_else(|_| self.base_url.clone());

        if path.ends_with("/chat/completions") {
            self.base_url.clone()
        } else if path.ends_with("/v1") {
            format!("{}/chat/completions", self.base_url)
        } else {
            format!("{}/v1/chat/completions", self.base_url)
        }
    }

    fn apply_auth_header(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.credential.as_deref() {
            Some(credential) => req.bearer_auth(credential),
            None => req,
        }
    }
}

/// Pull the most useful detail out of a failed response body.
///
/// Prefers `error.message` from an OpenAI-style error object and falls back to
/// the raw body.
fn error_detail(body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(serde_json::Value::as_str)
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| body.to_string());
    super::sanitize_api_error(&detail)
}

fn parse_chat_response_body(body: &str) -> Result<String, ProviderError> {
    let response: ApiChatResponse = serde_json::from_str(body).map_err(|error| {
        ProviderError::Payload(format!(
            "{error}; body={}",
            super::sanitize_api_error(body)
        ))
    })?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.effective_content())
        .ok_or_else(|| ProviderError::Payload("response contained no message content".into()))
}

#[async_trait]
impl Provider for OpenAiCompatibleProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: f64,
        model: Option<&str>,
        max_tokens: Option<u32>,
    ) -> Result<String, ProviderError> {
        let request = ApiChatRequest {
            model: model.unwrap_or(&self.model),
            messages,
            temperature,
            max_tokens: max_tokens.filter(|value| *value > 0),
        };

        let url = self.chat_completions_url();
        tracing::debug!(model = request.model, messages = messages.len(), "Sending chat completion");

        let response = self
            .apply_auth_header(self.client.post(&url).json(&request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        parse_chat_response_body(&body)
    }

    fn default_model(&self) -> &str {
        &self.model
    }
}
