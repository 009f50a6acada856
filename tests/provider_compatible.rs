//! HTTP-level tests for the OpenAI-compatible completion backend.

use deep_research::providers::{OpenAiCompatibleProvider, Provider, ProviderError};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn sends_bearer_auth_and_returns_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "temperature": 0.1,
            "messages": [{"role": "user", "content": "ping"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("pong")))
        .expect(1)
        .mount(&server)
        .await;

    let provider =
        OpenAiCompatibleProvider::new(&server.uri(), Some("sk-test"), "gpt-4o-mini", 5).unwrap();
    let reply = provider.simple_chat("ping", 0.1).await.unwrap();

    assert_eq!(reply, "pong");
}

#[tokio::test]
async fn versioned_base_url_is_not_doubled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let base = format!("{}/v1", server.uri());
    let provider = OpenAiCompatibleProvider::new(&base, None, "m", 5).unwrap();

    assert_eq!(provider.simple_chat("hi", 0.7).await.unwrap(), "ok");
}

#[tokio::test]
async fn explicit_model_and_max_tokens_are_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-4o", "max_tokens": 64})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("short")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiCompatibleProvider::new(&server.uri(), None, "gpt-4o-mini", 5).unwrap();
    let messages = [deep_research::providers::ChatMessage::user("hi")];
    let reply = provider
        .chat(&messages, 0.7, Some("gpt-4o"), Some(64))
        .await
        .unwrap();

    assert_eq!(reply, "short");
}

#[tokio::test]
async fn error_status_surfaces_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Invalid API key", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let provider = OpenAiCompatibleProvider::new(&server.uri(), Some("bad"), "m", 5).unwrap();
    let error = provider.simple_chat("hi", 0.7).await.unwrap_err();

    assert_eq!(error.status_code(), Some(401));
    assert_eq!(error.message(), "API request failed: Invalid API key");
}

#[tokio::test]
async fn error_status_with_plain_body_uses_body_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let provider = OpenAiCompatibleProvider::new(&server.uri(), None, "m", 5).unwrap();
    let error = provider.simple_chat("hi", 0.7).await.unwrap_err();

    assert_eq!(
        error,
        ProviderError::Api {
            status: 502,
            detail: "Bad Gateway".into()
        }
    );
}

#[tokio::test]
async fn non_json_success_body_is_a_payload_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let provider = OpenAiCompatibleProvider::new(&server.uri(), None, "m", 5).unwrap();
    let error = provider.simple_chat("hi", 0.7).await.unwrap_err();

    assert!(matches!(error, ProviderError::Payload(_)));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let provider = OpenAiCompatibleProvider::new(&server.uri(), None, "m", 1).unwrap();
    let error = provider.simple_chat("hi", 0.7).await.unwrap_err();

    assert_eq!(error, ProviderError::Timeout);
    assert_eq!(error.message(), "Request timed out");
}
