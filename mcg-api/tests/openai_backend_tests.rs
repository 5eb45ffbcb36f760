//! OpenAI backend tests against a mock Chat Completions server

mod helpers;

use mcg_api::generation::{
    BackendError, FlashcardGenerator, ModelBackend, ModelClient, OpenAiBackend, RetryPolicy,
};
use mcg_common::config::OpenAiConfig;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer, json_mode: bool) -> OpenAiBackend {
    OpenAiBackend::new(&OpenAiConfig {
        base_url: format!("{}/v1", server.uri()),
        model: "gpt-4o-mini".to_string(),
        json_mode,
        timeout_secs: 5,
        api_key: Some("sk-test".to_string()),
    })
    .expect("Should build backend")
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn test_complete_returns_message_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "response_format": { "type": "json_object" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(r#"{"flashcards": []}"#)))
        .expect(1)
        .mount(&server)
        .await;

    let output = backend_for(&server, true).complete("notes").await.unwrap();
    assert_eq!(output, r#"{"flashcards": []}"#);
}

#[tokio::test]
async fn test_prompt_sent_as_user_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                { "role": "system" },
                { "role": "user", "content": "the full prompt" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let output = backend_for(&server, false)
        .complete("the full prompt")
        .await
        .unwrap();
    assert_eq!(output, "ok");
}

#[tokio::test]
async fn test_http_error_maps_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = backend_for(&server, true).complete("notes").await.unwrap_err();
    match err {
        BackendError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        other => panic!("Expected Status, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_envelope_maps_to_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": { "message": "model overloaded", "type": "server_error" }
        })))
        .mount(&server)
        .await;

    let err = backend_for(&server, true).complete("notes").await.unwrap_err();
    assert!(matches!(err, BackendError::Provider(ref m) if m == "model overloaded"));
}

#[tokio::test]
async fn test_missing_content_maps_to_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": null } }]
        })))
        .mount(&server)
        .await;

    let err = backend_for(&server, true).complete("notes").await.unwrap_err();
    assert!(matches!(err, BackendError::Envelope(_)));
}

#[tokio::test]
async fn test_refusal_maps_to_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": null, "refusal": "no" } }]
        })))
        .mount(&server)
        .await;

    let err = backend_for(&server, true).complete("notes").await.unwrap_err();
    assert!(matches!(err, BackendError::Provider(ref m) if m.contains("refused")));
}

#[tokio::test]
async fn test_generator_retries_real_backend_then_succeeds() {
    let server = MockServer::start().await;
    // First two attempts fail, third succeeds
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"flashcards": [{"front": "What powers the cell?", "back": "ATP"}]}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = ModelClient::new(
        Arc::new(backend_for(&server, true)),
        RetryPolicy::new(3, Duration::ZERO),
    );
    let generator = FlashcardGenerator::new(client, 10);

    let generation = generator.generate(helpers::LONG_NOTES).await.unwrap();
    assert_eq!(generation.cards.len(), 1);
    assert_eq!(generation.cards[0].back, "ATP");
}

#[tokio::test]
async fn test_missing_key_fails_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let backend = OpenAiBackend::new(&OpenAiConfig {
        base_url: server.uri(),
        api_key: None,
        ..Default::default()
    })
    .unwrap();

    let err = backend.complete("notes").await.unwrap_err();
    assert!(matches!(err, BackendError::MissingCredential("OPENAI_API_KEY")));
}
