//! Shared test helpers for mcg-api integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use mcg_api::generation::{BackendError, FlashcardGenerator, ModelBackend, ModelClient, RetryPolicy};
use mcg_api::mochi::MochiClient;
use mcg_api::AppState;
use mcg_common::config::MochiConfig;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Notes comfortably above the minimum length
pub const LONG_NOTES: &str = "Photosynthesis converts light energy into chemical energy. \
                              It takes place in the chloroplasts of plant cells.";

/// Stub backend replaying a script; repeats the last entry once exhausted
pub struct StubBackend {
    script: Mutex<VecDeque<Result<String, BackendError>>>,
    fallback: Mutex<Option<Result<String, String>>>,
    calls: AtomicUsize,
}

impl StubBackend {
    pub fn new(script: Vec<Result<String, BackendError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback: Mutex::new(None),
            calls: AtomicUsize::new(0),
        })
    }

    /// Backend that always returns the same output
    pub fn always(output: &str) -> Arc<Self> {
        let stub = Self::new(Vec::new());
        *stub.fallback.lock().unwrap() = Some(Ok(output.to_string()));
        stub
    }

    /// Backend that always fails with a network error
    pub fn always_failing() -> Arc<Self> {
        let stub = Self::new(Vec::new());
        *stub.fallback.lock().unwrap() = Some(Err("connection refused".to_string()));
        stub
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelBackend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        match self.fallback.lock().unwrap().clone() {
            Some(Ok(output)) => Ok(output),
            Some(Err(message)) => Err(BackendError::Network(message)),
            None => Err(BackendError::Network("script exhausted".to_string())),
        }
    }
}

/// App state wired to a stub backend (no retry delay) and a Mochi base URL
pub fn test_state(backend: Arc<StubBackend>, mochi_base_url: &str, mochi_key: Option<&str>) -> AppState {
    let client = ModelClient::new(backend, RetryPolicy::new(3, Duration::ZERO));
    let generator = FlashcardGenerator::new(client, 50);
    let mochi = MochiClient::new(&MochiConfig {
        base_url: mochi_base_url.to_string(),
        timeout_secs: 5,
        api_key: mochi_key.map(str::to_string),
    })
    .expect("Should build Mochi client");

    AppState::new(generator, mochi)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(body: Body) -> Value {
    let bytes = body.collect().await.expect("Should read body").to_bytes();
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
