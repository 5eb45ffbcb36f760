//! OpenAI Chat Completions backend
//!
//! One `POST {base_url}/chat/completions` per [`ModelBackend::complete`] call.
//! Retrying is the caller's job (see [`super::model_client::ModelClient`]).

use async_trait::async_trait;
use mcg_common::config::{OpenAiConfig, OPENAI_API_KEY_ENV};
use mcg_common::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::model_client::{BackendError, ModelBackend};
use super::prompt::SYSTEM_INSTRUCTION;

/// Longest error body kept in a [`BackendError::Status`]
const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Generative backend talking to an OpenAI-compatible API
pub struct OpenAiBackend {
    http_client: Client,
    endpoint: String,
    model: String,
    json_mode: bool,
    api_key: Option<String>,
}

impl OpenAiBackend {
    /// Build the backend from configuration
    ///
    /// A missing API key is not an error here; it is reported on first use.
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            json_mode: config.json_mode,
            api_key: config.api_key.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> std::result::Result<String, BackendError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(BackendError::MissingCredential(OPENAI_API_KEY_ENV))?;

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: self.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        debug!(model = %self.model, endpoint = %self.endpoint, "Sending chat completion request");

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Network(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let envelope: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| BackendError::Envelope(format!("Failed to parse response: {}", e)))?;

        if let Some(error) = envelope.error {
            return Err(BackendError::Provider(error.message));
        }

        let message = envelope
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| BackendError::Envelope("response has no choices".to_string()))?;

        match (message.content, message.refusal) {
            (Some(content), _) if !content.trim().is_empty() => {
                debug!(chars = content.len(), "Received model output");
                Ok(content)
            }
            (_, Some(refusal)) => Err(BackendError::Provider(format!("model refused: {}", refusal))),
            _ => Err(BackendError::Envelope(
                "response message has no content".to_string(),
            )),
        }
    }
}
