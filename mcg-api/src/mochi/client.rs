//! Mochi REST API client
//!
//! Authenticates with HTTP basic auth: the API key is the user name and the
//! password is empty. Responses are passed back as raw JSON.

use mcg_common::config::{MochiConfig, MOCHI_API_KEY_ENV};
use mcg_common::{DeckDescriptor, Error, Flashcard, NewCard, Result};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::payload::{CardPayload, DeckPayload};

/// Longest error body kept in a [`MochiError::Status`]
const MAX_ERROR_BODY_CHARS: usize = 1000;

/// Mochi client errors
#[derive(Debug, Error)]
pub enum MochiError {
    #[error("Missing credential: {0} is not configured")]
    MissingCredential(&'static str),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Mochi API error {status}")]
    Status { status: u16, body: String },

    #[error("Failed to decode Mochi response: {0}")]
    Decode(String),
}

impl MochiError {
    /// Response body returned by Mochi, if any
    pub fn details(&self) -> Option<&str> {
        match self {
            MochiError::Status { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }
}

/// Card that could not be created during [`MochiClient::submit_deck`]
#[derive(Debug, Clone, Serialize)]
pub struct CardFailure {
    pub index: usize,
    pub front: String,
    pub error: String,
}

/// Outcome of creating a deck and filling it with cards
#[derive(Debug, Clone, Serialize)]
pub struct SubmitReport {
    pub deck: Value,
    pub deck_id: String,
    pub cards_created: usize,
    pub failures: Vec<CardFailure>,
}

/// Client for the Mochi flashcard service
pub struct MochiClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl MochiClient {
    /// Build the client from configuration
    ///
    /// A missing API key is not an error here; it is reported on first use.
    pub fn new(config: &MochiConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// `GET /decks`
    pub async fn list_decks(&self) -> std::result::Result<Value, MochiError> {
        let request = self.http_client.get(self.url("/decks"));
        self.send(request).await
    }

    /// `POST /decks`
    pub async fn create_deck(&self, deck: &DeckDescriptor) -> std::result::Result<Value, MochiError> {
        let payload = DeckPayload::from(deck);
        debug!(?payload, "Creating Mochi deck");
        let request = self.http_client.post(self.url("/decks")).json(&payload);
        self.send(request).await
    }

    /// `POST /cards`
    pub async fn create_card(&self, card: &NewCard) -> std::result::Result<Value, MochiError> {
        let payload = CardPayload::from(card);
        debug!(deck_id = %card.deck_id, "Creating Mochi card");
        let request = self.http_client.post(self.url("/cards")).json(&payload);
        self.send(request).await
    }

    /// Create a deck, then each card in order
    ///
    /// Deck creation failure aborts. Card failures are collected and the
    /// remaining cards are still attempted.
    pub async fn submit_deck(
        &self,
        deck: &DeckDescriptor,
        cards: &[Flashcard],
    ) -> std::result::Result<SubmitReport, MochiError> {
        let created = self.create_deck(deck).await?;
        let deck_id = created
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| MochiError::Decode("created deck has no `id`".to_string()))?
            .to_string();

        let mut cards_created = 0;
        let mut failures = Vec::new();

        for (index, card) in cards.iter().enumerate() {
            match self.create_card(&NewCard::new(&deck_id, card)).await {
                Ok(_) => cards_created += 1,
                Err(e) => {
                    warn!(index, deck_id = %deck_id, error = %e, "Failed to create card");
                    failures.push(CardFailure {
                        index,
                        front: card.front.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            deck_id = %deck_id,
            cards_created,
            failed = failures.len(),
            "Submitted deck to Mochi"
        );

        Ok(SubmitReport {
            deck: created,
            deck_id,
            cards_created,
            failures,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> std::result::Result<Value, MochiError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(MochiError::MissingCredential(MOCHI_API_KEY_ENV))?;

        let response = request
            .basic_auth(api_key, Some(""))
            .send()
            .await
            .map_err(|e| MochiError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MochiError::Network(format!("Failed to read response body: {}", e)))?;

        debug!(status = status.as_u16(), "Mochi response received");

        if !status.is_success() {
            return Err(MochiError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| MochiError::Decode(e.to_string()))
    }
}
