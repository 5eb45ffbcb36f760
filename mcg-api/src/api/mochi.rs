//! Mochi proxy endpoints
//!
//! Successful calls return `{"status": "success", "message", "data"}` where
//! `data` is Mochi's own response.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use mcg_common::{DeckDescriptor, Flashcard, NewCard};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::error::{ApiError, ApiResult};
use crate::mochi::MochiError;
use crate::AppState;

/// Success envelope for proxied calls
#[derive(Debug, Serialize)]
pub struct MochiEnvelope<T> {
    pub status: &'static str,
    pub message: String,
    pub data: T,
}

impl<T> MochiEnvelope<T> {
    fn success(message: &str, data: T) -> Json<Self> {
        Json(Self {
            status: "success",
            message: message.to_string(),
            data,
        })
    }
}

/// Card creation request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCardRequest {
    pub deck_id: String,
    pub front_content: String,
    pub back_content: String,
}

/// Deck creation plus the cards to put in it
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitDeckRequest {
    #[serde(flatten)]
    pub deck: DeckDescriptor,
    pub cards: Vec<Flashcard>,
}

async fn proxy_failure(state: &AppState, operation: &str, err: MochiError) -> ApiError {
    error!(operation, error = %err, "Mochi request failed");
    state
        .record_error(format!("Mochi {} failed: {}", operation, err))
        .await;
    err.into()
}

/// GET /api/backend/mochi/test
pub async fn test_connection(
    State(state): State<AppState>,
) -> ApiResult<Json<MochiEnvelope<Value>>> {
    match state.mochi.list_decks().await {
        Ok(data) => Ok(MochiEnvelope::success("Successfully connected to Mochi", data)),
        Err(err) => Err(proxy_failure(&state, "connection test", err).await),
    }
}

/// GET /api/backend/mochi/decks
pub async fn list_decks(State(state): State<AppState>) -> ApiResult<Json<MochiEnvelope<Value>>> {
    match state.mochi.list_decks().await {
        Ok(data) => Ok(MochiEnvelope::success("Successfully retrieved decks", data)),
        Err(err) => Err(proxy_failure(&state, "list decks", err).await),
    }
}

/// POST /api/backend/mochi/create_card
pub async fn create_card(
    State(state): State<AppState>,
    body: Result<Json<CreateCardRequest>, JsonRejection>,
) -> ApiResult<Json<MochiEnvelope<Value>>> {
    let Json(request) = body?;
    if request.deck_id.trim().is_empty() {
        return Err(ApiError::BadRequest("deck_id is required".to_string()));
    }

    let card = NewCard {
        deck_id: request.deck_id,
        front: request.front_content,
        back: request.back_content,
    };

    match state.mochi.create_card(&card).await {
        Ok(data) => Ok(MochiEnvelope::success("Flashcard created successfully", data)),
        Err(err) => Err(proxy_failure(&state, "create card", err).await),
    }
}

/// POST /api/backend/mochi/create_deck
pub async fn create_deck(
    State(state): State<AppState>,
    body: Result<Json<DeckDescriptor>, JsonRejection>,
) -> ApiResult<Json<MochiEnvelope<Value>>> {
    let Json(deck) = body?;
    deck.validate()?;

    match state.mochi.create_deck(&deck).await {
        Ok(data) => {
            info!(name = %deck.name, "Created Mochi deck");
            Ok(MochiEnvelope::success("Deck created successfully", data))
        }
        Err(err) => Err(proxy_failure(&state, "create deck", err).await),
    }
}

/// POST /api/backend/mochi/submit_deck
pub async fn submit_deck(
    State(state): State<AppState>,
    body: Result<Json<SubmitDeckRequest>, JsonRejection>,
) -> ApiResult<Json<MochiEnvelope<Value>>> {
    let Json(SubmitDeckRequest { deck, cards }) = body?;
    deck.validate()?;

    // The short-notes placeholder is not study material
    let cards: Vec<Flashcard> = cards
        .into_iter()
        .filter(|card| !card.is_input_too_short())
        .collect();
    if cards.is_empty() {
        return Err(ApiError::BadRequest("no cards to submit".to_string()));
    }

    match state.mochi.submit_deck(&deck, &cards).await {
        Ok(report) => {
            let message = if report.failures.is_empty() {
                format!("Deck created with {} card(s)", report.cards_created)
            } else {
                format!(
                    "Deck created with {} card(s), {} failed",
                    report.cards_created,
                    report.failures.len()
                )
            };
            let data = serde_json::to_value(&report)
                .map_err(|e| ApiError::Internal(format!("Failed to encode report: {}", e)))?;
            Ok(MochiEnvelope::success(&message, data))
        }
        Err(err) => Err(proxy_failure(&state, "submit deck", err).await),
    }
}

pub fn mochi_routes() -> Router<AppState> {
    Router::new()
        .route("/api/backend/mochi/test", get(test_connection))
        .route("/api/backend/mochi/decks", get(list_decks))
        .route("/api/backend/mochi/create_card", post(create_card))
        .route("/api/backend/mochi/create_deck", post(create_deck))
        .route("/api/backend/mochi/submit_deck", post(submit_deck))
}
