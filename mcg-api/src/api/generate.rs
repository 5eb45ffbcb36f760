//! Flashcard generation endpoints
//!
//! All entry points run the same pipeline. The request body names its text
//! `notes`; `text` and `prompt` are accepted as aliases.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use mcg_common::Flashcard;
use serde::Deserialize;
use tracing::error;

use crate::error::ApiResult;
use crate::generation::{GenerateError, Note};
use crate::AppState;

/// Response header carrying the number of rejected card candidates
pub const DROPPED_HEADER: &str = "x-flashcards-dropped";

/// Generation request body
#[derive(Debug, Clone, Deserialize)]
pub struct NotesRequest {
    /// Missing text is treated as empty and rejected by the pipeline
    #[serde(default, alias = "text", alias = "prompt")]
    pub notes: String,
}

/// POST /generate-flashcards-openai
/// POST /api/backend/openai
pub async fn generate_flashcards(
    State(state): State<AppState>,
    body: Result<Json<NotesRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = body?;
    match state.generator.generate(&request.notes).await {
        Ok(generation) => Ok((
            [(DROPPED_HEADER, generation.dropped.to_string())],
            Json(generation.cards),
        )
            .into_response()),
        Err(err) => {
            match &err {
                GenerateError::Validation(_) => {}
                GenerateError::Provider(provider) => {
                    error!(attempts = provider.attempts, cause = %provider.cause, "Flashcard generation failed");
                    state.record_error(err.to_string()).await;
                }
                _ => {
                    error!(error = %err, "Flashcard generation failed");
                    state.record_error(err.to_string()).await;
                }
            }
            Err(err.into())
        }
    }
}

/// POST /generate-flashcards
///
/// Demo endpoint: checks the input like the real pipeline, then returns
/// fixed sample cards without calling the backend.
pub async fn generate_sample_flashcards(
    body: Result<Json<NotesRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<Flashcard>>> {
    let Json(request) = body?;
    if Note::new(&request.notes).is_none() {
        return Err(GenerateError::Validation("notes cannot be empty".to_string()).into());
    }
    Ok(Json(sample_cards()))
}

pub fn sample_cards() -> Vec<Flashcard> {
    vec![
        Flashcard::new("What is X?", "X is Y"),
        Flashcard::new("What is A?", "A is B"),
    ]
}

pub fn generate_routes() -> Router<AppState> {
    Router::new()
        .route("/generate-flashcards-openai", post(generate_flashcards))
        .route("/api/backend/openai", post(generate_flashcards))
        .route("/generate-flashcards", post(generate_sample_flashcards))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notes_request_aliases() {
        for body in [
            r#"{"notes": "n"}"#,
            r#"{"text": "n"}"#,
            r#"{"prompt": "n"}"#,
        ] {
            let request: NotesRequest = serde_json::from_str(body).unwrap();
            assert_eq!(request.notes, "n");
        }
    }

    #[test]
    fn test_missing_notes_is_empty() {
        let request: NotesRequest = serde_json::from_str("{}").unwrap();
        assert!(request.notes.is_empty());
    }
}
