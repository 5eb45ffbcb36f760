//! Error types for mcg-api
//!
//! Every handler failure is converted into a JSON error body with an HTTP
//! status; nothing propagates far enough to take the process down.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generation::GenerateError;
use crate::mochi::MochiError;

/// Message returned when the generative backend gives up
pub const PROVIDER_FAILURE_MESSAGE: &str = "Failed to generate flashcards after multiple attempts.";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Request body rejected before reaching a handler (400, 415 or 422)
    #[error("Invalid request body: {message}")]
    InvalidBody { status: StatusCode, message: String },

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Generation pipeline failure
    #[error(transparent)]
    Generation(#[from] GenerateError),

    /// Mochi proxy failure
    #[error(transparent)]
    Mochi(#[from] MochiError),

    /// mcg-common error
    #[error("Common error: {0}")]
    Common(#[from] mcg_common::Error),
}

impl ApiError {
    /// Status, machine-readable code, caller-safe message, optional details
    fn parts(&self) -> (StatusCode, &'static str, String, Option<String>) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None),
            ApiError::InvalidBody { status, message } => {
                (*status, "INVALID_REQUEST", message.clone(), None)
            }
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
                None,
            ),
            ApiError::Generation(err) => match err {
                GenerateError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
                }
                // Provider cause is logged, never returned
                GenerateError::Provider(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PROVIDER_ERROR",
                    PROVIDER_FAILURE_MESSAGE.to_string(),
                    None,
                ),
                GenerateError::Parse(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PARSE_ERROR",
                    "The model returned output that could not be parsed.".to_string(),
                    None,
                ),
                GenerateError::EmptyResult(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EMPTY_RESULT",
                    "The model returned no usable flashcards.".to_string(),
                    None,
                ),
            },
            ApiError::Mochi(err) => match err {
                MochiError::MissingCredential(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIG_ERROR",
                    err.to_string(),
                    None,
                ),
                _ => (
                    StatusCode::BAD_GATEWAY,
                    "MOCHI_ERROR",
                    err.to_string(),
                    err.details().map(str::to_string),
                ),
            },
            ApiError::Common(mcg_common::Error::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            ApiError::Common(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
                None,
            ),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = self.parts();

        let mut error = json!({
            "code": error_code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = json!(details);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
