//! Model output parsing and card validation
//!
//! Accepted shapes:
//! - `{"flashcards": [ ... ]}` (what the prompt asks for)
//! - `[ ... ]` (bare array, accepted for backends without a JSON-object mode)
//!
//! An object without a `flashcards` key has no candidates. Anything that is
//! not JSON, a scalar at the top level, or a non-array `flashcards` value is
//! a [`ParseError`]. Malformed candidates are dropped and counted; zero
//! surviving cards is an [`EmptyResultError`].

use mcg_common::Flashcard;
use serde_json::Value;
use thiserror::Error;

/// Field holding the card array in the canonical shape
pub const FLASHCARDS_FIELD: &str = "flashcards";

/// Model output is not structurally parseable
#[derive(Debug, Error)]
#[error("Model output is not parseable: {reason}")]
pub struct ParseError {
    pub reason: String,
}

impl ParseError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Model output parsed but held no valid cards
#[derive(Debug, Error)]
#[error("Model output contained no valid flashcards ({dropped} candidate(s) dropped)")]
pub struct EmptyResultError {
    pub dropped: usize,
}

/// Either failure of [`parse_and_validate`]
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Empty(#[from] EmptyResultError),
}

/// Validated cards plus the number of candidates rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCards {
    pub cards: Vec<Flashcard>,
    pub dropped: usize,
}

/// Parse raw model output and keep only well-formed cards
pub fn parse_and_validate(raw: &str) -> Result<ParsedCards, ExtractError> {
    let document: Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| ParseError::new(format!("invalid JSON: {}", e)))?;

    let candidates = extract_candidates(document)?;
    let total = candidates.len();

    let cards: Vec<Flashcard> = candidates.iter().filter_map(validate_candidate).collect();
    let dropped = total - cards.len();

    if cards.is_empty() {
        return Err(EmptyResultError { dropped }.into());
    }

    Ok(ParsedCards { cards, dropped })
}

/// Pull the candidate list out of either accepted shape
fn extract_candidates(document: Value) -> Result<Vec<Value>, ParseError> {
    match document {
        Value::Array(items) => Ok(items),
        Value::Object(mut fields) => match fields.remove(FLASHCARDS_FIELD) {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(ParseError::new(format!(
                "`{}` is {} instead of an array",
                FLASHCARDS_FIELD,
                json_kind(&other)
            ))),
            None => Ok(Vec::new()),
        },
        other => Err(ParseError::new(format!(
            "expected an object or array, got {}",
            json_kind(&other)
        ))),
    }
}

/// A candidate is valid if it is an object with non-blank string `front` and `back`
fn validate_candidate(candidate: &Value) -> Option<Flashcard> {
    let fields = candidate.as_object()?;
    let front = fields.get("front")?.as_str()?.trim();
    let back = fields.get("back")?.as_str()?.trim();

    if front.is_empty() || back.is_empty() {
        return None;
    }

    Some(Flashcard::new(front, back))
}

/// Remove one surrounding Markdown code fence, if present
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening fence line
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
