//! Flashcard generation pipeline
//!
//! Input check → prompt → model call (with retry) → parse & validate.
//! Only the model call is retried; a parse failure does not re-invoke the
//! model.

use mcg_common::config::GenerationConfig;
use mcg_common::Flashcard;
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::model_client::{ModelClient, ProviderError, RetryPolicy};
use super::parser::{parse_and_validate, EmptyResultError, ExtractError, ParseError};
use super::prompt::build_prompt;

/// Default minimum note length (characters, after trimming)
pub const DEFAULT_MIN_NOTE_CHARS: usize = 50;

/// Pipeline failure
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Caller input failed preconditions
    #[error("Validation error: {0}")]
    Validation(String),

    /// Backend kept failing after the retry budget
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Backend output was not structured data
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Backend output held no usable cards
    #[error(transparent)]
    EmptyResult(#[from] EmptyResultError),
}

impl From<ExtractError> for GenerateError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Parse(e) => GenerateError::Parse(e),
            ExtractError::Empty(e) => GenerateError::EmptyResult(e),
        }
    }
}

/// Trimmed, non-empty note text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    body: String,
}

impl Note {
    /// Trim the raw text; `None` if nothing is left
    pub fn new(raw: &str) -> Option<Self> {
        let body = raw.trim();
        if body.is_empty() {
            None
        } else {
            Some(Self {
                body: body.to_string(),
            })
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Length in characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.body.chars().count()
    }
}

/// Result of a successful pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// Validated cards, never empty
    pub cards: Vec<Flashcard>,
    /// Candidates dropped by the validator
    pub dropped: usize,
    /// True when the input was too short and the model was not called
    pub short_circuited: bool,
}

/// Runs the generation pipeline against a [`ModelClient`]
#[derive(Clone)]
pub struct FlashcardGenerator {
    client: ModelClient,
    min_note_chars: usize,
}

impl FlashcardGenerator {
    pub fn new(client: ModelClient, min_note_chars: usize) -> Self {
        Self {
            client,
            min_note_chars,
        }
    }

    pub fn from_config(client: ModelClient, config: &GenerationConfig) -> Self {
        Self::new(client, config.min_note_chars)
    }

    pub fn min_note_chars(&self) -> usize {
        self.min_note_chars
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.client.policy()
    }

    /// Generate validated flashcards from raw notes
    pub async fn generate(&self, notes: &str) -> Result<Generation, GenerateError> {
        let request_id = Uuid::new_v4();
        self.run(notes)
            .instrument(info_span!("generate", %request_id))
            .await
    }

    async fn run(&self, notes: &str) -> Result<Generation, GenerateError> {
        let note = Note::new(notes)
            .ok_or_else(|| GenerateError::Validation("notes cannot be empty".to_string()))?;

        let length = note.char_len();
        if length < self.min_note_chars {
            info!(
                length,
                min = self.min_note_chars,
                "Notes too short, skipping model call"
            );
            return Ok(Generation {
                cards: vec![Flashcard::input_too_short()],
                dropped: 0,
                short_circuited: true,
            });
        }

        let prompt = build_prompt(note.body());
        debug!(prompt = %prompt, "Built generation prompt");

        let raw = self.client.call_model(&prompt).await?;
        debug!(output = %raw, "Raw model output");

        let parsed = parse_and_validate(&raw).map_err(|e| {
            warn!(error = %e, "Model output rejected");
            GenerateError::from(e)
        })?;

        if parsed.dropped > 0 {
            warn!(
                dropped = parsed.dropped,
                kept = parsed.cards.len(),
                "Dropped malformed card candidates"
            );
        }

        info!(cards = parsed.cards.len(), "Generated flashcards");

        Ok(Generation {
            cards: parsed.cards,
            dropped: parsed.dropped,
            short_circuited: false,
        })
    }
}
