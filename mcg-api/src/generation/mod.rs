//! Flashcard generation
//!
//! - [`prompt`]: notes → model instruction
//! - [`model_client`]: backend seam and retry loop
//! - [`openai`]: Chat Completions backend
//! - [`parser`]: model output → validated cards
//! - [`pipeline`]: sequences the above

pub mod model_client;
pub mod openai;
pub mod parser;
pub mod pipeline;
pub mod prompt;

pub use model_client::{BackendError, ModelBackend, ModelClient, ProviderError, RetryPolicy};
pub use openai::OpenAiBackend;
pub use parser::{parse_and_validate, EmptyResultError, ExtractError, ParseError, ParsedCards};
pub use pipeline::{FlashcardGenerator, GenerateError, Generation, Note};
pub use prompt::{build_prompt, SYSTEM_INSTRUCTION};
