//! Mochi flashcard service proxy
//!
//! Deck and card creation forwarded to the Mochi REST API. Not part of the
//! generation pipeline; shares the process and HTTP surface only.

pub mod client;
pub mod payload;

pub use client::{CardFailure, MochiClient, MochiError, SubmitReport};
pub use payload::{CardPayload, DeckPayload};
