//! # Mochi Card Generator Common Library
//!
//! Shared code for the card generator service:
//! - Error type used by configuration loading
//! - Bootstrap configuration (TOML + environment)
//! - Flashcard and deck data model

pub mod config;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{DeckDescriptor, Flashcard, NewCard};
