//! Shared flashcard and deck data model
//!
//! These types cross the boundary between the generation pipeline, the HTTP
//! API and the Mochi proxy. Wire-format translation for the Mochi service
//! lives with the proxy, not here.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Front text of the card returned when notes are too short to bother the model
pub const INPUT_TOO_SHORT_FRONT: &str = "Input too short";

/// Back text of the card returned when notes are too short to bother the model
pub const INPUT_TOO_SHORT_BACK: &str = "Add more notes to get a response.";

/// A question/answer flashcard
///
/// Both sides are non-empty once produced by the validator. Cards are never
/// mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    /// Question side
    pub front: String,
    /// Answer side
    pub back: String,
}

impl Flashcard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }

    /// Sentinel card signalling that the submitted notes were too short
    pub fn input_too_short() -> Self {
        Self::new(INPUT_TOO_SHORT_FRONT, INPUT_TOO_SHORT_BACK)
    }

    /// True if this is the "input too short" sentinel
    pub fn is_input_too_short(&self) -> bool {
        self.front == INPUT_TOO_SHORT_FRONT && self.back == INPUT_TOO_SHORT_BACK
    }
}

/// A card to be created inside an existing deck of the flashcard service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCard {
    pub deck_id: String,
    pub front: String,
    pub back: String,
}

impl NewCard {
    pub fn new(deck_id: impl Into<String>, card: &Flashcard) -> Self {
        Self {
            deck_id: deck_id.into(),
            front: card.front.clone(),
            back: card.back.clone(),
        }
    }
}

/// Deck creation request
///
/// Only `name` is required. Every optional field is passed through to the
/// flashcard service untouched when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckDescriptor {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub sort: Option<i64>,
    #[serde(default)]
    pub archived: Option<bool>,
    /// ISO timestamp at which the deck was trashed
    #[serde(default)]
    pub trashed: Option<String>,
    #[serde(default)]
    pub show_sides: Option<bool>,
    #[serde(default)]
    pub sort_by_direction: Option<bool>,
    #[serde(default)]
    pub review_reverse: Option<bool>,
    /// How cards are sorted on the deck page
    #[serde(default)]
    pub sort_by: Option<String>,
    /// How cards are displayed on the deck page
    #[serde(default)]
    pub cards_view: Option<String>,
}

impl DeckDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Reject descriptors without a usable name
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("deck name is required".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_card() {
        let card = Flashcard::input_too_short();
        assert_eq!(card.front, "Input too short");
        assert_eq!(card.back, "Add more notes to get a response.");
        assert!(card.is_input_too_short());
        assert!(!Flashcard::new("Q", "A").is_input_too_short());
    }

    #[test]
    fn test_deck_descriptor_requires_name() {
        assert!(DeckDescriptor::named("Biology").validate().is_ok());
        assert!(matches!(
            DeckDescriptor::named("   ").validate(),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_deck_descriptor_deserializes_with_only_name() {
        let deck: DeckDescriptor = serde_json::from_str(r#"{"name": "History"}"#).unwrap();
        assert_eq!(deck, DeckDescriptor::named("History"));
    }

    #[test]
    fn test_new_card_copies_sides() {
        let card = NewCard::new("deck-1", &Flashcard::new("Q", "A"));
        assert_eq!(card.deck_id, "deck-1");
        assert_eq!(card.front, "Q");
        assert_eq!(card.back, "A");
    }
}
