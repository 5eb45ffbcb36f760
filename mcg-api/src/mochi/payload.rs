//! Wire payloads for the Mochi REST API
//!
//! Mochi uses kebab-case keys, with a trailing `?` on boolean flags. The
//! mapping from [`DeckDescriptor`] is one-way; nothing here is read back.

use mcg_common::{DeckDescriptor, NewCard};
use serde::Serialize;

/// Separator Mochi uses between card sides in Markdown content
pub const SIDE_SEPARATOR: &str = "\n---\n";

/// `POST /decks` body
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DeckPayload<'a> {
    pub name: &'a str,
    #[serde(rename = "parent-id", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<i64>,
    #[serde(rename = "archived?", skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(rename = "trashed?", skip_serializing_if = "Option::is_none")]
    pub trashed: Option<&'a str>,
    #[serde(rename = "show-sides?", skip_serializing_if = "Option::is_none")]
    pub show_sides: Option<bool>,
    #[serde(rename = "sort-by-direction", skip_serializing_if = "Option::is_none")]
    pub sort_by_direction: Option<bool>,
    #[serde(rename = "review-reverse?", skip_serializing_if = "Option::is_none")]
    pub review_reverse: Option<bool>,
    #[serde(rename = "sort-by", skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<&'a str>,
    #[serde(rename = "cards-view", skip_serializing_if = "Option::is_none")]
    pub cards_view: Option<&'a str>,
}

impl<'a> From<&'a DeckDescriptor> for DeckPayload<'a> {
    fn from(deck: &'a DeckDescriptor) -> Self {
        Self {
            name: &deck.name,
            parent_id: deck.parent_id.as_deref(),
            sort: deck.sort,
            archived: deck.archived,
            trashed: deck.trashed.as_deref(),
            show_sides: deck.show_sides,
            sort_by_direction: deck.sort_by_direction,
            review_reverse: deck.review_reverse,
            sort_by: deck.sort_by.as_deref(),
            cards_view: deck.cards_view.as_deref(),
        }
    }
}

/// `POST /cards` body
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CardPayload<'a> {
    pub content: String,
    #[serde(rename = "deck-id")]
    pub deck_id: &'a str,
}

impl<'a> From<&'a NewCard> for CardPayload<'a> {
    fn from(card: &'a NewCard) -> Self {
        Self {
            content: format!("{}{}{}", card.front, SIDE_SEPARATOR, card.back),
            deck_id: &card.deck_id,
        }
    }
}
