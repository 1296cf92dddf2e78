// src/card/mod.rs

//! Token cards.
//!
//! A token card is an 8x8 grid of short strings printed on a document the
//! user receives from the upload service. During login the external tool asks
//! for the token at one coordinate and we answer from the decoded card.
//!
//! - [`coordinate`] parses and validates the `<column><row>` form (`"7G"`).
//! - [`token_card`] is the immutable decoded card and its lookups.
//! - [`extract`] decodes a card from text already extracted from the document.

pub mod coordinate;
pub mod extract;
pub mod token_card;

pub use coordinate::{Coordinate, COLUMNS, ROWS};
pub use extract::extract_token_card;
pub use token_card::TokenCard;
