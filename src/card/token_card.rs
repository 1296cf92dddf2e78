// src/card/token_card.rs

use serde::{Deserialize, Serialize};

use crate::card::coordinate::{Coordinate, ROWS};
use crate::errors::ValidationError;

/// A decoded token card.
///
/// The grid is stored row-major: `grid[0]` is row A, `grid[0][0]` is the
/// token at coordinate `1A`. The shape is fixed by the type, so every card
/// has all eight rows with exactly eight tokens each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCard {
    user_id: u32,
    username: String,
    expires: String,
    grid: [[String; 8]; 8],
}

impl TokenCard {
    pub fn new(
        user_id: u32,
        username: impl Into<String>,
        expires: impl Into<String>,
        grid: [[String; 8]; 8],
    ) -> Self {
        Self {
            user_id,
            username: username.into(),
            expires: expires.into(),
            grid,
        }
    }

    pub fn user_id(&self) -> u32 {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Expiry date exactly as printed on the card.
    pub fn expires(&self) -> &str {
        &self.expires
    }

    /// The eight tokens of one row, or `None` for a letter outside A-H.
    pub fn row(&self, letter: char) -> Option<&[String; 8]> {
        ROWS.iter()
            .position(|r| *r == letter)
            .map(|idx| &self.grid[idx])
    }

    /// Look up the token for a textual coordinate such as `"7G"`.
    pub fn get_token(&self, coordinate: &str) -> Result<&str, ValidationError> {
        let coordinate: Coordinate = coordinate.parse()?;
        Ok(self.token_at(coordinate))
    }

    pub fn token_at(&self, coordinate: Coordinate) -> &str {
        &self.grid[coordinate.row_index()][coordinate.column_index()]
    }
}
