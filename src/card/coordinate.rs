// src/card/coordinate.rs

use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;

/// Row letters in grid order.
pub const ROWS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

/// Number of columns per row, numbered from 1.
pub const COLUMNS: u8 = 8;

/// A validated cell address on a token card.
///
/// The textual form is `<column><row>`, e.g. `"7G"` for column 7 of row G.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    column: u8,
    row: char,
}

impl Coordinate {
    pub fn new(column: u8, row: char) -> Result<Self, ValidationError> {
        if !(1..=COLUMNS).contains(&column) {
            return Err(ValidationError::ColumnOutOfRange(column.to_string()));
        }
        if !ROWS.contains(&row) {
            return Err(ValidationError::RowOutOfRange(row));
        }
        Ok(Self { column, row })
    }

    /// Column number, 1 through 8.
    pub fn column(&self) -> u8 {
        self.column
    }

    /// Row letter, `'A'` through `'H'`.
    pub fn row(&self) -> char {
        self.row
    }

    pub(crate) fn column_index(&self) -> usize {
        usize::from(self.column - 1)
    }

    pub(crate) fn row_index(&self) -> usize {
        // `row` is validated against ROWS at construction.
        ROWS.iter().position(|r| *r == self.row).unwrap_or(0)
    }

    /// Every coordinate on a card, row by row.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        ROWS.into_iter()
            .flat_map(|row| (1..=COLUMNS).map(move |column| Coordinate { column, row }))
    }
}

impl FromStr for Coordinate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 2 {
            return Err(ValidationError::BadLength(chars.len()));
        }

        let (column_char, row) = (chars[0], chars[1]);
        let column = column_char
            .to_digit(10)
            .filter(|d| (1..=u32::from(COLUMNS)).contains(d))
            .ok_or_else(|| ValidationError::ColumnOutOfRange(column_char.to_string()))?;

        if !ROWS.contains(&row) {
            return Err(ValidationError::RowOutOfRange(row));
        }

        Ok(Self {
            column: column as u8,
            row,
        })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}
