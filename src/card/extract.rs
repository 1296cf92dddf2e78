// src/card/extract.rs

//! Decoding a token card from extracted document text.
//!
//! The text looks like this (one card per page):
//!
//! ```text
//! Test Peter Testesen (14567) | Expires: Feb 28, 2025
//! 1 2 3 4 5 6 7 8
//! A iuh7 9iik lkmd ssuu sbna wyyh mkki aayh
//! B nnhs yyhh aamj wpod mcjy aakl qldo siah
//! ...
//! H am12 lw92 ie7x m7tg 9hg6 7gbc cu72 si82
//! ```
//!
//! Getting text out of the PDF is someone else's job; this module only
//! sees the resulting string.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::card::coordinate::ROWS;
use crate::card::token_card::TokenCard;
use crate::errors::ParseError;

fn owner_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*(?P<name>.+?)\s*\((?P<id>\d+)\)\s*\|\s*Expires:\s*(?P<expires>.*?)\s*$")
            .expect("owner line regex is valid")
    })
}

/// Decode a [`TokenCard`] from raw text.
///
/// Fails with [`ParseError::MalformedCard`] when the owner line is missing or
/// when any row A-H is missing or has fewer than eight tokens. Extra tokens
/// after the eighth are ignored.
pub fn extract_token_card(raw: &str) -> Result<TokenCard, ParseError> {
    let owner = owner_line_regex()
        .captures(raw)
        .ok_or_else(|| ParseError::MalformedCard("missing '<name> (<id>) | Expires: <date>' line".to_string()))?;

    let username = owner["name"].to_string();
    let user_id: u32 = owner["id"]
        .parse()
        .map_err(|e| ParseError::MalformedCard(format!("invalid user id '{}': {e}", &owner["id"])))?;
    let expires = owner["expires"].to_string();

    let mut grid: Vec<[String; 8]> = Vec::with_capacity(ROWS.len());
    for letter in ROWS {
        grid.push(extract_row(raw, letter)?);
    }

    let grid: [[String; 8]; 8] = grid
        .try_into()
        .map_err(|_| ParseError::MalformedCard("expected exactly 8 rows".to_string()))?;

    debug!(user_id, username = %username, "decoded token card");
    Ok(TokenCard::new(user_id, username, expires, grid))
}

/// Find the first line whose leading word is `letter` and return the eight
/// tokens that follow it.
fn extract_row(raw: &str, letter: char) -> Result<[String; 8], ParseError> {
    let mut marker = [0u8; 4];
    let marker: &str = letter.encode_utf8(&mut marker);

    let tokens: Vec<String> = raw
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .find(|words| words.first() == Some(&marker))
        .ok_or_else(|| ParseError::MalformedCard(format!("row {letter} is missing")))?
        .into_iter()
        .skip(1)
        .take(8)
        .map(str::to_string)
        .collect();

    let found = tokens.len();
    tokens.try_into().map_err(|_| {
        ParseError::MalformedCard(format!("row {letter} has {found} tokens, expected 8"))
    })
}
