//! Error types for pack identifier parsing.

use thiserror::Error;

/// Errors that can occur when building a [`PackIdentifier`](super::PackIdentifier).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Identifier is empty.
    #[error("pack identifier is empty\n  Suggestion: Send a link like t.me/addstickers/packname")]
    Empty,

    /// Identifier contains a character outside `[a-zA-Z0-9_]`.
    #[error("invalid pack identifier '{value}': character '{character}' is not allowed")]
    InvalidCharacter {
        /// The rejected identifier
        value: String,
        /// First offending character
        character: char,
    },
}

impl ParseError {
    /// Creates an `InvalidCharacter` error.
    #[must_use]
    pub fn invalid_character(value: &str, character: char) -> Self {
        Self::InvalidCharacter {
            value: value.to_string(),
            character,
        }
    }
}
