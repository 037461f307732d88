//! Input parsing for sticker pack links.
//!
//! Turns free-form chat text into a validated [`PackIdentifier`].
//!
//! # Example
//!
//! ```
//! use stickerbot_core::parser::{PackIdentifier, extract_pack_id};
//!
//! let id = extract_pack_id("https://t.me/addstickers/Animals").unwrap();
//! assert_eq!(id, PackIdentifier::new("Animals").unwrap());
//! ```

mod error;
mod link;

pub use error::ParseError;
pub use link::{extract_pack_id, mentions_pack_link};

use std::fmt;

/// Short name uniquely identifying a sticker pack on the platform.
///
/// Always non-empty and restricted to `[a-zA-Z0-9_]`, which also makes it
/// safe to use as a path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackIdentifier(String);

impl PackIdentifier {
    /// Validates and wraps a pack short name.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Empty`] for an empty string and
    /// [`ParseError::InvalidCharacter`] for anything outside `[a-zA-Z0-9_]`.
    pub fn new(value: impl Into<String>) -> Result<Self, ParseError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ParseError::Empty);
        }
        if let Some(bad) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(ParseError::invalid_character(&value, bad));
        }
        Ok(Self(value))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PackIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
