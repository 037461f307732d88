//! Sticker pack link extraction from free-form message text.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use super::PackIdentifier;

/// Regex pattern for sticker pack links embedded in text.
///
/// The `t.me/addstickers/` alternative already covers the `https://` form and
/// any other scheme prefix; the explicit alternative documents the canonical link.
/// Case folding is scoped to the prefix so the token class stays ASCII-only.
#[allow(clippy::expect_used)]
static PACK_LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:https://t\.me/addstickers/|t\.me/addstickers/)([a-zA-Z0-9_]+)")
        .expect("pack link regex is valid") // Static pattern, safe to panic
});

/// Link prefix alone, used to decide whether a message is meant for the bot.
#[allow(clippy::expect_used)]
static PACK_LINK_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)t\.me/addstickers/").expect("pack link prefix regex is valid") // Static pattern, safe to panic
});

/// Returns true if `text` contains a sticker pack link prefix, valid token or not.
///
/// Messages without the prefix are ordinary chatter and get no reply.
#[must_use]
pub fn mentions_pack_link(text: &str) -> bool {
    PACK_LINK_PREFIX.is_match(text)
}

/// Extracts the pack identifier from the first sticker pack link in `text`.
///
/// Matching is case-insensitive on the link prefix; the identifier keeps the
/// casing the user sent. Returns `None` when no link is present, which callers
/// report as an invalid link rather than a fault.
///
/// # Examples
///
/// ```
/// use stickerbot_core::parser::extract_pack_id;
///
/// let id = extract_pack_id("check t.me/addstickers/Animals out").unwrap();
/// assert_eq!(id.as_str(), "Animals");
/// assert!(extract_pack_id("no link here").is_none());
/// ```
#[tracing::instrument(skip(text), fields(text_len = text.len()))]
#[must_use]
pub fn extract_pack_id(text: &str) -> Option<PackIdentifier> {
    let Some(captures) = PACK_LINK_PATTERN.captures(text) else {
        trace!("no pack link in text");
        return None;
    };
    let token = captures.get(1)?.as_str();
    debug!(pack = token, "found pack link");
    // The capture group only admits identifier characters.
    PackIdentifier::new(token).ok()
}
