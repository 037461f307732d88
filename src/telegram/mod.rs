//! Chat platform boundary.
//!
//! The pipeline never talks to the platform directly. It receives an
//! injected [`ChatApi`] capability, which production code backs with
//! [`BotApiClient`] (the Telegram Bot HTTP API) and tests back with fakes.
//!
//! Remote responses are converted into [`SetDescriptor`] / [`DocumentItem`]
//! as soon as they arrive, so nothing past this module depends on the wire
//! format.

mod client;
mod error;
#[cfg(test)]
pub(crate) mod fake;
mod types;

pub use client::{BotApiClient, ClientTimeouts, DEFAULT_API_URL};
pub use error::ApiError;
pub use types::{
    ANIMATED_STICKER_MIME, Chat, Message, STATIC_STICKER_MIME, Update, User, VIDEO_STICKER_MIME,
};

use std::fmt;
use std::path::Path;

use async_trait::async_trait;

/// Opaque chat identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a message within a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One downloadable member of a sticker set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentItem {
    /// Handle used to download the file.
    pub file_id: String,
    /// Stable identifier across bots.
    pub file_unique_id: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Size in bytes, when the platform reports it.
    pub file_size: Option<u64>,
}

/// A resolved sticker set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDescriptor {
    /// Short name.
    pub name: String,
    /// Display title.
    pub title: String,
    /// Member documents in pack order.
    pub documents: Vec<DocumentItem>,
}

/// Platform operations the sticker pipeline depends on.
///
/// # Object Safety
///
/// Uses `async_trait` so the capability can be shared as `Arc<dyn ChatApi>`
/// across request tasks.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Looks up a sticker set by short name.
    ///
    /// Returns `Ok(None)` when the platform reports that no such set exists.
    async fn sticker_set(&self, name: &str) -> Result<Option<SetDescriptor>, ApiError>;

    /// Downloads a document to `dest`, returning the number of bytes written.
    async fn download_document(&self, document: &DocumentItem, dest: &Path)
    -> Result<u64, ApiError>;

    /// Sends a new text message.
    async fn send_message(&self, chat: ChatId, text: &str) -> Result<MessageId, ApiError>;

    /// Replaces the text of a previously sent message.
    async fn edit_message_text(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
    ) -> Result<(), ApiError>;

    /// Uploads a file to the chat with a caption.
    async fn send_document(&self, chat: ChatId, path: &Path, caption: &str)
    -> Result<(), ApiError>;
}
