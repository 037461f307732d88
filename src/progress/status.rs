//! The single status message edited in place while a request runs.

use tracing::{instrument, warn};

use crate::telegram::{ApiError, ChatApi, ChatId, MessageId};

/// Handle to the status message of one request.
///
/// Created once when handling starts; every later update edits the same
/// message instead of posting a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMessage {
    chat: ChatId,
    message: MessageId,
}

impl StatusMessage {
    /// Posts the initial status text and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the message cannot be sent.
    #[instrument(skip(api, text))]
    pub async fn open(api: &dyn ChatApi, chat: ChatId, text: &str) -> Result<Self, ApiError> {
        let message = api.send_message(chat, text).await?;
        Ok(Self { chat, message })
    }

    /// Chat the message lives in.
    #[must_use]
    pub fn chat(&self) -> ChatId {
        self.chat
    }

    /// Message identifier.
    #[must_use]
    pub fn message_id(&self) -> MessageId {
        self.message
    }

    /// Replaces the status text.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the edit is rejected.
    pub async fn edit(&self, api: &dyn ChatApi, text: &str) -> Result<(), ApiError> {
        api.edit_message_text(self.chat, self.message, text).await
    }

    /// Replaces the status text, logging instead of failing.
    pub async fn edit_best_effort(&self, api: &dyn ChatApi, text: &str) {
        if let Err(e) = self.edit(api, text).await {
            warn!(chat = %self.chat, message = %self.message, error = %e, "status update failed");
        }
    }
}
