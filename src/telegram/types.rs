//! Bot API wire types.
//!
//! Only the fields this bot reads are modelled; serde ignores the rest.

use serde::Deserialize;

use super::{DocumentItem, SetDescriptor};

/// MIME type the platform uses for animated (Lottie) stickers.
pub const ANIMATED_STICKER_MIME: &str = "application/x-tgsticker";
/// MIME type of video stickers.
pub const VIDEO_STICKER_MIME: &str = "video/webm";
/// MIME type of static stickers.
pub const STATIC_STICKER_MIME: &str = "image/webp";

/// Envelope returned by every Bot API method.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub(crate) ok: bool,
    pub(crate) result: Option<T>,
    pub(crate) description: Option<String>,
    pub(crate) error_code: Option<u16>,
    pub(crate) parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseParameters {
    pub(crate) retry_after: Option<u64>,
}

/// An incoming update from `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update identifier used to advance the polling offset.
    pub update_id: i64,
    /// New incoming message, if this update carries one.
    pub message: Option<Message>,
}

/// A chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    /// Identifier unique within the chat.
    pub message_id: i64,
    /// Chat the message belongs to.
    pub chat: Chat,
    /// Sender, absent for channel posts.
    pub from: Option<User>,
    /// Text content, absent for media messages.
    pub text: Option<String>,
}

/// A chat.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    /// Chat identifier.
    pub id: i64,
}

/// A user or bot account.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Account identifier.
    pub id: i64,
    /// Whether the account is a bot.
    #[serde(default)]
    pub is_bot: bool,
    /// Public username, without the `@`.
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StickerSetWire {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) stickers: Vec<StickerWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StickerWire {
    pub(crate) file_id: String,
    #[serde(default)]
    pub(crate) file_unique_id: String,
    #[serde(default)]
    pub(crate) is_animated: bool,
    #[serde(default)]
    pub(crate) is_video: bool,
    pub(crate) file_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileWire {
    pub(crate) file_path: Option<String>,
}

impl StickerWire {
    /// Stickers carry format flags instead of a MIME type; map them onto one.
    fn mime_type(&self) -> &'static str {
        if self.is_animated {
            ANIMATED_STICKER_MIME
        } else if self.is_video {
            VIDEO_STICKER_MIME
        } else {
            STATIC_STICKER_MIME
        }
    }
}

impl From<StickerWire> for DocumentItem {
    fn from(sticker: StickerWire) -> Self {
        let mime_type = sticker.mime_type().to_string();
        Self {
            file_id: sticker.file_id,
            file_unique_id: sticker.file_unique_id,
            mime_type,
            file_size: sticker.file_size,
        }
    }
}

impl From<StickerSetWire> for SetDescriptor {
    fn from(set: StickerSetWire) -> Self {
        Self {
            name: set.name,
            title: set.title,
            documents: set.stickers.into_iter().map(DocumentItem::from).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sticker_set_wire_converts_flags_to_mime_types() {
        let json = r#"{
            "name": "Animals",
            "title": "Animals",
            "sticker_type": "regular",
            "stickers": [
                {"file_id": "a", "file_unique_id": "ua", "is_animated": true, "is_video": false, "type": "regular", "width": 512, "height": 512},
                {"file_id": "v", "file_unique_id": "uv", "is_animated": false, "is_video": true, "file_size": 1024},
                {"file_id": "s", "file_unique_id": "us", "is_animated": false, "is_video": false}
            ]
        }"#;
        let wire: StickerSetWire = serde_json::from_str(json).unwrap();
        let set = SetDescriptor::from(wire);

        assert_eq!(set.name, "Animals");
        let mimes: Vec<_> = set.documents.iter().map(|d| d.mime_type.as_str()).collect();
        assert_eq!(mimes, [ANIMATED_STICKER_MIME, VIDEO_STICKER_MIME, STATIC_STICKER_MIME]);
        assert_eq!(set.documents[1].file_size, Some(1024));
    }

    #[test]
    fn test_sticker_set_wire_without_stickers_field_is_empty() {
        let wire: StickerSetWire = serde_json::from_str(r#"{"name": "Empty"}"#).unwrap();
        assert!(SetDescriptor::from(wire).documents.is_empty());
    }

    #[test]
    fn test_api_response_error_envelope() {
        let json = r#"{"ok": false, "error_code": 429, "description": "Too Many Requests: retry after 5", "parameters": {"retry_after": 5}}"#;
        let resp: ApiResponse<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert!(!resp.ok);
        assert_eq!(resp.error_code, Some(429));
        assert_eq!(resp.parameters.unwrap().retry_after, Some(5));
    }

    #[test]
    fn test_update_with_text_message() {
        let json = r#"{"update_id": 10, "message": {"message_id": 7, "date": 0, "chat": {"id": 42, "type": "private"}, "from": {"id": 1, "is_bot": false, "first_name": "A"}, "text": "/ping"}}"#;
        let update: Update = serde_json::from_str(json).unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 42);
        assert_eq!(message.from.map(|user| user.id), Some(1));
        assert_eq!(message.text.as_deref(), Some("/ping"));
    }
}
