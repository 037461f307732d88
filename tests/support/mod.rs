//! Shared helpers for integration tests: a scripted in-memory chat platform.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use stickerbot_core::telegram::{
    ANIMATED_STICKER_MIME, ApiError, ChatApi, ChatId, DocumentItem, MessageId,
    STATIC_STICKER_MIME, SetDescriptor, VIDEO_STICKER_MIME,
};

/// What the fake does when asked to download a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadMode {
    /// Write the sticker bytes.
    #[default]
    Write,
    /// Report success without writing anything.
    Phantom,
}

/// Scripted [`ChatApi`] that records every interaction.
#[derive(Debug, Default)]
pub struct ScriptedChat {
    pub set: Option<SetDescriptor>,
    pub lookup_error: bool,
    pub failing: HashSet<String>,
    pub download_mode: DownloadMode,
    pub fail_upload: bool,
    messages: Mutex<Vec<String>>,
    edits: Mutex<Vec<String>>,
    uploads: Mutex<Vec<Upload>>,
}

/// A recorded `send_document` call.
#[derive(Debug, Clone)]
pub struct Upload {
    pub chat: ChatId,
    pub caption: String,
    /// Entry names of the archive as it existed at upload time.
    pub entries: Vec<String>,
}

impl ScriptedChat {
    pub fn with_set(set: SetDescriptor) -> Self {
        Self {
            set: Some(set),
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("lock").clone()
    }

    pub fn edits(&self) -> Vec<String> {
        self.edits.lock().expect("lock").clone()
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ChatApi for ScriptedChat {
    async fn sticker_set(&self, _name: &str) -> Result<Option<SetDescriptor>, ApiError> {
        if self.lookup_error {
            return Err(ApiError::http_status("getStickerSet", 502));
        }
        Ok(self.set.clone())
    }

    async fn download_document(
        &self,
        document: &DocumentItem,
        dest: &Path,
    ) -> Result<u64, ApiError> {
        if self.failing.contains(&document.file_id) {
            return Err(ApiError::api("getFile", 400, "Bad Request: invalid file_id"));
        }
        let body = format!("{} bytes of {}", document.mime_type, document.file_id);
        if self.download_mode == DownloadMode::Write {
            std::fs::write(dest, &body).map_err(|e| ApiError::io(dest, e))?;
        }
        Ok(body.len() as u64)
    }

    async fn send_message(&self, _chat: ChatId, text: &str) -> Result<MessageId, ApiError> {
        let mut messages = self.messages.lock().expect("lock");
        messages.push(text.to_string());
        Ok(MessageId(messages.len() as i64))
    }

    async fn edit_message_text(
        &self,
        _chat: ChatId,
        _message: MessageId,
        text: &str,
    ) -> Result<(), ApiError> {
        self.edits.lock().expect("lock").push(text.to_string());
        Ok(())
    }

    async fn send_document(
        &self,
        chat: ChatId,
        path: &Path,
        caption: &str,
    ) -> Result<(), ApiError> {
        if self.fail_upload {
            return Err(ApiError::api("sendDocument", 413, "Request Entity Too Large"));
        }
        let file = std::fs::File::open(path).map_err(|e| ApiError::io(path, e))?;
        let archive = zip::ZipArchive::new(file)
            .map_err(|e| ApiError::invalid_response("sendDocument", e.to_string()))?;
        let mut entries: Vec<String> = archive.file_names().map(str::to_string).collect();
        entries.sort();
        self.uploads.lock().expect("lock").push(Upload {
            chat,
            caption: caption.to_string(),
            entries,
        });
        Ok(())
    }
}

/// A set named `name` with `count` stickers cycling through static, animated and video.
pub fn sticker_set(name: &str, count: usize) -> SetDescriptor {
    let mimes = [STATIC_STICKER_MIME, ANIMATED_STICKER_MIME, VIDEO_STICKER_MIME];
    SetDescriptor {
        name: name.to_string(),
        title: format!("{name} pack"),
        documents: (1..=count)
            .map(|i| DocumentItem {
                file_id: format!("file-{i}"),
                file_unique_id: format!("uniq-{i}"),
                mime_type: mimes[(i - 1) % mimes.len()].to_string(),
                file_size: Some(1024),
            })
            .collect(),
    }
}

/// Number of entries directly under `dir`.
pub fn entry_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(Iterator::count).unwrap_or(0)
}
