//! In-memory [`ChatApi`] for unit tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ApiError, ChatApi, ChatId, DocumentItem, MessageId, SetDescriptor};

/// Records every call; failures are switched on per field.
#[derive(Debug, Default)]
pub(crate) struct FakeChatApi {
    pub(crate) set: Option<SetDescriptor>,
    /// File ids whose download always fails with a permanent error.
    pub(crate) failing_downloads: HashSet<String>,
    /// File ids whose download fails with a 503 this many times before succeeding.
    pub(crate) transient_failures: HashMap<String, u32>,
    pub(crate) fail_edits: bool,
    pub(crate) fail_send_document: bool,
    pub(crate) sent: Mutex<Vec<String>>,
    pub(crate) edits: Mutex<Vec<(MessageId, String)>>,
    pub(crate) documents: Mutex<Vec<(PathBuf, String)>>,
    pub(crate) attempts: Mutex<HashMap<String, u32>>,
}

#[allow(clippy::unwrap_used)]
impl FakeChatApi {
    pub(crate) fn sent_messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn edits(&self) -> Vec<String> {
        self.edits.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }

    pub(crate) fn edited_message_ids(&self) -> Vec<MessageId> {
        self.edits.lock().unwrap().iter().map(|(id, _)| *id).collect()
    }

    pub(crate) fn sent_documents(&self) -> Vec<(PathBuf, String)> {
        self.documents.lock().unwrap().clone()
    }

    pub(crate) fn download_attempts(&self, file_id: &str) -> u32 {
        self.attempts.lock().unwrap().get(file_id).copied().unwrap_or(0)
    }
}

#[async_trait]
#[allow(clippy::unwrap_used)]
impl ChatApi for FakeChatApi {
    async fn sticker_set(&self, _name: &str) -> Result<Option<SetDescriptor>, ApiError> {
        Ok(self.set.clone())
    }

    async fn download_document(
        &self,
        document: &DocumentItem,
        dest: &Path,
    ) -> Result<u64, ApiError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let entry = attempts.entry(document.file_id.clone()).or_insert(0);
            *entry += 1;
            *entry
        };
        if self.failing_downloads.contains(&document.file_id) {
            return Err(ApiError::api("getFile", 400, "Bad Request: wrong file_id"));
        }
        if let Some(&failures) = self.transient_failures.get(&document.file_id)
            && attempt <= failures
        {
            return Err(ApiError::http_status("file", 503));
        }
        let body = format!("sticker {}", document.file_id);
        tokio::fs::write(dest, &body)
            .await
            .map_err(|e| ApiError::io(dest, e))?;
        Ok(body.len() as u64)
    }

    async fn send_message(&self, _chat: ChatId, text: &str) -> Result<MessageId, ApiError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(text.to_string());
        Ok(MessageId(i64::try_from(sent.len()).unwrap_or(i64::MAX)))
    }

    async fn edit_message_text(
        &self,
        _chat: ChatId,
        message: MessageId,
        text: &str,
    ) -> Result<(), ApiError> {
        if self.fail_edits {
            return Err(ApiError::api("editMessageText", 400, "Bad Request: chat not found"));
        }
        self.edits.lock().unwrap().push((message, text.to_string()));
        Ok(())
    }

    async fn send_document(
        &self,
        _chat: ChatId,
        path: &Path,
        caption: &str,
    ) -> Result<(), ApiError> {
        if self.fail_send_document {
            return Err(ApiError::api("sendDocument", 413, "Request Entity Too Large"));
        }
        self.documents
            .lock()
            .unwrap()
            .push((path.to_path_buf(), caption.to_string()));
        Ok(())
    }
}
