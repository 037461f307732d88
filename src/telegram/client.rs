//! Telegram Bot API client.
//!
//! This module provides [`BotApiClient`], the production [`ChatApi`]
//! implementation. Every method except `sendDocument` is a JSON `POST`;
//! file downloads stream straight to disk.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Body, Client};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument, trace, warn};
use url::Url;

use super::types::{ApiResponse, FileWire, Message, StickerSetWire, Update, User};
use super::{ApiError, ChatApi, ChatId, DocumentItem, MessageId, SetDescriptor};
use crate::user_agent;

/// Public Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Default HTTP connect timeout (10 seconds).
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default HTTP request timeout (2 minutes, covers archive uploads).
const READ_TIMEOUT_SECS: u64 = 120;

/// Slack added on top of the long-poll timeout for `getUpdates` requests.
const LONG_POLL_SLACK_SECS: u64 = 10;

/// Description the platform returns for an unknown sticker set short name.
const STICKERSET_INVALID: &str = "STICKERSET_INVALID";

/// HTTP timeout settings for [`BotApiClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientTimeouts {
    /// Connect timeout in seconds.
    pub connect_secs: u64,
    /// Whole-request timeout in seconds (long polls get their own).
    pub read_secs: u64,
}

impl Default for ClientTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: CONNECT_TIMEOUT_SECS,
            read_secs: READ_TIMEOUT_SECS,
        }
    }
}

/// HTTP client for the Telegram Bot API.
///
/// Created once at startup and shared (it is cheap to clone and pools
/// connections). The bot token is part of every request path, so it is never
/// logged and transport errors are stored without their URL.
#[derive(Clone)]
pub struct BotApiClient {
    client: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for BotApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotApiClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl BotApiClient {
    /// Creates a client for `base_url` authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base_url` is not an http(s) URL
    /// with a host, and [`ApiError::Network`] if the HTTP client cannot be built.
    #[instrument(level = "debug", skip(token))]
    pub fn new(
        token: impl Into<String>,
        base_url: &str,
        timeouts: ClientTimeouts,
    ) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url).map_err(|_| ApiError::InvalidUrl {
            url: base_url.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host().is_none() {
            return Err(ApiError::InvalidUrl {
                url: base_url.to_string(),
            });
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.read_secs))
            .user_agent(user_agent::default_user_agent())
            .gzip(true)
            .build()
            .map_err(|e| ApiError::network("client", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.token)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{file_path}", self.base_url, self.token)
    }

    /// Returns the bot's own account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the token is rejected or the request fails.
    #[instrument(skip(self))]
    pub async fn get_me(&self) -> Result<User, ApiError> {
        self.call("getMe", &json!({}), None).await
    }

    /// Long-polls for new message updates starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the response is malformed.
    #[instrument(skip(self))]
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, ApiError> {
        let params = json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        let request_timeout = Duration::from_secs(timeout_secs + LONG_POLL_SLACK_SECS);
        self.call("getUpdates", &params, Some(request_timeout)).await
    }

    async fn call<P, T>(
        &self,
        method: &'static str,
        params: &P,
        timeout: Option<Duration>,
    ) -> Result<T, ApiError>
    where
        P: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        trace!(method, "calling bot API");
        let mut request = self.client.post(self.method_url(method)).json(params);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::network(method, e))?;
        parse_response(method, response).await
    }
}

/// Decodes the Bot API envelope, mapping `ok: false` onto [`ApiError::Api`].
async fn parse_response<T: DeserializeOwned>(
    method: &'static str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| ApiError::network(method, e))?;

    match serde_json::from_slice::<ApiResponse<T>>(&body) {
        Ok(envelope) if envelope.ok => envelope
            .result
            .ok_or_else(|| ApiError::invalid_response(method, "missing result")),
        Ok(envelope) => Err(ApiError::Api {
            method,
            code: envelope.error_code.unwrap_or_else(|| status.as_u16()),
            description: envelope.description.unwrap_or_default(),
            retry_after: envelope.parameters.and_then(|p| p.retry_after),
        }),
        Err(_) if !status.is_success() => Err(ApiError::http_status(method, status.as_u16())),
        Err(e) => Err(ApiError::invalid_response(method, e.to_string())),
    }
}

/// Streams response body to file, returning bytes written.
///
/// Extracted so the caller can remove the partial file on error.
async fn stream_to_file(
    response: reqwest::Response,
    dest: &Path,
) -> Result<u64, ApiError> {
    let file = File::create(dest)
        .await
        .map_err(|e| ApiError::io(dest, e))?;
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| ApiError::network("file", e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| ApiError::io(dest, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer.flush().await.map_err(|e| ApiError::io(dest, e))?;
    Ok(bytes_written)
}

#[async_trait]
impl ChatApi for BotApiClient {
    #[instrument(skip(self))]
    async fn sticker_set(&self, name: &str) -> Result<Option<SetDescriptor>, ApiError> {
        match self
            .call::<_, StickerSetWire>("getStickerSet", &json!({ "name": name }), None)
            .await
        {
            Ok(set) => Ok(Some(SetDescriptor::from(set))),
            Err(ApiError::Api {
                code: 400,
                description,
                ..
            }) if description.contains(STICKERSET_INVALID) => {
                debug!(name, "sticker set does not exist");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, document), fields(file_id = %document.file_id, dest = %dest.display()))]
    async fn download_document(
        &self,
        document: &DocumentItem,
        dest: &Path,
    ) -> Result<u64, ApiError> {
        let file: FileWire = self
            .call("getFile", &json!({ "file_id": document.file_id }), None)
            .await?;
        let file_path = file
            .file_path
            .ok_or_else(|| ApiError::invalid_response("getFile", "file has no download path"))?;

        let response = self
            .client
            .get(self.file_url(&file_path))
            .send()
            .await
            .map_err(|e| ApiError::network("file", e))?;
        if !response.status().is_success() {
            return Err(ApiError::http_status("file", response.status().as_u16()));
        }

        let result = stream_to_file(response, dest).await;
        if result.is_err() {
            debug!(path = %dest.display(), "cleaning up partial file after error");
            if let Err(e) = tokio::fs::remove_file(dest).await
                && e.kind() != std::io::ErrorKind::NotFound
            {
                warn!(path = %dest.display(), error = %e, "failed to remove partial file");
            }
        }
        let bytes = result?;
        debug!(bytes, "document downloaded");
        Ok(bytes)
    }

    #[instrument(skip(self, text))]
    async fn send_message(&self, chat: ChatId, text: &str) -> Result<MessageId, ApiError> {
        let message: Message = self
            .call(
                "sendMessage",
                &json!({ "chat_id": chat.0, "text": text }),
                None,
            )
            .await?;
        Ok(MessageId(message.message_id))
    }

    #[instrument(skip(self, text))]
    async fn edit_message_text(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
    ) -> Result<(), ApiError> {
        let params = json!({ "chat_id": chat.0, "message_id": message.0, "text": text });
        match self
            .call::<_, serde_json::Value>("editMessageText", &params, None)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.is_message_not_modified() => {
                trace!("status text unchanged");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, caption), fields(path = %path.display()))]
    async fn send_document(
        &self,
        chat: ChatId,
        path: &Path,
        caption: &str,
    ) -> Result<(), ApiError> {
        const METHOD: &str = "sendDocument";

        let file = File::open(path).await.map_err(|e| ApiError::io(path, e))?;
        let length = file
            .metadata()
            .await
            .map_err(|e| ApiError::io(path, e))?
            .len();
        let file_name = path
            .file_name()
            .map_or_else(|| "stickers.zip".to_string(), |n| n.to_string_lossy().into_owned());
        let part = Part::stream_with_length(Body::from(file), length)
            .file_name(file_name)
            .mime_str("application/zip")
            .map_err(|e| ApiError::network(METHOD, e))?;
        let form = Form::new()
            .text("chat_id", chat.0.to_string())
            .text("caption", caption.to_string())
            .part("document", part);

        let response = self
            .client
            .post(self.method_url(METHOD))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::network(METHOD, e))?;
        let _: Message = parse_response(METHOD, response).await?;
        debug!("archive sent");
        Ok(())
    }
}
