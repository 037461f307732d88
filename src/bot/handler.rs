//! End-to-end handling of one sticker pack request.
//!
//! ```text
//! extract link -> resolve -> fetch (with progress) -> archive -> deliver
//!                                 \__________ workspace cleanup __________/
//! ```
//!
//! Every stage reports through a single status message. Once a workspace
//! exists it is removed on every path out of the handler.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::archive::{ArchiveError, archive};
use crate::delivery::{PackLocks, WorkspaceGuard, caption, deliver};
use crate::download::{RetryPolicy, fetch_all};
use crate::parser::{PackIdentifier, extract_pack_id};
use crate::progress::{ProgressReporter, StatusMessage};
use crate::resolver::{FetchBatch, Resolution, resolve};
use crate::telegram::{ApiError, ChatApi, ChatId};

/// Initial status text.
pub const PROCESSING_TEXT: &str = "Processing your sticker pack request...";
/// Shown when the message has no sticker pack link.
pub const INVALID_LINK_TEXT: &str =
    "Invalid sticker pack link. Please send a valid t.me/addstickers/... link.";
/// Shown when the pack does not exist or has no stickers.
pub const NOT_FOUND_TEXT: &str =
    "Could not find that sticker pack or it's empty. Please check the link and try again.";
/// Shown when no sticker could be archived.
pub const ARCHIVE_FAILED_TEXT: &str =
    "Failed to create the sticker pack archive. No stickers could be downloaded.";
/// Final status after delivery.
pub const DONE_TEXT: &str = "Done! All stickers have been downloaded and sent.";

fn found_text(pack_id: &PackIdentifier) -> String {
    format!("Found sticker pack: {pack_id}\nDownloading stickers...")
}

fn downloading_text(count: usize, pack_id: &PackIdentifier) -> String {
    format!("Downloading {count} stickers from pack '{pack_id}'...")
}

fn sending_text(pack_id: &PackIdentifier) -> String {
    format!("Sending sticker pack archive for '{pack_id}'...")
}

/// An inbound message treated as a pack request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackRequest {
    /// Full message text.
    pub raw_text: String,
    /// Chat to answer in.
    pub chat_id: ChatId,
}

/// How a request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackOutcome {
    /// No sticker pack link in the message.
    InvalidLink,
    /// Pack does not exist or is empty.
    NotFound,
    /// Every download failed, so there was nothing to archive.
    NothingDownloaded,
    /// Archive sent with this many stickers.
    Delivered {
        /// Entries in the delivered archive.
        items: usize,
    },
    /// An unexpected error ended the request.
    Failed(String),
}

/// Errors that abort a request after the pack was found.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The per-request directory could not be prepared.
    #[error("failed to prepare workspace {path}: {source}")]
    Workspace {
        /// Directory being prepared.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Archive creation failed for a reason other than missing input.
    #[error("{0}")]
    Archive(#[source] ArchiveError),

    /// The archive could not be sent.
    #[error("failed to send archive: {0}")]
    Delivery(#[source] ApiError),

    /// The initial status message could not be posted.
    #[error("failed to post status message: {0}")]
    Status(#[source] ApiError),
}

/// Runs sticker pack requests against an injected [`ChatApi`].
pub struct PackHandler {
    api: Arc<dyn ChatApi>,
    work_root: PathBuf,
    retry_policy: RetryPolicy,
    locks: PackLocks,
}

impl PackHandler {
    /// Creates a handler writing under `work_root`.
    #[must_use]
    pub fn new(api: Arc<dyn ChatApi>, work_root: PathBuf, retry_policy: RetryPolicy) -> Self {
        Self {
            api,
            work_root,
            retry_policy,
            locks: PackLocks::new(),
        }
    }

    /// Handles one request to completion.
    ///
    /// Never fails: every error is logged and reported to the chat.
    #[instrument(skip(self, request), fields(chat = %request.chat_id))]
    pub async fn handle(&self, request: &PackRequest) -> PackOutcome {
        let api = self.api.as_ref();
        let chat = request.chat_id;

        let status = match StatusMessage::open(api, chat, PROCESSING_TEXT).await {
            Ok(status) => status,
            Err(e) => {
                let e = PipelineError::Status(e);
                error!(error = %e, "cannot start request");
                self.notify_unexpected(chat, &e).await;
                return PackOutcome::Failed(e.to_string());
            }
        };

        let Some(pack_id) = extract_pack_id(&request.raw_text) else {
            debug!("no sticker pack link in message");
            status.edit_best_effort(api, INVALID_LINK_TEXT).await;
            return PackOutcome::InvalidLink;
        };
        status.edit_best_effort(api, &found_text(&pack_id)).await;

        let _lease = self.locks.acquire(&pack_id).await;

        let batch = match resolve(api, &pack_id).await {
            Resolution::Found(batch) => batch,
            Resolution::NotFound | Resolution::Empty => {
                status.edit_best_effort(api, NOT_FOUND_TEXT).await;
                return PackOutcome::NotFound;
            }
        };

        match self.run_pipeline(&status, &pack_id, batch).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(pack = %pack_id, error = %e, "error processing sticker pack");
                let text = format!("Error processing sticker pack: {e}");
                if let Err(edit_error) = status.edit(api, &text).await {
                    warn!(error = %edit_error, "failed to report error on status message");
                    self.notify_unexpected(chat, &e).await;
                }
                PackOutcome::Failed(e.to_string())
            }
        }
    }

    /// Fetch, archive and deliver; the workspace is removed on every return.
    async fn run_pipeline(
        &self,
        status: &StatusMessage,
        pack_id: &PackIdentifier,
        batch: FetchBatch,
    ) -> Result<PackOutcome, PipelineError> {
        let api = self.api.as_ref();
        let workspace = WorkspaceGuard::prepare(&self.work_root, pack_id)
            .await
            .map_err(|source| PipelineError::Workspace {
                path: self.work_root.join(pack_id.as_str()),
                source,
            })?;

        let total = batch.len();
        status
            .edit_best_effort(api, &downloading_text(total, pack_id))
            .await;

        let mut reporter = ProgressReporter::new(api, status, total);
        let report = fetch_all(
            api,
            batch,
            workspace.pack_dir(),
            &self.retry_policy,
            &mut reporter,
        )
        .await;

        let archived = match archive(&report.batch, workspace.archive_path()).await {
            Ok(archived) => archived,
            Err(e @ (ArchiveError::Empty | ArchiveError::Missing { .. })) => {
                warn!(pack = %pack_id, error = %e, "nothing to deliver");
                status.edit_best_effort(api, ARCHIVE_FAILED_TEXT).await;
                workspace.cleanup().await;
                return Ok(PackOutcome::NothingDownloaded);
            }
            Err(e) => return Err(PipelineError::Archive(e)),
        };

        status.edit_best_effort(api, &sending_text(pack_id)).await;
        deliver(
            api,
            status.chat(),
            &archived.path,
            &caption(pack_id.as_str(), archived.item_count),
        )
        .await
        .map_err(PipelineError::Delivery)?;
        status.edit_best_effort(api, DONE_TEXT).await;

        workspace.cleanup().await;
        info!(
            pack = %pack_id,
            items = archived.item_count,
            failed = report.failed,
            "sticker pack delivered"
        );
        Ok(PackOutcome::Delivered {
            items: archived.item_count,
        })
    }

    async fn notify_unexpected(&self, chat: ChatId, e: &PipelineError) {
        let text = format!("An unexpected error occurred: {e}");
        if let Err(send_error) = self.api.send_message(chat, &text).await {
            debug!(error = %send_error, "fallback error message not sent");
        }
    }
}
