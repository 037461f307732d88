//! Sequential sticker fetcher with partial-failure tolerance.

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use super::retry::{RetryDecision, RetryPolicy, classify_error, effective_delay};
use crate::progress::ProgressSink;
use crate::resolver::{AssetItem, FetchBatch};
use crate::telegram::{ApiError, ChatApi};

/// Result of fetching one batch.
#[derive(Debug)]
pub struct FetchReport {
    /// The batch, with `local_path` set on every item that was fetched.
    pub batch: FetchBatch,
    /// Items written to disk.
    pub succeeded: usize,
    /// Items that failed after all attempts.
    pub failed: usize,
    /// Retry attempts made across the batch.
    pub retried: usize,
}

/// Downloads every item of `batch` into `work_dir`, one at a time, in pack order.
///
/// A failing item is logged and skipped; it never aborts the batch. After
/// each item, successful or not, `sink` receives `(position, total)`.
#[instrument(skip(api, batch, policy, sink), fields(pack = %batch.pack_id(), items = batch.len()))]
pub async fn fetch_all(
    api: &dyn ChatApi,
    mut batch: FetchBatch,
    work_dir: &Path,
    policy: &RetryPolicy,
    sink: &mut dyn ProgressSink,
) -> FetchReport {
    let pack_id = batch.pack_id().clone();
    let total = batch.len();
    let mut succeeded = 0;
    let mut failed = 0;
    let mut retried = 0;

    for (position, item) in batch.items_mut().iter_mut().enumerate() {
        let dest = work_dir.join(item.file_name(&pack_id));
        match fetch_with_retry(api, item, &dest, policy, &mut retried).await {
            Ok(bytes) => {
                debug!(
                    index = item.index,
                    bytes,
                    expected_bytes = item.document.file_size,
                    path = %dest.display(),
                    "sticker saved"
                );
                item.local_path = Some(dest);
                succeeded += 1;
            }
            Err((e, attempts)) => {
                warn!(
                    index = item.index,
                    file_id = %item.document.file_id,
                    file_unique_id = %item.document.file_unique_id,
                    attempts,
                    error = %e,
                    "sticker download failed, skipping"
                );
                failed += 1;
            }
        }
        sink.on_item_complete(position + 1, total).await;
    }

    info!(succeeded, failed, retried, "batch fetch finished");
    FetchReport {
        batch,
        succeeded,
        failed,
        retried,
    }
}

async fn fetch_with_retry(
    api: &dyn ChatApi,
    item: &AssetItem,
    dest: &Path,
    policy: &RetryPolicy,
    retried: &mut usize,
) -> Result<u64, (ApiError, u32)> {
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match api.download_document(&item.document, dest).await {
            Ok(bytes) => return Ok(bytes),
            Err(e) => match policy.should_retry(classify_error(&e), attempt) {
                RetryDecision::Retry {
                    delay,
                    attempt: next_attempt,
                } => {
                    let delay = effective_delay(&e, delay);
                    info!(
                        index = item.index,
                        attempt = next_attempt,
                        max_attempts = policy.max_attempts(),
                        delay_ms = delay.as_millis(),
                        error = %e,
                        "retrying sticker download"
                    );
                    *retried += 1;
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::DoNotRetry { reason } => {
                    debug!(index = item.index, %reason, "not retrying sticker download");
                    return Err((e, attempt));
                }
            },
        }
    }
}
