//! Sticker download stage.
//!
//! Fetches the items of a [`FetchBatch`](crate::resolver::FetchBatch) one at a
//! time through the injected [`ChatApi`](crate::telegram::ChatApi), retrying
//! transient failures with exponential backoff and skipping items that still
//! fail. Every item produces a progress event.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use stickerbot_core::download::{RetryPolicy, fetch_all};
//! use stickerbot_core::progress::ProgressSink;
//! use stickerbot_core::resolver::FetchBatch;
//! use stickerbot_core::telegram::ChatApi;
//!
//! # async fn example(api: &dyn ChatApi, batch: FetchBatch, sink: &mut dyn ProgressSink) {
//! let report = fetch_all(api, batch, Path::new("./stickers/Animals"), &RetryPolicy::default(), sink).await;
//! println!("{} fetched, {} failed", report.succeeded, report.failed);
//! # }
//! ```

mod fetcher;
mod retry;

pub use fetcher::{FetchReport, fetch_all};
pub use retry::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_RETRIES, FailureType, RetryDecision, RetryPolicy,
    classify_error, effective_delay,
};
