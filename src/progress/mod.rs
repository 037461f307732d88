//! Throttled progress reporting for sticker downloads.
//!
//! Editing a chat message is itself a network round trip, so the reporter
//! only edits the status message at milestones: the first item, every fifth
//! item, and the last item.
//!
//! # States
//!
//! ```text
//! Idle --(first event)--> Reporting --(completed == total)--> Done
//! ```

mod status;

pub use status::StatusMessage;

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::telegram::ChatApi;

/// Items between intermediate progress updates.
pub const REPORT_EVERY: usize = 5;

/// Receives a completion event after each fetch attempt, successful or not.
#[async_trait]
pub trait ProgressSink: Send {
    /// Called with the 1-based count of finished items and the batch size.
    async fn on_item_complete(&mut self, completed: usize, total: usize);
}

/// Returns true if an update should be shown after `completed` of `total` items.
#[must_use]
pub fn should_report(completed: usize, total: usize) -> bool {
    completed == 1 || completed == total || completed % REPORT_EVERY == 0
}

/// Percentage of the batch finished.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    100.0 * completed as f64 / total as f64
}

/// Status text shown for a progress milestone.
#[must_use]
pub fn progress_text(completed: usize, total: usize) -> String {
    format!(
        "Downloaded {completed}/{total} ({:.1}%)...",
        percent(completed, total)
    )
}

/// Lifecycle of a [`ProgressReporter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReporterState {
    /// No event received yet.
    Idle,
    /// At least one event received, batch not finished.
    Reporting,
    /// Final item reported.
    Done,
}

/// Progress counters for one batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressState {
    /// Items finished so far.
    pub completed: usize,
    /// Batch size.
    pub total: usize,
    /// Percentage shown by the most recent status edit.
    pub last_reported_percent: Option<f64>,
}

/// Edits the request's status message at progress milestones.
pub struct ProgressReporter<'a> {
    api: &'a dyn ChatApi,
    status: &'a StatusMessage,
    state: ReporterState,
    progress: ProgressState,
}

impl<'a> ProgressReporter<'a> {
    /// Creates an idle reporter for a batch of `total` items.
    #[must_use]
    pub fn new(api: &'a dyn ChatApi, status: &'a StatusMessage, total: usize) -> Self {
        Self {
            api,
            status,
            state: ReporterState::Idle,
            progress: ProgressState {
                completed: 0,
                total,
                last_reported_percent: None,
            },
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ReporterState {
        self.state
    }

    /// Current counters.
    #[must_use]
    pub fn progress(&self) -> ProgressState {
        self.progress
    }
}

#[async_trait]
impl ProgressSink for ProgressReporter<'_> {
    async fn on_item_complete(&mut self, completed: usize, total: usize) {
        if self.state == ReporterState::Done {
            trace!(completed, total, "event after completion ignored");
            return;
        }
        self.state = ReporterState::Reporting;
        self.progress.completed = completed;
        self.progress.total = total;

        if should_report(completed, total) {
            debug!(completed, total, "reporting progress");
            // A failed edit must not abort the batch.
            self.status
                .edit_best_effort(self.api, &progress_text(completed, total))
                .await;
            self.progress.last_reported_percent = Some(percent(completed, total));
        }

        if completed >= total {
            self.state = ReporterState::Done;
        }
    }
}
