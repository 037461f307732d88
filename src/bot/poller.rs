//! Long-polling update loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use super::{PackHandler, dispatch};
use crate::telegram::BotApiClient;

/// Default wait after a failed `getUpdates` call.
const DEFAULT_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Polling loop settings.
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Long-poll timeout passed to `getUpdates`, in seconds.
    pub poll_timeout_secs: u64,
    /// How long in-flight requests may run after shutdown is requested.
    pub shutdown_grace: Duration,
    /// Wait after a failed `getUpdates` call.
    pub error_backoff: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            poll_timeout_secs: 30,
            shutdown_grace: Duration::from_secs(30),
            error_backoff: DEFAULT_ERROR_BACKOFF,
        }
    }
}

/// Polls for updates and dispatches each message on its own task until
/// `shutdown` resolves, then drains in-flight tasks within the grace period.
#[instrument(skip_all, fields(poll_timeout = settings.poll_timeout_secs))]
pub async fn run_polling<F>(
    client: Arc<BotApiClient>,
    handler: Arc<PackHandler>,
    settings: PollSettings,
    shutdown: F,
) where
    F: Future<Output = ()>,
{
    let mut offset: Option<i64> = None;
    let mut tasks = JoinSet::new();
    tokio::pin!(shutdown);

    info!("polling for updates");
    loop {
        while let Some(result) = tasks.try_join_next() {
            if let Err(e) = result {
                error!(error = %e, "message task failed");
            }
        }

        tokio::select! {
            () = &mut shutdown => {
                info!("shutdown requested, stopping polling");
                break;
            }
            result = client.get_updates(offset, settings.poll_timeout_secs) => match result {
                Ok(updates) => {
                    if !updates.is_empty() {
                        debug!(count = updates.len(), "received updates");
                    }
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        let Some(message) = update.message else {
                            continue;
                        };
                        let client = Arc::clone(&client);
                        let handler = Arc::clone(&handler);
                        tasks.spawn(async move {
                            dispatch(client.as_ref(), &handler, &message).await;
                        });
                    }
                }
                Err(e) => {
                    warn!(error = %e, backoff_ms = settings.error_backoff.as_millis(), "getUpdates failed");
                    tokio::select! {
                        () = &mut shutdown => {
                            info!("shutdown requested, stopping polling");
                            break;
                        }
                        () = tokio::time::sleep(settings.error_backoff) => {}
                    }
                }
            }
        }
    }

    drain(&mut tasks, settings.shutdown_grace).await;
}

async fn drain(tasks: &mut JoinSet<()>, grace: Duration) {
    if tasks.is_empty() {
        return;
    }
    info!(in_flight = tasks.len(), grace_secs = grace.as_secs(), "waiting for in-flight requests");

    let finished = tokio::time::timeout(grace, async {
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "message task failed");
            }
        }
    })
    .await;

    if finished.is_err() {
        warn!(abandoned = tasks.len(), "grace period elapsed, aborting requests");
        tasks.abort_all();
    }
}
