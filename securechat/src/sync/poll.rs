//! Periodic refresh of the message view.
//!
//! [`spawn_polling`] refreshes once immediately and then on every tick of a
//! fixed-period timer until the returned [`PollHandle`] is cancelled or
//! dropped. Each tick starts its own refresh task, so a slow response does
//! not delay the next tick: refreshes may overlap, and whichever finishes
//! last determines what the view shows. There is no backoff and no pause
//! after failures.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

use crate::api::ChatApi;
use crate::crypto::MessageCipher;

use super::MessageSync;

/// Refresh period used by the chat page.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Shortest accepted period; `tokio::time::interval` rejects zero.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a running poller.
///
/// Dropping the handle stops polling. Use [`shutdown`](Self::shutdown) to
/// also wait for the task to wind down.
#[derive(Debug)]
pub struct PollHandle {
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Stop scheduling refreshes and abort any still in flight.
    pub fn cancel(&self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Whether the poller task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop polling and wait for the poller task to exit.
    pub async fn shutdown(mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        task.abort();
        match task.await {
            Err(e) if e.is_panic() => tracing::error!(error = %e, "poller task panicked"),
            _ => tracing::info!("message polling stopped"),
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Start refreshing `sync` every `period`, beginning immediately.
///
/// Aborting the poller drops its [`JoinSet`], which aborts the refreshes
/// still in flight. Must be called from within a tokio runtime.
pub fn spawn_polling<A, C>(sync: Arc<MessageSync<A, C>>, period: Duration) -> PollHandle
where
    A: ChatApi + 'static,
    C: MessageCipher + 'static,
{
    let period = period.max(MIN_POLL_INTERVAL);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight = JoinSet::new();

        tracing::info!(?period, "message polling started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let sync = Arc::clone(&sync);
                    in_flight.spawn(async move {
                        // Failures are logged by refresh; the next tick tries again.
                        let _ = sync.refresh().await;
                    });
                }
                Some(result) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = result
                        && e.is_panic()
                    {
                        tracing::error!(error = %e, "refresh task panicked");
                    }
                }
            }
        }
    });

    PollHandle { task: Some(task) }
}
