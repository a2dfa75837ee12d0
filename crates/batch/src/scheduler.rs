//! Cooperative interval-driven close for `OnCadence` batches.
//!
//! A single task owns a `tokio::time::interval` timer and calls back into
//! the collector on each tick, rather than spawning a new task per round.
//! The callback itself (anchoring, publishing, whatever the caller wants
//! done with a just-closed batch) is generic, so this module only owns the
//! ticking.

use crate::collector::BatchCollector;
use certen_types::{Batch, BatchKind};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{error, info};

/// Error from a batch close hook (e.g. an anchor-publish transport
/// failure). Kept separate from `BatchError` since close-hook failures
/// are a distinct failure domain from batch lifecycle errors.
#[derive(Debug, thiserror::Error)]
#[error("batch close hook failed: {0}")]
pub struct CloseHookError(pub String);

/// Runs a `BatchCollector`'s `OnCadence` close on a fixed poll interval,
/// invoking `on_close` with each closed batch. Errors from `on_close` are
/// logged, not propagated — a failed anchor attempt does not roll back
/// the close, since the batch's leaves and Merkle root are already frozen
/// and can be retried independently.
pub struct CadenceScheduler {
    handle: JoinHandle<()>,
}

impl CadenceScheduler {
    /// Spawn the scheduler task. `check_interval` is how often the task
    /// wakes to check whether the open batch should close; `batch_interval`
    /// is the accumulation window — an open batch closes once its age
    /// reaches `batch_interval`, on the first poll after that. `on_close`
    /// is invoked (without blocking subsequent ticks) for every batch that
    /// closes, including empty ones if `close_empty_batches` is true.
    pub fn spawn<F, Fut>(
        collector: Arc<BatchCollector>,
        check_interval: Duration,
        batch_interval: Duration,
        close_empty_batches: bool,
        on_close: F,
    ) -> Self
    where
        F: Fn(Batch) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), CloseHookError>> + Send,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = interval(check_interval);
            ticker.tick().await; // first tick fires immediately; skip it
            loop {
                ticker.tick().await;
                let now = SystemTime::now();

                let open_start = collector.open_start_time(BatchKind::OnCadence).await;
                let should_close = match open_start {
                    Some(start) => now.duration_since(start).unwrap_or(Duration::ZERO) >= batch_interval,
                    None => close_empty_batches,
                };
                if !should_close {
                    continue;
                }

                match collector.close(BatchKind::OnCadence, now).await {
                    Some(batch) => {
                        if let Err(err) = on_close(batch).await {
                            error!(%err, "batch close hook failed");
                        }
                    }
                    None => info!("cadence tick with no open batch"),
                }
            }
        });
        Self { handle }
    }

    /// Stop the scheduler task.
    pub fn stop(self) {
        self.handle.abort();
    }
}
