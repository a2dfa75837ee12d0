//! Batch collector: the single writer for open batches.
//!
//! An accumulate-then-flush collector: owns its open batch exclusively, is
//! deterministic given caller-supplied time, and freezes its leaves on
//! flush/close. Runs one `OnCadence` batch and one `OnDemand` batch side by
//! side, each behind its own exclusive guard — single-writer, many-reader
//! per open batch.

use crate::merkle::MerkleTree;
use certen_types::{Batch, BatchId, BatchKind, BatchState, BatchTx, Hash32};
use std::time::SystemTime;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Errors from batch submission or lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// `MaxBatchSize` was not a positive number.
    #[error("max_batch_size must be greater than zero")]
    InvalidMaxBatchSize,

    /// Attempted an invalid lifecycle transition (e.g. anchoring a batch
    /// that was never closed).
    #[error("invalid batch state transition from {from:?}")]
    InvalidTransition { from: BatchState },
}

/// Outcome of a single `submit` call.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// The transaction was appended to the still-open batch.
    Appended { batch_id: BatchId },
    /// The append caused (or was immediately followed by) a close: either
    /// an `OnDemand` batch closing synchronously, or an `OnCadence` batch
    /// that just hit `MaxBatchSize`.
    Closed(Batch),
}

struct OpenBatch {
    batch_id: BatchId,
    kind: BatchKind,
    leaves: Vec<BatchTx>,
    start_time: SystemTime,
}

impl OpenBatch {
    fn new(kind: BatchKind, now: SystemTime) -> Self {
        Self {
            batch_id: BatchId::new(),
            kind,
            leaves: Vec::new(),
            start_time: now,
        }
    }

    fn freeze(self, state: BatchState, close_time: SystemTime) -> Batch {
        let root = MerkleTree::build(
            &self.leaves.iter().map(|tx| tx.tx_hash).collect::<Vec<Hash32>>(),
        )
        .root();
        Batch {
            batch_id: self.batch_id,
            kind: self.kind,
            state,
            leaves: self.leaves,
            merkle_root: Some(root),
            start_time: self.start_time,
            close_time: Some(close_time),
            anchor_height: None,
            anchor_hash: None,
        }
    }
}

/// Accumulates transaction records into open batches and closes them on
/// size or explicit request. A `CadenceScheduler` drives the
/// interval-based close of `OnCadence` batches by calling `close` from its
/// own task; this collector only enforces the size-triggered and
/// on-demand closes directly.
pub struct BatchCollector {
    on_cadence: Mutex<Option<OpenBatch>>,
    on_demand: Mutex<Option<OpenBatch>>,
    max_batch_size: usize,
}

impl BatchCollector {
    /// Create a collector with the given maximum batch size.
    pub fn new(max_batch_size: usize) -> Result<Self, BatchError> {
        if max_batch_size == 0 {
            return Err(BatchError::InvalidMaxBatchSize);
        }
        Ok(Self {
            on_cadence: Mutex::new(None),
            on_demand: Mutex::new(None),
            max_batch_size,
        })
    }

    /// Append a transaction to the open batch of `kind`, creating one if
    /// none is open. `OnDemand` batches close synchronously after the
    /// append; `OnCadence` batches close only when `MaxBatchSize` is
    /// reached (or later, via the scheduler's interval-driven `close`).
    pub async fn submit(
        &self,
        tx: BatchTx,
        kind: BatchKind,
        now: SystemTime,
    ) -> Result<SubmitOutcome, BatchError> {
        let guard = match kind {
            BatchKind::OnCadence => &self.on_cadence,
            BatchKind::OnDemand => &self.on_demand,
        };
        let mut slot = guard.lock().await;

        let batch = slot.get_or_insert_with(|| OpenBatch::new(kind, now));
        batch.leaves.push(tx);
        debug!(batch_id = ?batch.batch_id, leaves = batch.leaves.len(), "appended to open batch");

        // Reaching capacity closes the batch rather than rejecting the
        // submission outright: the transaction that tipped it over still
        // belongs to this batch, it's just the last one in.
        if batch.leaves.len() >= self.max_batch_size {
            let open = slot.take().expect("just inserted");
            info!(batch_id = ?open.batch_id, "batch reached max size, closing");
            return Ok(SubmitOutcome::Closed(open.freeze(BatchState::Closed, now)));
        }

        if kind == BatchKind::OnDemand {
            let open = slot.take().expect("just inserted");
            return Ok(SubmitOutcome::Closed(open.freeze(BatchState::Closed, now)));
        }

        Ok(SubmitOutcome::Appended {
            batch_id: batch.batch_id,
        })
    }

    /// Close the open batch of `kind`, if any, freezing its leaves and
    /// computing its Merkle root. Returns `None` if no batch was open.
    pub async fn close(&self, kind: BatchKind, now: SystemTime) -> Option<Batch> {
        let guard = match kind {
            BatchKind::OnCadence => &self.on_cadence,
            BatchKind::OnDemand => &self.on_demand,
        };
        let mut slot = guard.lock().await;
        slot.take().map(|open| {
            info!(batch_id = ?open.batch_id, leaves = open.leaves.len(), "closing batch");
            open.freeze(BatchState::Closed, now)
        })
    }

    /// `true` iff a batch of `kind` is currently open.
    pub async fn has_open(&self, kind: BatchKind) -> bool {
        let guard = match kind {
            BatchKind::OnCadence => &self.on_cadence,
            BatchKind::OnDemand => &self.on_demand,
        };
        guard.lock().await.is_some()
    }

    /// The start time of the currently open batch of `kind`, if any.
    pub async fn open_start_time(&self, kind: BatchKind) -> Option<SystemTime> {
        let guard = match kind {
            BatchKind::OnCadence => &self.on_cadence,
            BatchKind::OnDemand => &self.on_demand,
        };
        guard.lock().await.as_ref().map(|b| b.start_time)
    }
}

/// Transition a `Closed` batch to `Anchored`, recording where it was
/// submitted. Fails if the batch was not `Closed`.
pub fn mark_anchored(mut batch: Batch, height: u64, hash: Hash32) -> Result<Batch, BatchError> {
    if batch.state != BatchState::Closed {
        return Err(BatchError::InvalidTransition { from: batch.state });
    }
    batch.state = BatchState::Anchored;
    batch.anchor_height = Some(height);
    batch.anchor_hash = Some(hash);
    Ok(batch)
}

/// Transition an `Anchored` batch to `Finalized`.
pub fn mark_finalized(mut batch: Batch) -> Result<Batch, BatchError> {
    if batch.state != BatchState::Anchored {
        return Err(BatchError::InvalidTransition { from: batch.state });
    }
    batch.state = BatchState::Finalized;
    Ok(batch)
}

/// Transition an `Anchored` batch to `Failed`. The Merkle root is
/// untouched, so the batch remains a valid retry target under a new
/// anchor attempt.
pub fn mark_failed(mut batch: Batch) -> Result<Batch, BatchError> {
    if batch.state != BatchState::Anchored {
        return Err(BatchError::InvalidTransition { from: batch.state });
    }
    batch.state = BatchState::Failed;
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use certen_types::{Hash32, Ref};
    use std::time::Duration;

    fn tx(n: u8) -> BatchTx {
        BatchTx {
            tx_hash: Hash32::digest(&[n]),
            account_ref: format!("acct-{n}"),
            chained_proof_ref: None,
            governance_ref: None,
            submitted_at: SystemTime::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn on_demand_closes_synchronously() {
        let collector = BatchCollector::new(10).unwrap();
        let now = SystemTime::UNIX_EPOCH;
        let outcome = collector.submit(tx(1), BatchKind::OnDemand, now).await.unwrap();
        match outcome {
            SubmitOutcome::Closed(batch) => {
                assert_eq!(batch.state, BatchState::Closed);
                assert_eq!(batch.leaves.len(), 1);
                assert!(batch.merkle_root.is_some());
            }
            other => panic!("expected Closed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn on_cadence_stays_open_until_closed() {
        let collector = BatchCollector::new(10).unwrap();
        let now = SystemTime::UNIX_EPOCH;
        let outcome = collector.submit(tx(1), BatchKind::OnCadence, now).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Appended { .. }));
        assert!(collector.has_open(BatchKind::OnCadence).await);

        let closed = collector
            .close(BatchKind::OnCadence, now + Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(closed.state, BatchState::Closed);
        assert!(!collector.has_open(BatchKind::OnCadence).await);
    }

    #[tokio::test]
    async fn reaching_max_batch_size_closes_immediately() {
        let collector = BatchCollector::new(2).unwrap();
        let now = SystemTime::UNIX_EPOCH;
        let first = collector.submit(tx(1), BatchKind::OnCadence, now).await.unwrap();
        assert!(matches!(first, SubmitOutcome::Appended { .. }));

        let second = collector.submit(tx(2), BatchKind::OnCadence, now).await.unwrap();
        match second {
            SubmitOutcome::Closed(batch) => assert_eq!(batch.leaves.len(), 2),
            other => panic!("expected Closed, got {other:?}"),
        }
        assert!(!collector.has_open(BatchKind::OnCadence).await);

        // A fresh batch opens for the next submission.
        let third = collector.submit(tx(3), BatchKind::OnCadence, now).await.unwrap();
        assert!(matches!(third, SubmitOutcome::Appended { .. }));
    }

    #[test]
    fn zero_max_batch_size_rejected() {
        assert_eq!(
            BatchCollector::new(0).unwrap_err(),
            BatchError::InvalidMaxBatchSize
        );
    }

    #[test]
    fn lifecycle_transitions() {
        let batch = Batch {
            batch_id: BatchId::new(),
            kind: BatchKind::OnCadence,
            state: BatchState::Closed,
            leaves: vec![],
            merkle_root: Some(Hash32::ZERO),
            start_time: SystemTime::UNIX_EPOCH,
            close_time: Some(SystemTime::UNIX_EPOCH),
            anchor_height: None,
            anchor_hash: None,
        };
        let anchored = mark_anchored(batch, 100, Hash32::digest(b"h")).unwrap();
        assert_eq!(anchored.state, BatchState::Anchored);

        let root_before = anchored.merkle_root;
        let failed = mark_failed(anchored.clone()).unwrap();
        assert_eq!(failed.state, BatchState::Failed);
        assert_eq!(failed.merkle_root, root_before);

        let finalized = mark_finalized(anchored).unwrap();
        assert_eq!(finalized.state, BatchState::Finalized);
    }

    #[test]
    fn finalizing_a_non_anchored_batch_fails() {
        let batch = Batch {
            batch_id: BatchId::new(),
            kind: BatchKind::OnCadence,
            state: BatchState::Closed,
            leaves: vec![],
            merkle_root: Some(Hash32::ZERO),
            start_time: SystemTime::UNIX_EPOCH,
            close_time: None,
            anchor_height: None,
            anchor_hash: None,
        };
        assert!(matches!(
            mark_finalized(batch),
            Err(BatchError::InvalidTransition { .. })
        ));
    }

    fn _assert_ref_type_used(_r: Ref) {}
}
