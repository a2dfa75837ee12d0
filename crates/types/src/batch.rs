//! Batch data types: a time- or size-bounded group of attested transactions.

use crate::hash::Hash32;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Identifies a batch. Newtype over `Uuid` so batch identity can never be
/// confused with a transaction or validator hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatchId(pub Uuid);

impl BatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

/// A reference to some other artifact by its hash, kept opaque at this
/// layer (the chained-proof / governance-proof stores are out of scope
/// here; only the reference survives in the batch record).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref(pub Hash32);

/// A single transaction record as seen by the batch collector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTx {
    pub tx_hash: Hash32,
    pub account_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chained_proof_ref: Option<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governance_ref: Option<Ref>,
    pub submitted_at: SystemTime,
}

/// Whether a batch closes on a fixed cadence or immediately on demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchKind {
    OnCadence,
    OnDemand,
}

/// Batch lifecycle state.
///
/// `Open -> Closed -> {Anchored -> Finalized | Failed}`. A failed anchor
/// attempt moves `Anchored -> Failed`; the Merkle root (the batch's
/// authoritative identity) is unaffected, so a retry with a different
/// anchor attempt is always possible without re-deriving the root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchState {
    Open,
    Closed,
    Anchored,
    Finalized,
    Failed,
}

/// An immutable, closed batch (or an in-progress open one).
///
/// Invariant: `state != Open` implies `merkle_root` is set and equals
/// `MerkleTree(leaves.map(|tx| tx.tx_hash)).root()`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub batch_id: BatchId,
    pub kind: BatchKind,
    pub state: BatchState,
    pub leaves: Vec<BatchTx>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merkle_root: Option<Hash32>,
    pub start_time: SystemTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_time: Option<SystemTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_height: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_hash: Option<Hash32>,
}

impl Batch {
    /// `true` iff this batch satisfies its own state/root invariant.
    pub fn invariant_holds(&self) -> bool {
        match self.state {
            BatchState::Open => true,
            _ => self.merkle_root.is_some(),
        }
    }
}
