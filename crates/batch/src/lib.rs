//! Batch aggregation: the deterministic Merkle tree over pending
//! transaction hashes, and the collector/scheduler pair that accumulates
//! leaves into batches and closes them on cadence, on demand, or on
//! reaching capacity.

pub mod collector;
pub mod merkle;
pub mod scheduler;

pub use collector::{mark_anchored, mark_failed, mark_finalized, BatchCollector, BatchError, SubmitOutcome};
pub use merkle::{verify as merkle_verify, MerkleTree};
pub use scheduler::{CadenceScheduler, CloseHookError};
