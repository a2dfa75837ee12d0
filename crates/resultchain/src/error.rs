use thiserror::Error;

/// Errors verifying a result hash chain's continuity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The chain is empty where at least a genesis result was expected.
    #[error("result chain is empty")]
    Empty,

    /// Some link in the chain failed to reproduce its declared hash, or
    /// broke sequencing/anchor continuity with its predecessor.
    #[error("chain break at index {index}: {reason}")]
    ChainBreak { index: usize, reason: String },
}
