//! Target-chain observer interface: watches a target chain for a
//! transaction's execution outcome and reports it as an `ExternalResult`,
//! ready to be appended to that chain's `ResultHashChain`.
//!
//! No production implementation ships here — wiring a real target-chain
//! client (an RPC poller, a subscription feed) is out of scope; only the
//! trait and its error type are part of this workspace's contract.

use async_trait::async_trait;
use certen_types::{ExternalResult, Hash32};
use thiserror::Error;

/// Errors observing a transaction's outcome on a target chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObserverError {
    /// The transaction has not yet been observed on the target chain.
    #[error("transaction {0} not yet observed")]
    NotFound(Hash32),

    /// The observer's upstream source returned something malformed.
    #[error("malformed response from target-chain observer: {0}")]
    Malformed(String),

    /// The observer's upstream source is unreachable.
    #[error("target-chain observer unreachable: {0}")]
    Unreachable(String),
}

/// Watches a target chain for one transaction's execution outcome.
#[async_trait]
pub trait ChainObserver: Send + Sync {
    /// Fetch `tx_hash`'s outcome. The returned `ExternalResult`'s
    /// hash-chain fields (`result_id`, `previous_result_hash`,
    /// `anchor_proof_hash`, `sequence_number`, `result_hash`) should be
    /// left as `Hash32::ZERO`/`0`; `ResultHashChain::append` overwrites
    /// them when the result is appended to its chain.
    async fn observe(&self, tx_hash: Hash32) -> Result<ExternalResult, ObserverError>;
}
