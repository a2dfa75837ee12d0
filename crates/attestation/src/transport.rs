//! Peer attestation transport (external interface #3): request an
//! attestation from one validator. No real network implementation lives
//! here — only the contract and in-memory test doubles.

use async_trait::async_trait;
use certen_types::{Attestation, BatchId, Hash32, ValidatorId};
use std::time::SystemTime;
use thiserror::Error;

/// A request for a peer's attestation over a specific batch root.
#[derive(Debug, Clone)]
pub struct AttestationRequest {
    pub batch_id: BatchId,
    pub merkle_root: Hash32,
    pub tx_hashes: Vec<Hash32>,
    pub tx_count: u32,
    pub block_height: u64,
    pub requester_id: ValidatorId,
    pub timestamp: SystemTime,
    pub expires_at: SystemTime,
}

/// Errors a peer transport call can surface.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request to validator {0:?} timed out")]
    Timeout(ValidatorId),
    #[error("request to validator {0:?} was rejected: {1}")]
    Rejected(ValidatorId, String),
    #[error("transport failure contacting validator {0:?}: {1}")]
    Unreachable(ValidatorId, String),
}

/// Broadcasts an attestation request to one peer validator.
///
/// Implementations MUST reject requests where `now > expires_at` before
/// doing any signing work.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn request_attestation(
        &self,
        peer: ValidatorId,
        request: AttestationRequest,
    ) -> Result<Attestation, TransportError>;
}
