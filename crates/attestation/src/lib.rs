//! Weighted BLS attestation quorum collection: self-attestation plus
//! bounded-concurrency peer broadcast, verified and aggregated against a
//! configurable weighted threshold.

pub mod quorum;
pub mod transport;

pub use quorum::{
    broadcast_and_collect, threshold_weight, AttestationResult, QuorumConfig, QuorumError,
    ValidatorInfo,
};
pub use transport::{AttestationRequest, PeerTransport, TransportError};
