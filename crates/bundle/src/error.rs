use certen_crypto::BlsError;
use certen_proof::ProofError;
use thiserror::Error;

/// Errors from cross-layer bundle verification (component K). Any single
/// failure is fatal; there is no partial acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// A chained-proof receipt or cross-layer invariant failed.
    #[error(transparent)]
    Proof(#[from] ProofError),

    /// The batch inclusion path did not reproduce the declared batch root,
    /// or the inclusion leaf did not match the chained proof's transaction.
    #[error("batch inclusion proof failed to verify")]
    BatchInclusionFailed,

    /// The attestation aggregate's `message_hash` does not match the hash
    /// recomputed from the bundle's own batch/attestation fields.
    #[error("attestation message hash does not match the bundle's batch fields")]
    MessageHashMismatch,

    /// A BLS key or signature in the attestation aggregate was malformed.
    #[error(transparent)]
    Bls(#[from] BlsError),

    /// The aggregated signature did not verify against the aggregated
    /// public key and the recomputed message hash.
    #[error("aggregated attestation signature failed to verify")]
    AggregateSignatureInvalid,

    /// The attestation aggregate did not report `thresholdMet = true`.
    #[error("attestation aggregate did not meet its threshold")]
    ThresholdNotMet,

    /// A result-chain tip was present but its self-consistency or its
    /// anchor binding to this bundle's chained proof did not hold.
    #[error("result chain tip failed verification: {0}")]
    ResultChainMismatch(String),
}
