//! Core data types for the chained proof engine: hashes, receipts, layered
//! proofs, batches, attestations, and external results.
//!
//! This crate is pure data plus the handful of operations (hex codec,
//! canonical JSON, receipt walk) that are universal enough to belong next
//! to the types they operate on. Cross-layer invariants, Merkle tree
//! construction, BLS operations, batch lifecycle, and quorum collection all
//! live in their own crates.

mod attestation;
mod batch;
mod hash;
mod layers;
mod receipt;
mod result;

pub use attestation::{
    signing_message, Attestation, AttestationAggregate, ValidatorId, ATTESTATION_DOMAIN,
    BLS_PUBKEY_BYTES, BLS_SIG_BYTES,
};
pub use batch::{Batch, BatchId, BatchKind, BatchState, BatchTx, Ref};
pub use hash::{canonical_hash, canonical_json, hash_pair, Hash32, HexError};
pub use layers::{ChainedProof, ChainedProofInput, Layer1, Layer2, Layer3};
pub use receipt::{Receipt, ReceiptError, ReceiptStep};
pub use result::{ExecutionOutcome, ExecutionStatus, ExternalInclusionProof, ExternalResult};
