//! Attestation and attestation-aggregate data types.
//!
//! BLS key material is represented as raw compressed byte arrays here; the
//! actual sign/verify/aggregate operations live in `certen-crypto` so this
//! crate stays free of the `blst` dependency.

use crate::batch::BatchId;
use crate::hash::Hash32;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// A BLS12-381 public key, compressed G2 point (96 bytes, matching the
/// `min_sig` scheme where signatures are the minimal-size G1 element).
pub const BLS_PUBKEY_BYTES: usize = 96;

/// A BLS12-381 signature, compressed G1 point (48 bytes).
pub const BLS_SIG_BYTES: usize = 48;

/// Fixed domain-separation tag for batch attestations.
pub const ATTESTATION_DOMAIN: &str = "ATTESTATION";

/// A validator's identity within a quorum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValidatorId(pub u64);

/// A single validator's signed attestation over a batch's Merkle root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub batch_id: BatchId,
    pub validator_id: ValidatorId,
    pub merkle_root: Hash32,
    pub tx_count: u32,
    pub block_height: u64,
    pub public_key: Vec<u8>,
    pub signature: Vec<u8>,
    pub domain: String,
    pub timestamp: SystemTime,
}

impl Attestation {
    /// The bytes that are actually signed:
    /// `SHA-256(batch_id || merkle_root || ascii(tx_count) || ascii(block_height))`.
    pub fn signing_message(&self) -> Vec<u8> {
        signing_message(&self.batch_id, &self.merkle_root, self.tx_count, self.block_height)
    }
}

/// Build the attestation signing message from its constituent fields.
///
/// Shared by the signer (producing an `Attestation`) and the verifier
/// (recomputing the message hash to check against) so the two can never
/// drift apart.
pub fn signing_message(
    batch_id: &BatchId,
    merkle_root: &Hash32,
    tx_count: u32,
    block_height: u64,
) -> Vec<u8> {
    let mut msg = Vec::with_capacity(16 + 32 + 16 + 20);
    msg.extend_from_slice(batch_id.0.as_bytes());
    msg.extend_from_slice(merkle_root.as_bytes());
    msg.extend_from_slice(tx_count.to_string().as_bytes());
    msg.extend_from_slice(block_height.to_string().as_bytes());
    msg
}

/// A weighted-quorum aggregate over validator attestations for one batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationAggregate {
    pub message_hash: Hash32,
    pub scheme: String,
    pub aggregated_signature: Vec<u8>,
    pub aggregated_public_key: Vec<u8>,
    pub participants: Vec<ValidatorId>,
    pub participant_bitfield: Vec<u8>,
    pub total_weight: u64,
    pub achieved_weight: u64,
    pub threshold_weight: u64,
    pub threshold_met: bool,
}
