//! Bundle Assembler (component J): composes a chained proof, its batch
//! inclusion path, the attestation aggregate over the batch root, and the
//! current result-chain tip into one self-verifying, canonically-hashed
//! artifact.

use certen_types::{canonical_hash, AttestationAggregate, BatchId, ChainedProof, ExternalResult, Hash32, ReceiptStep};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A transaction's inclusion path within its closed batch's Merkle tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchInclusion {
    pub batch_id: BatchId,
    pub leaf: Hash32,
    pub index: u64,
    pub path: Vec<ReceiptStep>,
    pub batch_root: Hash32,
    pub tx_count: u32,
    pub block_height: u64,
}

/// A fully assembled, self-verifying proof artifact for one transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub chained_proof: ChainedProof,
    pub batch_inclusion: BatchInclusion,
    pub attestation_aggregate: AttestationAggregate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_chain_tip: Option<ExternalResult>,
    pub bundle_hash: Hash32,
}

#[derive(Serialize)]
struct BundleHashFields<'a> {
    chained_proof: &'a ChainedProof,
    batch_inclusion: &'a BatchInclusion,
    attestation_aggregate: &'a AttestationAggregate,
    result_chain_tip: &'a Option<ExternalResult>,
}

/// Assemble a `Bundle` and compute its canonical hash. Pure composition:
/// callers are responsible for having already built and (if desired)
/// verified each constituent piece.
pub fn assemble(
    chained_proof: ChainedProof,
    batch_inclusion: BatchInclusion,
    attestation_aggregate: AttestationAggregate,
    result_chain_tip: Option<ExternalResult>,
) -> Bundle {
    let bundle_hash = canonical_hash(&BundleHashFields {
        chained_proof: &chained_proof,
        batch_inclusion: &batch_inclusion,
        attestation_aggregate: &attestation_aggregate,
        result_chain_tip: &result_chain_tip,
    })
    .expect("bundle fields are always serializable");

    debug!(%bundle_hash, batch_id = ?batch_inclusion.batch_id, "bundle assembled");

    Bundle {
        chained_proof,
        batch_inclusion,
        attestation_aggregate,
        result_chain_tip,
        bundle_hash,
    }
}
