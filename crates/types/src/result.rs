//! External-result types: post-execution outcomes observed on a target
//! chain, chained together per-target-chain by `certen-resultchain`.

use crate::hash::Hash32;
use serde::{Deserialize, Serialize};

/// Execution outcome reported by a target-chain observer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: ExecutionStatus,
    pub gas_used: u64,
    pub logs_hash: Hash32,
    pub return_data: Vec<u8>,
}

/// Whether the observed transaction succeeded on the target chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Success,
    Reverted,
}

/// A Merkle inclusion proof within an external (non-binary-Merkle) trie,
/// stored verbatim. Its cryptographic validity is asserted at construction
/// time and trusted thereafter; `certen-bundle`'s verifier never re-checks
/// it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalInclusionProof {
    pub trie_root: Hash32,
    pub encoded_proof: Vec<u8>,
}

/// One post-anchor outcome in a per-target-chain result hash chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalResult {
    pub chain: String,
    pub chain_id: u64,
    pub tx_hash: Hash32,
    pub block_number: u64,
    pub block_hash: Hash32,
    pub block_time: u64,
    pub transactions_root: Hash32,
    pub receipts_root: Hash32,
    pub state_root: Hash32,
    pub outcome: ExecutionOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_inclusion_proof: Option<ExternalInclusionProof>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_inclusion_proof: Option<ExternalInclusionProof>,

    // Hash-chain fields, set by `ResultHashChain::append`.
    pub result_id: Hash32,
    pub previous_result_hash: Hash32,
    pub anchor_proof_hash: Hash32,
    pub sequence_number: u64,
    pub result_hash: Hash32,
}
