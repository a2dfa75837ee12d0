//! Hash construction for `ExternalResult`: the `resultId` identity hash
//! and the `resultHash` chain-link hash.

use certen_types::{canonical_hash, ExecutionOutcome, ExternalInclusionProof, ExternalResult, Hash32};
use serde::Serialize;

#[derive(Serialize)]
struct ResultIdFields<'a> {
    chain: &'a str,
    chain_id: u64,
    block_number: u64,
    tx_hash: Hash32,
}

/// `resultId = H(canonical({chain, chainId, blockNumber, txHash}))`.
pub fn compute_result_id(result: &ExternalResult) -> Hash32 {
    canonical_hash(&ResultIdFields {
        chain: &result.chain,
        chain_id: result.chain_id,
        block_number: result.block_number,
        tx_hash: result.tx_hash,
    })
    .expect("ExternalResult fields are always serializable")
}

#[derive(Serialize)]
struct ResultHashFields<'a> {
    chain: &'a str,
    chain_id: u64,
    tx_hash: Hash32,
    block_number: u64,
    block_hash: Hash32,
    block_time: u64,
    transactions_root: Hash32,
    receipts_root: Hash32,
    state_root: Hash32,
    outcome: &'a ExecutionOutcome,
    tx_inclusion_proof: &'a Option<ExternalInclusionProof>,
    receipt_inclusion_proof: &'a Option<ExternalInclusionProof>,
    result_id: Hash32,
    previous_result_hash: Hash32,
    anchor_proof_hash: Hash32,
    sequence_number: u64,
}

/// `resultHash = H(canonical(subset))`, covering every field the
/// cross-layer verifier checks plus the chain-link fields. Excludes
/// `resultHash` itself, which this function computes.
pub fn compute_result_hash(result: &ExternalResult) -> Hash32 {
    canonical_hash(&ResultHashFields {
        chain: &result.chain,
        chain_id: result.chain_id,
        tx_hash: result.tx_hash,
        block_number: result.block_number,
        block_hash: result.block_hash,
        block_time: result.block_time,
        transactions_root: result.transactions_root,
        receipts_root: result.receipts_root,
        state_root: result.state_root,
        outcome: &result.outcome,
        tx_inclusion_proof: &result.tx_inclusion_proof,
        receipt_inclusion_proof: &result.receipt_inclusion_proof,
        result_id: result.result_id,
        previous_result_hash: result.previous_result_hash,
        anchor_proof_hash: result.anchor_proof_hash,
        sequence_number: result.sequence_number,
    })
    .expect("ExternalResult fields are always serializable")
}
