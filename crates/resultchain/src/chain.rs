//! `ResultHashChain`: one per target chain, single-writer append with
//! read access for verification.

use crate::error::ChainError;
use crate::hashing::{compute_result_hash, compute_result_id};
use certen_types::{ExternalResult, Hash32};
use tracing::debug;

/// The tip of a per-target-chain result hash chain.
#[derive(Debug, Clone)]
pub struct ResultHashChain {
    chain: String,
    anchor_proof_hash: Hash32,
    latest_hash: Hash32,
    latest_sequence: u64,
}

impl ResultHashChain {
    /// Start a new chain for `chain`, anchored to `anchor_proof_hash` (the
    /// hash of the `ChainedProof` that authorized this target chain's
    /// inclusion in the batch).
    pub fn genesis(chain: impl Into<String>, anchor_proof_hash: Hash32) -> Self {
        Self {
            chain: chain.into(),
            anchor_proof_hash,
            latest_hash: Hash32::ZERO,
            latest_sequence: 0,
        }
    }

    pub fn chain_name(&self) -> &str {
        &self.chain
    }

    pub fn latest_hash(&self) -> Hash32 {
        self.latest_hash
    }

    pub fn latest_sequence(&self) -> u64 {
        self.latest_sequence
    }

    pub fn anchor_proof_hash(&self) -> Hash32 {
        self.anchor_proof_hash
    }

    /// Append `result` to the chain tip, overwriting its chain-link
    /// fields (`previousResultHash`, `sequenceNumber`, `anchorProofHash`)
    /// and recomputing `resultId`/`resultHash`. Returns the finalized
    /// result and advances the tip.
    pub fn append(&mut self, mut result: ExternalResult) -> ExternalResult {
        result.previous_result_hash = self.latest_hash;
        result.sequence_number = self.latest_sequence;
        result.anchor_proof_hash = self.anchor_proof_hash;
        result.result_id = compute_result_id(&result);
        result.result_hash = compute_result_hash(&result);

        self.latest_hash = result.result_hash;
        self.latest_sequence += 1;
        debug!(chain = %self.chain, sequence = result.sequence_number, "appended result");
        result
    }
}

/// Verify that `results` forms an unbroken chain from genesis: the first
/// result has `previousResultHash == 0` and `sequenceNumber == 0`; every
/// subsequent result links to its predecessor's `resultHash`, increments
/// `sequenceNumber` by one, and carries the same `anchorProofHash`; and
/// every result's declared `resultHash`/`resultId` reproduce under
/// recomputation.
pub fn verify_chain(results: &[ExternalResult]) -> Result<(), ChainError> {
    let Some(first) = results.first() else {
        return Err(ChainError::Empty);
    };

    if !first.previous_result_hash.is_zero() {
        return Err(ChainError::ChainBreak {
            index: 0,
            reason: "genesis result must have previous_result_hash == 0".to_string(),
        });
    }
    if first.sequence_number != 0 {
        return Err(ChainError::ChainBreak {
            index: 0,
            reason: "genesis result must have sequence_number == 0".to_string(),
        });
    }
    verify_self_consistency(first, 0)?;

    for (i, window) in results.windows(2).enumerate() {
        let prev = &window[0];
        let curr = &window[1];
        let index = i + 1;

        if curr.previous_result_hash != prev.result_hash {
            return Err(ChainError::ChainBreak {
                index,
                reason: "previous_result_hash does not match predecessor's result_hash".to_string(),
            });
        }
        if curr.sequence_number != prev.sequence_number + 1 {
            return Err(ChainError::ChainBreak {
                index,
                reason: "sequence_number is not predecessor + 1".to_string(),
            });
        }
        if curr.anchor_proof_hash != prev.anchor_proof_hash {
            return Err(ChainError::ChainBreak {
                index,
                reason: "anchor_proof_hash changed mid-chain".to_string(),
            });
        }
        verify_self_consistency(curr, index)?;
    }

    Ok(())
}

fn verify_self_consistency(result: &ExternalResult, index: usize) -> Result<(), ChainError> {
    if compute_result_id(result) != result.result_id {
        return Err(ChainError::ChainBreak {
            index,
            reason: "result_id does not reproduce under recomputation".to_string(),
        });
    }
    if compute_result_hash(result) != result.result_hash {
        return Err(ChainError::ChainBreak {
            index,
            reason: "result_hash does not reproduce under recomputation".to_string(),
        });
    }
    Ok(())
}
