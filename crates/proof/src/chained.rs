//! Layered Proof composition and verification (component C): pure
//! composition of three already-built layers, plus the invariant checks
//! that span them.

use crate::client::ConsensusClient;
use crate::consensus::bind_app_hash;
use crate::error::ProofError;
use certen_types::{ChainedProof, ChainedProofInput, Layer1, Layer2, Layer3};

/// How thoroughly [`verify`] checks a `ChainedProof`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyMode {
    /// Re-bind both app-hashes against a live consensus client. This is
    /// the only proof-grade mode.
    ProofGrade,
    /// Skip consensus binding; verify only receipt integrity and
    /// cross-layer invariants. Suitable for offline replay of archived
    /// proofs, never for accepting a fresh one.
    IntegrityOnly,
}

/// Compose three already-validated layers into a `ChainedProof`. Pure
/// construction — no invariant checking beyond what each layer builder
/// already enforced; call [`verify`] before trusting the result.
pub fn compose(input: ChainedProofInput, layer1: Layer1, layer2: Layer2, layer3: Layer3) -> ChainedProof {
    ChainedProof {
        input,
        layer1,
        layer2,
        layer3,
        artifacts: None,
    }
}

/// Enforce the invariants from the receipt/layer contracts: Layer1's
/// internal consistency (`receipt.start == leaf == input.tx_hash`,
/// `receipt.anchor == bvn_root_chain_anchor`, `receipt.local_block ==
/// bvn_minor_block_index`), L2 pairing, L3 pairing and ordering, and the
/// semantic link between L2's `dnMinorBlockIndex` and L3's DN-anchor
/// fields. Also re-validates all five embedded receipts.
pub fn check_invariants(proof: &ChainedProof) -> Result<(), ProofError> {
    proof.layer1.receipt.validate()?;
    proof.layer2.root_receipt.validate()?;
    proof.layer2.bpt_receipt.validate()?;
    proof.layer3.root_receipt.validate()?;
    proof.layer3.bpt_receipt.validate()?;

    if proof.layer1.receipt.start != proof.layer1.leaf || proof.layer1.leaf != proof.input.tx_hash {
        return Err(ProofError::SemanticViolation);
    }

    if proof.layer1.receipt.anchor != proof.layer1.bvn_root_chain_anchor {
        return Err(ProofError::SemanticViolation);
    }

    if proof.layer1.receipt.local_block != proof.layer1.bvn_minor_block_index {
        return Err(ProofError::SemanticViolation);
    }

    if proof.layer2.root_receipt.anchor != proof.layer2.bpt_receipt.anchor
        || proof.layer2.root_receipt.local_block != proof.layer2.bpt_receipt.local_block
    {
        return Err(ProofError::PairingViolation);
    }

    if proof.layer3.root_receipt.anchor != proof.layer3.bpt_receipt.anchor
        || proof.layer3.root_receipt.local_block != proof.layer3.bpt_receipt.local_block
    {
        return Err(ProofError::PairingViolation);
    }

    if proof.layer3.dn_self_anchor_recorded_at_minor_block_index
        < proof.layer3.dn_anchor_minor_block_index
    {
        return Err(ProofError::OrderingViolation);
    }

    if proof.layer3.dn_anchor_minor_block_index != proof.layer2.dn_minor_block_index
        || proof.layer3.dn_consensus_height != proof.layer2.dn_minor_block_index + 1
    {
        return Err(ProofError::SemanticViolation);
    }

    Ok(())
}

/// Verify a `ChainedProof` per `mode`. In `ProofGrade` mode, both
/// consensus binds run against `consensus`; in `IntegrityOnly` mode
/// `consensus` is ignored (pass any client, e.g. a panicking stub, since
/// it will not be called).
pub async fn verify(
    proof: &ChainedProof,
    consensus: &dyn ConsensusClient,
    mode: VerifyMode,
) -> Result<(), ProofError> {
    check_invariants(proof)?;

    if mode == VerifyMode::ProofGrade {
        bind_app_hash(
            consensus,
            proof.layer1.bvn_minor_block_index + 1,
            proof.layer2.bvn_state_tree_anchor,
        )
        .await?;
        bind_app_hash(
            consensus,
            proof.layer2.dn_minor_block_index + 1,
            proof.layer3.dn_state_tree_anchor,
        )
        .await?;
    }

    Ok(())
}
