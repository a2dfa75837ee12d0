//! Cross-Layer Verifier (component K): stateless, end-to-end validation
//! of a `Bundle` with no access to anything beyond the bundle itself
//! (and, in proof-grade mode, a consensus client for app-hash re-binding).

use crate::bundle::Bundle;
use crate::error::VerifyError;
use certen_batch::merkle_verify;
use certen_crypto::{signing_digest, PublicKey, Signature};
use certen_proof::{self, ConsensusClient, VerifyMode};
use certen_resultchain::{compute_result_hash, compute_result_id};
use certen_types::{canonical_hash, signing_message, ATTESTATION_DOMAIN};
use tracing::{debug, warn};

/// Verify `bundle` per `mode`. In `VerifyMode::ProofGrade`, `consensus`
/// is used to re-bind both of the chained proof's app-hashes; in
/// `VerifyMode::IntegrityOnly`, `consensus` is ignored.
///
/// Steps, matching the order a reviewer would check them in:
/// 1. Every receipt inside the chained proof, plus its cross-layer
///    invariants.
/// 2. Consensus binding (proof-grade only).
/// 3. The batch inclusion path against the batch root, and that the
///    included leaf is this proof's transaction.
/// 4. The aggregated BLS signature against the recomputed message hash,
///    and that the aggregate reports its threshold met.
/// 5. If a result-chain tip is attached, its self-consistency and its
///    anchor binding back to this bundle's chained proof.
pub async fn verify(
    bundle: &Bundle,
    consensus: &dyn ConsensusClient,
    mode: VerifyMode,
) -> Result<(), VerifyError> {
    let bundle_hash = bundle.bundle_hash;

    if let Err(err) = certen_proof::verify(&bundle.chained_proof, consensus, mode).await {
        warn!(%bundle_hash, %err, "chained proof verification failed");
        return Err(err.into());
    }

    verify_batch_inclusion(bundle)
        .inspect_err(|err| warn!(%bundle_hash, %err, "batch inclusion verification failed"))?;
    verify_attestation_aggregate(bundle)
        .inspect_err(|err| warn!(%bundle_hash, %err, "attestation aggregate verification failed"))?;
    verify_result_chain_tip(bundle)
        .inspect_err(|err| warn!(%bundle_hash, %err, "result chain tip verification failed"))?;

    debug!(%bundle_hash, "bundle verified");
    Ok(())
}

fn verify_batch_inclusion(bundle: &Bundle) -> Result<(), VerifyError> {
    let inclusion = &bundle.batch_inclusion;

    if inclusion.leaf != bundle.chained_proof.input.tx_hash {
        return Err(VerifyError::BatchInclusionFailed);
    }

    let ok = merkle_verify(
        inclusion.leaf,
        inclusion.index as usize,
        &inclusion.path,
        inclusion.batch_root,
    );
    if !ok {
        return Err(VerifyError::BatchInclusionFailed);
    }

    Ok(())
}

fn verify_attestation_aggregate(bundle: &Bundle) -> Result<(), VerifyError> {
    let inclusion = &bundle.batch_inclusion;
    let aggregate = &bundle.attestation_aggregate;

    let msg = signing_message(
        &inclusion.batch_id,
        &inclusion.batch_root,
        inclusion.tx_count,
        inclusion.block_height,
    );
    let expected_message_hash = signing_digest(ATTESTATION_DOMAIN, &msg);
    if aggregate.message_hash != expected_message_hash {
        return Err(VerifyError::MessageHashMismatch);
    }

    if !aggregate.threshold_met {
        return Err(VerifyError::ThresholdNotMet);
    }

    let agg_pk = PublicKey::from_bytes(&aggregate.aggregated_public_key)?;
    let agg_sig = Signature::from_bytes(&aggregate.aggregated_signature)?;
    if !agg_pk.verify(&msg, ATTESTATION_DOMAIN, &agg_sig) {
        return Err(VerifyError::AggregateSignatureInvalid);
    }

    Ok(())
}

fn verify_result_chain_tip(bundle: &Bundle) -> Result<(), VerifyError> {
    let Some(tip) = &bundle.result_chain_tip else {
        return Ok(());
    };

    let expected_anchor = canonical_hash(&bundle.chained_proof)
        .map_err(|e| VerifyError::ResultChainMismatch(e.to_string()))?;
    if tip.anchor_proof_hash != expected_anchor {
        return Err(VerifyError::ResultChainMismatch(
            "anchor_proof_hash does not match H(canonical(chained_proof))".to_string(),
        ));
    }

    if compute_result_id(tip) != tip.result_id {
        return Err(VerifyError::ResultChainMismatch(
            "result_id does not reproduce under recomputation".to_string(),
        ));
    }
    if compute_result_hash(tip) != tip.result_hash {
        return Err(VerifyError::ResultChainMismatch(
            "result_hash does not reproduce under recomputation".to_string(),
        ));
    }

    Ok(())
}
