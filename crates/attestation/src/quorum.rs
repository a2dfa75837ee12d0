//! Quorum collector (component H): produces a self-attestation, gathers
//! peer attestations over a bounded-concurrency transport, verifies each
//! against the expected message and the peer's known public key, and
//! aggregates once a weighted threshold is met or the collection window
//! elapses.
//!
//! Accumulate-by-weight, check-quorum-on-every-insert, generalized to one
//! fixed root, weighted BLS threshold, bounded concurrency and per-peer
//! timeouts.

use crate::transport::{AttestationRequest, PeerTransport};
use certen_crypto::{signing_digest, PublicKey, SecretSigningKey, Signature};
use certen_types::{
    signing_message, Attestation, AttestationAggregate, BatchId, Hash32, ValidatorId,
    ATTESTATION_DOMAIN,
};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Errors that prevent quorum collection from even starting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuorumError {
    #[error("threshold denominator must be nonzero")]
    InvalidThreshold,
    #[error("validator set must be nonempty")]
    EmptyValidatorSet,
    #[error("self validator id {0:?} not present in the validator set")]
    SelfNotInValidatorSet(ValidatorId),
}

/// A known validator's identity and voting weight.
#[derive(Debug, Clone)]
pub struct ValidatorInfo {
    pub id: ValidatorId,
    pub public_key: PublicKey,
    pub voting_power: u64,
}

/// Threshold and concurrency configuration for one collection round.
#[derive(Debug, Clone)]
pub struct QuorumConfig {
    /// Threshold fraction numerator, e.g. `2` for two-thirds.
    pub numerator: u64,
    /// Threshold fraction denominator, e.g. `3` for two-thirds.
    pub denominator: u64,
    /// Minimum number of distinct validators required, on top of the
    /// weight threshold.
    pub min_validators: usize,
    /// Maximum number of in-flight peer requests.
    pub concurrent_requests: usize,
    /// Per-peer request timeout.
    pub per_peer_timeout: Duration,
    /// Overall collection deadline, bounding all per-peer timeouts.
    pub overall_timeout: Duration,
}

/// `⌊total * numerator / denominator⌋ + 1`.
pub fn threshold_weight(total: u64, numerator: u64, denominator: u64) -> u64 {
    (total * numerator) / denominator + 1
}

/// Outcome of one `broadcast_and_collect` call.
#[derive(Debug, Clone)]
pub struct AttestationResult {
    pub aggregate: AttestationAggregate,
    pub attestations: Vec<Attestation>,
}

/// Produce a self-attestation, broadcast to every other validator in
/// `validators`, and aggregate once the weighted threshold is met or
/// `config.overall_timeout` elapses.
pub async fn broadcast_and_collect(
    transport: &dyn PeerTransport,
    self_id: ValidatorId,
    self_key: &SecretSigningKey,
    validators: &[ValidatorInfo],
    batch_id: BatchId,
    merkle_root: Hash32,
    tx_hashes: Vec<Hash32>,
    tx_count: u32,
    block_height: u64,
    config: &QuorumConfig,
) -> Result<AttestationResult, QuorumError> {
    if config.denominator == 0 {
        return Err(QuorumError::InvalidThreshold);
    }
    if validators.is_empty() {
        return Err(QuorumError::EmptyValidatorSet);
    }
    let self_info = validators
        .iter()
        .find(|v| v.id == self_id)
        .ok_or(QuorumError::SelfNotInValidatorSet(self_id))?;

    let total_weight: u64 = validators.iter().map(|v| v.voting_power).sum();
    let threshold = threshold_weight(total_weight, config.numerator, config.denominator);

    let msg = signing_message(&batch_id, &merkle_root, tx_count, block_height);
    let message_hash = signing_digest(ATTESTATION_DOMAIN, &msg);

    let mut accepted: BTreeMap<ValidatorId, Attestation> = BTreeMap::new();

    let self_sig = self_key.sign(&msg, ATTESTATION_DOMAIN);
    accepted.insert(
        self_id,
        Attestation {
            batch_id,
            validator_id: self_id,
            merkle_root,
            tx_count,
            block_height,
            public_key: self_info.public_key.to_bytes(),
            signature: self_sig.to_bytes(),
            domain: ATTESTATION_DOMAIN.to_string(),
            timestamp: SystemTime::now(),
        },
    );
    let mut achieved_weight = self_info.voting_power;

    let by_id: BTreeMap<ValidatorId, &ValidatorInfo> = validators.iter().map(|v| (v.id, v)).collect();
    let quorum_already_met =
        |weight: u64, count: usize| weight >= threshold && count >= config.min_validators;

    if !quorum_already_met(achieved_weight, accepted.len()) {
        let semaphore = Arc::new(Semaphore::new(config.concurrent_requests.max(1)));
        let peers: Vec<ValidatorId> = validators
            .iter()
            .map(|v| v.id)
            .filter(|id| *id != self_id)
            .collect();

        let now = SystemTime::now();
        let expires_at = now + config.overall_timeout;
        let mut in_flight = FuturesUnordered::new();
        for peer in peers {
            let semaphore = semaphore.clone();
            let request = AttestationRequest {
                batch_id,
                merkle_root,
                tx_hashes: tx_hashes.clone(),
                tx_count,
                block_height,
                requester_id: self_id,
                timestamp: now,
                expires_at,
            };
            let per_peer_timeout = config.per_peer_timeout;
            in_flight.push(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore not closed");
                let call = transport.request_attestation(peer, request);
                (peer, tokio::time::timeout(per_peer_timeout, call).await)
            });
        }

        let collection = async {
            while let Some((peer, outcome)) = in_flight.next().await {
                match outcome {
                    Ok(Ok(attestation)) => {
                        if accepted.contains_key(&peer) {
                            continue;
                        }
                        let Some(info) = by_id.get(&peer) else {
                            warn!(?peer, "attestation from unknown validator, ignoring");
                            continue;
                        };
                        if !verify_attestation(&attestation, info, &msg, merkle_root) {
                            warn!(?peer, "attestation failed verification, ignoring");
                            continue;
                        }
                        achieved_weight += info.voting_power;
                        accepted.insert(peer, attestation);
                        debug!(?peer, achieved_weight, threshold, "accepted attestation");
                        if quorum_already_met(achieved_weight, accepted.len()) {
                            break;
                        }
                    }
                    Ok(Err(err)) => warn!(?peer, %err, "peer rejected attestation request"),
                    Err(_) => warn!(?peer, "peer attestation request timed out"),
                }
            }
        };

        tokio::time::timeout(config.overall_timeout, collection)
            .await
            .ok();
    }

    let threshold_met = quorum_already_met(achieved_weight, accepted.len());

    let participants: Vec<ValidatorId> = accepted.keys().copied().collect();
    let participant_bitfield = build_bitfield(validators, &participants);

    let (aggregated_signature, aggregated_public_key) = if accepted.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        let sigs: Vec<Signature> = accepted
            .values()
            .map(|a| Signature::from_bytes(&a.signature).expect("accepted attestations carry valid signatures"))
            .collect();
        let pks: Vec<PublicKey> = accepted
            .keys()
            .map(|id| by_id[id].public_key.clone())
            .collect();
        (
            Signature::aggregate(&sigs).expect("nonempty").to_bytes(),
            PublicKey::aggregate(&pks).expect("nonempty").to_bytes(),
        )
    };

    let aggregate = AttestationAggregate {
        message_hash,
        scheme: "BLS12-381".to_string(),
        aggregated_signature,
        aggregated_public_key,
        participants,
        participant_bitfield,
        total_weight,
        achieved_weight,
        threshold_weight: threshold,
        threshold_met,
    };

    Ok(AttestationResult {
        aggregate,
        attestations: accepted.into_values().collect(),
    })
}

fn verify_attestation(
    attestation: &Attestation,
    expected: &ValidatorInfo,
    msg: &[u8],
    expected_root: Hash32,
) -> bool {
    if attestation.merkle_root != expected_root {
        return false;
    }
    if attestation.domain != ATTESTATION_DOMAIN {
        return false;
    }
    let Ok(sig) = Signature::from_bytes(&attestation.signature) else {
        return false;
    };
    expected.public_key.verify(msg, ATTESTATION_DOMAIN, &sig)
}

fn build_bitfield(validators: &[ValidatorInfo], participants: &[ValidatorId]) -> Vec<u8> {
    let mut bits = vec![0u8; validators.len().div_ceil(8)];
    for (i, v) in validators.iter().enumerate() {
        if participants.contains(&v.id) {
            bits[i / 8] |= 1 << (i % 8);
        }
    }
    bits
}
