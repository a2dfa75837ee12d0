//! `CertenNode`: the composition point wiring batch collection, proof
//! building, attestation quorum, the result hash chain, and bundle
//! assembly/verification into one validator-side object.
//!
//! This module's only job is to hold the lower crates' concrete
//! collaborators and call them in the right order. Collaborators are taken
//! as concrete generic parameters rather than trait objects, so a caller
//! who does want dynamic dispatch can still reach for `Box<dyn ...>` at
//! the call site.

use crate::config::{BatchConfig, ConsensusBindConfig};
use certen_attestation::{
    broadcast_and_collect, AttestationResult, PeerTransport, QuorumConfig, QuorumError,
    ValidatorInfo,
};
use certen_batch::{BatchCollector, BatchError, SubmitOutcome};
use certen_bundle::{assemble, verify, BatchInclusion, Bundle, VerifyError};
use certen_crypto::SecretSigningKey;
use certen_proof::{build_layer1, build_layer2, build_layer3, compose, ChainQueryClient, ConsensusClient, ProofError};
use certen_resultchain::ResultHashChain;
use certen_types::{
    AttestationAggregate, Batch, BatchKind, BatchTx, ChainedProof, ChainedProofInput,
    ExternalResult, Hash32, ValidatorId,
};
use std::collections::HashMap;
use std::time::SystemTime;
use tokio::sync::Mutex;
use tracing::info;

/// A single validator's view of the chained proof engine: one batch
/// collector, one set of upstream/consensus/peer collaborators, one
/// result hash chain per target chain.
pub struct CertenNode<Q, C, T>
where
    Q: ChainQueryClient,
    C: ConsensusClient,
    T: PeerTransport,
{
    batch: BatchCollector,
    query_client: Q,
    consensus_client: C,
    transport: T,
    self_id: ValidatorId,
    self_key: SecretSigningKey,
    validators: Vec<ValidatorInfo>,
    quorum_config: QuorumConfig,
    bind_config: ConsensusBindConfig,
    result_chains: Mutex<HashMap<String, ResultHashChain>>,
}

impl<Q, C, T> CertenNode<Q, C, T>
where
    Q: ChainQueryClient,
    C: ConsensusClient,
    T: PeerTransport,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        batch_config: BatchConfig,
        query_client: Q,
        consensus_client: C,
        transport: T,
        self_id: ValidatorId,
        self_key: SecretSigningKey,
        validators: Vec<ValidatorInfo>,
        quorum_config: QuorumConfig,
        bind_config: ConsensusBindConfig,
    ) -> Result<Self, BatchError> {
        Ok(Self {
            batch: BatchCollector::new(batch_config.max_batch_size)?,
            query_client,
            consensus_client,
            transport,
            self_id,
            self_key,
            validators,
            quorum_config,
            bind_config,
            result_chains: Mutex::new(HashMap::new()),
        })
    }

    /// Submit a transaction to the batch collector.
    pub async fn submit_transaction(
        &self,
        tx: BatchTx,
        kind: BatchKind,
        now: SystemTime,
    ) -> Result<SubmitOutcome, BatchError> {
        self.batch.submit(tx, kind, now).await
    }

    /// Force-close an open batch of `kind`, if one exists.
    pub async fn close_batch(&self, kind: BatchKind, now: SystemTime) -> Option<Batch> {
        self.batch.close(kind, now).await
    }

    /// Build the three-layer chained proof for `tx_hash` on `account`,
    /// anchored through `bvn_id`.
    pub async fn build_chained_proof(
        &self,
        account: &str,
        bvn_id: &str,
        tx_hash: Hash32,
    ) -> Result<ChainedProof, ProofError> {
        let layer1 = build_layer1(&self.query_client, account, tx_hash).await?;
        let layer2 = build_layer2(&self.query_client, bvn_id, &layer1).await?;
        let layer3 = build_layer3(&self.query_client, &layer2).await?;

        Ok(compose(
            ChainedProofInput {
                account: account.to_string(),
                tx_hash,
                bvn_id: bvn_id.to_string(),
            },
            layer1,
            layer2,
            layer3,
        ))
    }

    /// Attest a closed batch: sign its Merkle root, broadcast to peers,
    /// and aggregate once the configured weighted threshold is met.
    pub async fn attest_batch(&self, batch: &Batch) -> Result<AttestationResult, QuorumError> {
        let merkle_root = batch.merkle_root.unwrap_or(Hash32::ZERO);
        let tx_hashes: Vec<Hash32> = batch.leaves.iter().map(|tx| tx.tx_hash).collect();
        let tx_count = tx_hashes.len() as u32;
        let block_height = batch.anchor_height.unwrap_or(0);

        let result = broadcast_and_collect(
            &self.transport,
            self.self_id,
            &self.self_key,
            &self.validators,
            batch.batch_id,
            merkle_root,
            tx_hashes,
            tx_count,
            block_height,
            &self.quorum_config,
        )
        .await?;

        info!(
            batch_id = ?batch.batch_id,
            threshold_met = result.aggregate.threshold_met,
            achieved_weight = result.aggregate.achieved_weight,
            "attestation round complete"
        );
        Ok(result)
    }

    /// Append an observed execution outcome to `chain`'s result hash
    /// chain, creating the chain (genesis) on first use.
    pub async fn record_external_result(
        &self,
        chain: &str,
        anchor_proof_hash: Hash32,
        result: ExternalResult,
    ) -> ExternalResult {
        let mut chains = self.result_chains.lock().await;
        let entry = chains
            .entry(chain.to_string())
            .or_insert_with(|| ResultHashChain::genesis(chain, anchor_proof_hash));
        entry.append(result)
    }

    /// Assemble a bundle from its constituent proofs and immediately
    /// verify it end to end, per this node's `ConsensusBindConfig`.
    pub async fn assemble_and_verify_bundle(
        &self,
        chained_proof: ChainedProof,
        batch_inclusion: BatchInclusion,
        attestation_aggregate: AttestationAggregate,
        result_chain_tip: Option<ExternalResult>,
    ) -> Result<Bundle, VerifyError> {
        let bundle = assemble(
            chained_proof,
            batch_inclusion,
            attestation_aggregate,
            result_chain_tip,
        );
        verify(&bundle, &self.consensus_client, self.bind_config.mode).await?;
        Ok(bundle)
    }
}
