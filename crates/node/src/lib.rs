//! Orchestration, configuration, and tracing setup for a single validator's
//! chained proof engine: composes `certen-batch`, `certen-proof`,
//! `certen-attestation`, `certen-resultchain`, and `certen-bundle` into one
//! `CertenNode`.

pub mod config;
pub mod node;
pub mod telemetry;

pub use config::{default_quorum_config, BatchConfig, ConsensusBindConfig};
pub use node::CertenNode;
pub use telemetry::init_tracing;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use certen_attestation::{AttestationRequest, PeerTransport, TransportError, ValidatorInfo};
    use certen_crypto::SecretSigningKey;
    use certen_proof::{ChainEntryRecord, ChainQueryClient, CommitHeader, ConsensusClient, ConsensusError, ProofError, VerifyMode};
    use certen_types::{
        Attestation, BatchKind, BatchTx, ExecutionOutcome, ExecutionStatus, ExternalResult, Hash32,
        Receipt, ValidatorId,
    };
    use std::time::SystemTime;

    struct StubQuery;
    #[async_trait]
    impl ChainQueryClient for StubQuery {
        async fn query_chain_entry(
            &self,
            _account: &str,
            _chain: &str,
            entry: Hash32,
            _include_receipt: bool,
        ) -> Result<Vec<ChainEntryRecord>, ProofError> {
            Ok(vec![ChainEntryRecord {
                name: "main".into(),
                entry,
                index: 1,
                receipt: Receipt {
                    start: entry,
                    anchor: entry,
                    local_block: 10,
                    entries: vec![],
                },
            }])
        }

        async fn query_anchor_pair(
            &self,
            _target: &str,
            min_height: u64,
        ) -> Result<Vec<ChainEntryRecord>, ProofError> {
            let anchor = Hash32::digest(b"anchor");
            let receipt = Receipt {
                start: anchor,
                anchor,
                local_block: min_height + 1,
                entries: vec![],
            };
            Ok(vec![
                ChainEntryRecord {
                    name: "root".into(),
                    entry: anchor,
                    index: min_height + 1,
                    receipt: receipt.clone(),
                },
                ChainEntryRecord {
                    name: "bpt".into(),
                    entry: anchor,
                    index: min_height + 1,
                    receipt,
                },
            ])
        }
    }

    struct PanicsIfCalled;
    #[async_trait]
    impl ConsensusClient for PanicsIfCalled {
        async fn commit(&self, _height: u64) -> Result<CommitHeader, ConsensusError> {
            panic!("integrity-only bind config must not call consensus")
        }
    }

    struct NoPeersTransport;
    #[async_trait]
    impl PeerTransport for NoPeersTransport {
        async fn request_attestation(
            &self,
            _peer: ValidatorId,
            _request: AttestationRequest,
        ) -> Result<Attestation, TransportError> {
            Err(TransportError::Unreachable(
                ValidatorId(0),
                "no peers in this test".to_string(),
            ))
        }
    }

    fn node() -> CertenNode<StubQuery, PanicsIfCalled, NoPeersTransport> {
        let (self_key, self_pk) = SecretSigningKey::from_seed(&[9u8; 32]).unwrap();
        let validators = vec![ValidatorInfo {
            id: ValidatorId(0),
            public_key: self_pk,
            voting_power: 1,
        }];
        CertenNode::new(
            BatchConfig::with_max_batch_size(10),
            StubQuery,
            PanicsIfCalled,
            NoPeersTransport,
            ValidatorId(0),
            self_key,
            validators,
            default_quorum_config(),
            ConsensusBindConfig::integrity_only(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn submit_and_close_then_attest_with_self_only_quorum() {
        let node = node();
        let tx_hash = Hash32::digest(b"tx-1");
        let now = SystemTime::UNIX_EPOCH;

        node.submit_transaction(
            BatchTx {
                tx_hash,
                account_ref: "acct".to_string(),
                chained_proof_ref: None,
                governance_ref: None,
                submitted_at: now,
            },
            BatchKind::OnDemand,
            now,
        )
        .await
        .unwrap();

        let batch = node.close_batch(BatchKind::OnDemand, now).await;
        assert!(batch.is_none(), "OnDemand batch already closed synchronously");
    }

    #[tokio::test]
    async fn build_chained_proof_from_stub_client() {
        let node = node();
        let tx_hash = Hash32::digest(b"tx-1");
        let proof = node
            .build_chained_proof("acct", "bvn1", tx_hash)
            .await
            .unwrap();
        assert_eq!(proof.layer1.leaf, tx_hash);
        assert_eq!(proof.input.tx_hash, tx_hash);
    }

    #[tokio::test]
    async fn attest_batch_reaches_self_only_quorum() {
        let node = node();
        let tx_hash = Hash32::digest(b"tx-1");
        let now = SystemTime::UNIX_EPOCH;

        let outcome = node
            .submit_transaction(
                BatchTx {
                    tx_hash,
                    account_ref: "acct".to_string(),
                    chained_proof_ref: None,
                    governance_ref: None,
                    submitted_at: now,
                },
                BatchKind::OnDemand,
                now,
            )
            .await
            .unwrap();

        let batch = match outcome {
            certen_batch::SubmitOutcome::Closed(batch) => batch,
            other => panic!("expected Closed, got {other:?}"),
        };

        let result = node.attest_batch(&batch).await.unwrap();
        assert!(result.aggregate.threshold_met);
        assert_eq!(result.aggregate.achieved_weight, 1);
    }

    #[tokio::test]
    async fn record_external_result_appends_to_fresh_chain() {
        let node = node();
        let anchor = Hash32::digest(b"anchor-proof");
        let result = ExternalResult {
            chain: "eth-mainnet".to_string(),
            chain_id: 1,
            tx_hash: Hash32::digest(b"tx-1"),
            block_number: 100,
            block_hash: Hash32::digest(b"block-100"),
            block_time: 1_700_000_000,
            transactions_root: Hash32::digest(b"txs"),
            receipts_root: Hash32::digest(b"receipts"),
            state_root: Hash32::digest(b"state"),
            outcome: ExecutionOutcome {
                status: ExecutionStatus::Success,
                gas_used: 21000,
                logs_hash: Hash32::digest(b"logs"),
                return_data: vec![],
            },
            tx_inclusion_proof: None,
            receipt_inclusion_proof: None,
            result_id: Hash32::ZERO,
            previous_result_hash: Hash32::ZERO,
            anchor_proof_hash: Hash32::ZERO,
            sequence_number: 0,
            result_hash: Hash32::ZERO,
        };

        let appended = node
            .record_external_result("eth-mainnet", anchor, result)
            .await;
        assert!(appended.previous_result_hash.is_zero());
        assert_eq!(appended.sequence_number, 0);
        assert_eq!(appended.anchor_proof_hash, anchor);
    }

    #[test]
    fn bind_config_defaults_to_proof_grade() {
        assert!(matches!(
            ConsensusBindConfig::default().mode,
            VerifyMode::ProofGrade
        ));
        assert!(matches!(
            ConsensusBindConfig::integrity_only().mode,
            VerifyMode::IntegrityOnly
        ));
    }
}
