//! Bundle assembly and stateless cross-layer verification: composes a
//! chained proof, batch inclusion path, attestation aggregate, and
//! result-chain tip into one canonically-hashed artifact (component J),
//! then re-checks all of it with no external state beyond an optional
//! consensus client (component K).

pub mod bundle;
pub mod error;
pub mod verify;

pub use bundle::{assemble, BatchInclusion, Bundle};
pub use error::VerifyError;
pub use verify::verify;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use certen_batch::MerkleTree;
    use certen_crypto::SecretSigningKey;
    use certen_proof::{CommitHeader, ConsensusClient, ConsensusError, VerifyMode};
    use certen_types::{
        signing_message, ATTESTATION_DOMAIN, BatchId, ChainedProof, ChainedProofInput, Hash32,
        Layer1, Layer2, Layer3, Receipt,
    };
    use uuid::Uuid;

    fn self_receipt(v: Hash32, local_block: u64) -> Receipt {
        Receipt {
            start: v,
            anchor: v,
            local_block,
            entries: vec![],
        }
    }

    fn sample_chained_proof(tx_hash: Hash32) -> ChainedProof {
        let bvn_anchor = Hash32::digest(b"bvn-state");
        let dn_anchor = Hash32::digest(b"dn-state");

        let layer1 = Layer1 {
            tx_chain_index: 0,
            bvn_minor_block_index: 10,
            bvn_root_chain_anchor: tx_hash,
            leaf: tx_hash,
            receipt: self_receipt(tx_hash, 10),
        };
        let layer2 = Layer2 {
            bvn_state_tree_anchor: bvn_anchor,
            root_receipt: self_receipt(bvn_anchor, 5),
            bpt_receipt: self_receipt(bvn_anchor, 5),
            dn_minor_block_index: 20,
        };
        let layer3 = Layer3 {
            dn_state_tree_anchor: dn_anchor,
            root_receipt: self_receipt(dn_anchor, 7),
            bpt_receipt: self_receipt(dn_anchor, 7),
            dn_anchor_minor_block_index: 20,
            dn_self_anchor_recorded_at_minor_block_index: 21,
            dn_consensus_height: 21,
        };

        certen_proof::compose(
            ChainedProofInput {
                account: "acct".into(),
                tx_hash,
                bvn_id: "bvn1".into(),
            },
            layer1,
            layer2,
            layer3,
        )
    }

    struct PanicsIfCalled;
    #[async_trait]
    impl ConsensusClient for PanicsIfCalled {
        async fn commit(&self, _height: u64) -> Result<CommitHeader, ConsensusError> {
            panic!("must not be called in IntegrityOnly mode")
        }
    }

    #[tokio::test]
    async fn assembled_bundle_verifies_end_to_end() {
        let tx_hash = Hash32::digest(b"tx-1");
        let chained_proof = sample_chained_proof(tx_hash);

        let other_leaf = Hash32::digest(b"tx-2");
        let tree = MerkleTree::build(&[tx_hash, other_leaf]);
        let path = tree.path(0);
        let batch_root = tree.root();

        let batch_id = BatchId(Uuid::from_u128(7));
        let tx_count = 2;
        let block_height = 1000;

        let (sk, pk) = SecretSigningKey::from_seed(&[3u8; 32]).unwrap();
        let msg = signing_message(&batch_id, &batch_root, tx_count, block_height);
        let sig = sk.sign(&msg, ATTESTATION_DOMAIN);
        let message_hash = certen_crypto::signing_digest(ATTESTATION_DOMAIN, &msg);

        let aggregate = certen_types::AttestationAggregate {
            message_hash,
            scheme: "BLS12-381".to_string(),
            aggregated_signature: sig.to_bytes(),
            aggregated_public_key: pk.to_bytes(),
            participants: vec![certen_types::ValidatorId(0)],
            participant_bitfield: vec![0b0000_0001],
            total_weight: 1,
            achieved_weight: 1,
            threshold_weight: 1,
            threshold_met: true,
        };

        let inclusion = BatchInclusion {
            batch_id,
            leaf: tx_hash,
            index: 0,
            path,
            batch_root,
            tx_count,
            block_height,
        };

        let bundle = assemble(chained_proof, inclusion, aggregate, None);

        // bundle_hash is stable under recomputation from the same fields.
        let bundle2 = assemble(
            bundle.chained_proof.clone(),
            bundle.batch_inclusion.clone(),
            bundle.attestation_aggregate.clone(),
            bundle.result_chain_tip.clone(),
        );
        assert_eq!(bundle.bundle_hash, bundle2.bundle_hash);

        assert!(verify(&bundle, &PanicsIfCalled, VerifyMode::IntegrityOnly)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn tampered_inclusion_path_fails_verification() {
        let tx_hash = Hash32::digest(b"tx-1");
        let chained_proof = sample_chained_proof(tx_hash);

        let tree = MerkleTree::build(&[tx_hash, Hash32::digest(b"tx-2")]);
        let mut path = tree.path(0);
        path[0].hash = Hash32::digest(b"wrong sibling");
        let batch_root = tree.root();

        let batch_id = BatchId(Uuid::from_u128(8));
        let (sk, pk) = SecretSigningKey::from_seed(&[4u8; 32]).unwrap();
        let msg = signing_message(&batch_id, &batch_root, 2, 1000);
        let sig = sk.sign(&msg, ATTESTATION_DOMAIN);

        let aggregate = certen_types::AttestationAggregate {
            message_hash: certen_crypto::signing_digest(ATTESTATION_DOMAIN, &msg),
            scheme: "BLS12-381".to_string(),
            aggregated_signature: sig.to_bytes(),
            aggregated_public_key: pk.to_bytes(),
            participants: vec![certen_types::ValidatorId(0)],
            participant_bitfield: vec![0b1],
            total_weight: 1,
            achieved_weight: 1,
            threshold_weight: 1,
            threshold_met: true,
        };

        let inclusion = BatchInclusion {
            batch_id,
            leaf: tx_hash,
            index: 0,
            path,
            batch_root,
            tx_count: 2,
            block_height: 1000,
        };

        let bundle = assemble(chained_proof, inclusion, aggregate, None);
        let err = verify(&bundle, &PanicsIfCalled, VerifyMode::IntegrityOnly)
            .await
            .unwrap_err();
        assert_eq!(err, VerifyError::BatchInclusionFailed);
    }

    #[tokio::test]
    async fn threshold_not_met_fails_verification() {
        let tx_hash = Hash32::digest(b"tx-1");
        let chained_proof = sample_chained_proof(tx_hash);
        let tree = MerkleTree::build(&[tx_hash]);
        let batch_root = tree.root();
        let batch_id = BatchId(Uuid::from_u128(9));
        let (sk, pk) = SecretSigningKey::from_seed(&[5u8; 32]).unwrap();
        let msg = signing_message(&batch_id, &batch_root, 1, 1);
        let sig = sk.sign(&msg, ATTESTATION_DOMAIN);

        let aggregate = certen_types::AttestationAggregate {
            message_hash: certen_crypto::signing_digest(ATTESTATION_DOMAIN, &msg),
            scheme: "BLS12-381".to_string(),
            aggregated_signature: sig.to_bytes(),
            aggregated_public_key: pk.to_bytes(),
            participants: vec![certen_types::ValidatorId(0)],
            participant_bitfield: vec![0b1],
            total_weight: 4,
            achieved_weight: 1,
            threshold_weight: 3,
            threshold_met: false,
        };

        let inclusion = BatchInclusion {
            batch_id,
            leaf: tx_hash,
            index: 0,
            path: tree.path(0),
            batch_root,
            tx_count: 1,
            block_height: 1,
        };

        let bundle = assemble(chained_proof, inclusion, aggregate, None);
        let err = verify(&bundle, &PanicsIfCalled, VerifyMode::IntegrityOnly)
            .await
            .unwrap_err();
        assert_eq!(err, VerifyError::ThresholdNotMet);
    }
}
