//! Per-layer proof builders (component D): each issues upstream queries,
//! extracts the uniquely matching record(s), validates receipt integrity,
//! and enforces the cross-layer invariants that can only be checked once
//! the next layer's data is in hand.

use crate::client::{ChainEntryRecord, ChainQueryClient};
use crate::error::ProofError;
use certen_types::{Hash32, Layer1, Layer2, Layer3};
use tracing::debug;

fn require_one<'a>(
    records: &'a [ChainEntryRecord],
    context: &str,
    matches: impl Fn(&ChainEntryRecord) -> bool,
) -> Result<&'a ChainEntryRecord, ProofError> {
    let mut found = records.iter().filter(|r| matches(r));
    let first = found.next();
    let extra = found.next();
    match (first, extra) {
        (Some(record), None) => Ok(record),
        (Some(_), Some(_)) => Err(ProofError::AmbiguousSelection {
            context: context.to_string(),
            expected: 1,
            actual: records.iter().filter(|r| matches(r)).count(),
        }),
        (None, _) => Err(ProofError::AmbiguousSelection {
            context: context.to_string(),
            expected: 1,
            actual: 0,
        }),
    }
}

fn require_pair<'a>(
    records: &'a [ChainEntryRecord],
    context: &str,
    name_a: &str,
    name_b: &str,
) -> Result<(&'a ChainEntryRecord, &'a ChainEntryRecord), ProofError> {
    let a = require_one(records, &format!("{context}/{name_a}"), |r| r.name == name_a)?;
    let b = require_one(records, &format!("{context}/{name_b}"), |r| r.name == name_b)?;
    Ok((a, b))
}

/// Build Layer1: proof that `tx_hash` is recorded on `account`'s main
/// chain.
pub async fn build_layer1(
    client: &dyn ChainQueryClient,
    account: &str,
    tx_hash: Hash32,
) -> Result<Layer1, ProofError> {
    let records = client
        .query_chain_entry(account, "main", tx_hash, true)
        .await?;

    let record = require_one(&records, "layer1/main", |r| {
        r.name == "main" && r.entry == tx_hash
    })?;

    record.receipt.require_block_set()?;
    record.receipt.require_start(tx_hash)?;
    record.receipt.validate()?;

    debug!(%tx_hash, bvn_minor_block_index = record.receipt.local_block, "layer1 built");
    Ok(Layer1 {
        tx_chain_index: record.index,
        bvn_minor_block_index: record.receipt.local_block,
        bvn_root_chain_anchor: record.receipt.anchor,
        leaf: tx_hash,
        receipt: record.receipt.clone(),
    })
}

/// Build Layer2: binds `bvn_id`'s root chain to its state tree, observed
/// on the DN at or after `layer1.bvn_minor_block_index`.
pub async fn build_layer2(
    client: &dyn ChainQueryClient,
    bvn_id: &str,
    layer1: &Layer1,
) -> Result<Layer2, ProofError> {
    let records = client
        .query_anchor_pair(bvn_id, layer1.bvn_minor_block_index)
        .await?;

    let (root, bpt) = require_pair(&records, "layer2", "root", "bpt")?;

    if root.receipt.anchor != bpt.receipt.anchor || root.receipt.local_block != bpt.receipt.local_block {
        return Err(ProofError::PairingViolation);
    }

    root.receipt.validate()?;
    bpt.receipt.validate()?;

    debug!(bvn_id, dn_minor_block_index = root.index, "layer2 built");
    Ok(Layer2 {
        bvn_state_tree_anchor: root.receipt.anchor,
        root_receipt: root.receipt.clone(),
        bpt_receipt: bpt.receipt.clone(),
        dn_minor_block_index: root.index,
    })
}

/// Build Layer3: binds the DN's own state to its self-anchor pair,
/// observed at or after `layer2.dn_minor_block_index`.
pub async fn build_layer3(
    client: &dyn ChainQueryClient,
    layer2: &Layer2,
) -> Result<Layer3, ProofError> {
    let records = client
        .query_anchor_pair("DN", layer2.dn_minor_block_index)
        .await?;

    let (root, bpt) = require_pair(&records, "layer3", "root", "bpt")?;

    if root.receipt.anchor != bpt.receipt.anchor || root.receipt.local_block != bpt.receipt.local_block {
        return Err(ProofError::PairingViolation);
    }

    root.receipt.validate()?;
    bpt.receipt.validate()?;

    if root.index < layer2.dn_minor_block_index {
        return Err(ProofError::OrderingViolation);
    }

    debug!(
        dn_anchor_minor_block_index = layer2.dn_minor_block_index,
        dn_self_anchor_recorded_at_minor_block_index = root.index,
        "layer3 built"
    );
    Ok(Layer3 {
        dn_state_tree_anchor: root.receipt.anchor,
        root_receipt: root.receipt.clone(),
        bpt_receipt: bpt.receipt.clone(),
        dn_anchor_minor_block_index: layer2.dn_minor_block_index,
        dn_self_anchor_recorded_at_minor_block_index: root.index,
        dn_consensus_height: layer2.dn_minor_block_index + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use certen_types::Receipt;

    struct FakeClient {
        main: Vec<ChainEntryRecord>,
        pairs: std::collections::HashMap<String, Vec<ChainEntryRecord>>,
    }

    #[async_trait]
    impl ChainQueryClient for FakeClient {
        async fn query_chain_entry(
            &self,
            _account: &str,
            _chain: &str,
            _entry: Hash32,
            _include_receipt: bool,
        ) -> Result<Vec<ChainEntryRecord>, ProofError> {
            Ok(self.main.clone())
        }

        async fn query_anchor_pair(
            &self,
            target: &str,
            _min_height: u64,
        ) -> Result<Vec<ChainEntryRecord>, ProofError> {
            Ok(self.pairs.get(target).cloned().unwrap_or_default())
        }
    }

    fn receipt_self(start: Hash32) -> Receipt {
        Receipt {
            start,
            anchor: start,
            local_block: 10,
            entries: vec![],
        }
    }

    #[tokio::test]
    async fn happy_path_layer1() {
        let tx_hash = Hash32::digest(b"tx");
        let client = FakeClient {
            main: vec![ChainEntryRecord {
                name: "main".into(),
                entry: tx_hash,
                index: 1,
                receipt: receipt_self(tx_hash),
            }],
            pairs: Default::default(),
        };

        let layer1 = build_layer1(&client, "acct", tx_hash).await.unwrap();
        assert_eq!(layer1.bvn_minor_block_index, 10);
        assert_eq!(layer1.leaf, tx_hash);
    }

    #[tokio::test]
    async fn ambiguous_main_entries_rejected() {
        let tx_hash = Hash32::digest(b"tx");
        let client = FakeClient {
            main: vec![
                ChainEntryRecord {
                    name: "main".into(),
                    entry: tx_hash,
                    index: 1,
                    receipt: receipt_self(tx_hash),
                },
                ChainEntryRecord {
                    name: "main".into(),
                    entry: tx_hash,
                    index: 2,
                    receipt: receipt_self(tx_hash),
                },
            ],
            pairs: Default::default(),
        };

        let err = build_layer1(&client, "acct", tx_hash).await.unwrap_err();
        assert!(matches!(err, ProofError::AmbiguousSelection { .. }));
    }

    #[tokio::test]
    async fn layer2_pairing_violation() {
        let layer1 = Layer1 {
            tx_chain_index: 0,
            bvn_minor_block_index: 1,
            bvn_root_chain_anchor: Hash32::ZERO,
            leaf: Hash32::ZERO,
            receipt: receipt_self(Hash32::ZERO),
        };
        let mut pairs = std::collections::HashMap::new();
        pairs.insert(
            "bvn1".to_string(),
            vec![
                ChainEntryRecord {
                    name: "root".into(),
                    entry: Hash32::digest(b"a"),
                    index: 5,
                    receipt: receipt_self(Hash32::digest(b"a")),
                },
                ChainEntryRecord {
                    name: "bpt".into(),
                    entry: Hash32::digest(b"b"),
                    index: 5,
                    receipt: receipt_self(Hash32::digest(b"b")),
                },
            ],
        );
        let client = FakeClient {
            main: vec![],
            pairs,
        };

        let err = build_layer2(&client, "bvn1", &layer1).await.unwrap_err();
        assert_eq!(err, ProofError::PairingViolation);
    }

    #[tokio::test]
    async fn layer2_happy_path_and_layer3_ordering() {
        let layer1 = Layer1 {
            tx_chain_index: 0,
            bvn_minor_block_index: 1,
            bvn_root_chain_anchor: Hash32::ZERO,
            leaf: Hash32::ZERO,
            receipt: receipt_self(Hash32::ZERO),
        };
        let shared_anchor = Hash32::digest(b"shared");
        let mut pairs = std::collections::HashMap::new();
        pairs.insert(
            "bvn1".to_string(),
            vec![
                ChainEntryRecord {
                    name: "root".into(),
                    entry: shared_anchor,
                    index: 5,
                    receipt: receipt_self(shared_anchor),
                },
                ChainEntryRecord {
                    name: "bpt".into(),
                    entry: shared_anchor,
                    index: 5,
                    receipt: receipt_self(shared_anchor),
                },
            ],
        );
        let dn_anchor = Hash32::digest(b"dn-self");
        pairs.insert(
            "DN".to_string(),
            vec![
                ChainEntryRecord {
                    name: "root".into(),
                    entry: dn_anchor,
                    index: 7,
                    receipt: receipt_self(dn_anchor),
                },
                ChainEntryRecord {
                    name: "bpt".into(),
                    entry: dn_anchor,
                    index: 7,
                    receipt: receipt_self(dn_anchor),
                },
            ],
        );
        let client = FakeClient {
            main: vec![],
            pairs,
        };

        let layer2 = build_layer2(&client, "bvn1", &layer1).await.unwrap();
        assert_eq!(layer2.dn_minor_block_index, 5);

        let layer3 = build_layer3(&client, &layer2).await.unwrap();
        assert_eq!(layer3.dn_anchor_minor_block_index, 5);
        assert_eq!(layer3.dn_self_anchor_recorded_at_minor_block_index, 7);
        assert_eq!(layer3.dn_consensus_height, 6);
    }
}
