//! Layer1/Layer2/Layer3 receipts and the composed `ChainedProof`.
//!
//! These are plain data types; construction and cross-layer invariant
//! enforcement live in `certen-proof`, keeping invariants out of the
//! struct definitions themselves.

use crate::hash::Hash32;
use crate::receipt::Receipt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Proves a transaction is recorded on a partition's main chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer1 {
    pub tx_chain_index: u64,
    pub bvn_minor_block_index: u64,
    pub bvn_root_chain_anchor: Hash32,
    pub leaf: Hash32,
    pub receipt: Receipt,
}

/// Binds a partition's root chain to that partition's state tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer2 {
    pub bvn_state_tree_anchor: Hash32,
    pub root_receipt: Receipt,
    pub bpt_receipt: Receipt,
    pub dn_minor_block_index: u64,
}

/// Binds partition state to the root network (DN).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer3 {
    pub dn_state_tree_anchor: Hash32,
    pub root_receipt: Receipt,
    pub bpt_receipt: Receipt,
    pub dn_anchor_minor_block_index: u64,
    pub dn_self_anchor_recorded_at_minor_block_index: u64,
    pub dn_consensus_height: u64,
}

/// The full three-layer chained proof for a single transaction.
///
/// `artifacts` is an optional mapping from file-label to raw-response bytes,
/// kept only for forensic replay. It is never part of the verification
/// contract: `CrossLayerVerifier` must never read it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainedProof {
    pub input: ChainedProofInput,
    pub layer1: Layer1,
    pub layer2: Layer2,
    pub layer3: Layer3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<BTreeMap<String, Vec<u8>>>,
}

/// The transaction identity a `ChainedProof` was built for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainedProofInput {
    pub account: String,
    pub tx_hash: Hash32,
    pub bvn_id: String,
}
