//! External collaborator traits: upstream chain-entry queries and
//! consensus commit queries. This crate only defines the contract; no
//! real network client lives here, only in-memory test doubles under
//! `#[cfg(test)]`.

use crate::error::{ConsensusError, ProofError};
use async_trait::async_trait;
use certen_types::{Hash32, Receipt};

/// A single chain-entry record as returned by an upstream query: either a
/// transaction's own main-chain entry (L1), or one half of a root/BPT
/// anchor pair (L2, L3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEntryRecord {
    pub name: String,
    pub entry: Hash32,
    pub index: u64,
    pub receipt: Receipt,
}

/// A consensus commit header, reduced to the one field proofs care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitHeader {
    pub app_hash: Vec<u8>,
}

/// Upstream chain-entry and anchor-pair queries (external interface #1).
///
/// Implementations MUST fail closed: if the upstream response does not
/// match the expected shape, return whatever records were actually
/// present and let the builder's cardinality check reject it, rather than
/// silently picking one.
#[async_trait]
pub trait ChainQueryClient: Send + Sync {
    /// Query a single chain entry by its exact value. Used by `build_layer1`
    /// to locate a transaction's main-chain record.
    async fn query_chain_entry(
        &self,
        account: &str,
        chain: &str,
        entry: Hash32,
        include_receipt: bool,
    ) -> Result<Vec<ChainEntryRecord>, ProofError>;

    /// Query the root/BPT anchor pair for `target` (a BVN id, or the
    /// literal DN self-anchor), observed at a DN height `>= min_height`.
    async fn query_anchor_pair(
        &self,
        target: &str,
        min_height: u64,
    ) -> Result<Vec<ChainEntryRecord>, ProofError>;
}

/// Consensus commit queries (external interface #2).
#[async_trait]
pub trait ConsensusClient: Send + Sync {
    /// Fetch the commit header at `height`.
    async fn commit(&self, height: u64) -> Result<CommitHeader, ConsensusError>;
}
