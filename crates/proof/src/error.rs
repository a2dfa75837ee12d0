use certen_types::ReceiptError;
use thiserror::Error;

/// Errors from building or verifying a layered proof.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofError {
    /// A receipt failed to recompute its declared anchor, or violated one
    /// of the receipt-level invariants (missing block, start mismatch,
    /// anchor mismatch).
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    /// An upstream chain-entry query did not return exactly the expected
    /// number of matching records.
    #[error("ambiguous selection querying {context}: expected {expected} record(s), got {actual}")]
    AmbiguousSelection {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// A paired root/bpt receipt disagreed on anchor or local block.
    #[error("paired receipts disagree on anchor or local block")]
    PairingViolation,

    /// A monotonicity requirement between layer fields was violated.
    #[error("ordering invariant violated")]
    OrderingViolation,

    /// A required field equality did not hold, either within Layer1
    /// (`receipt.start == leaf == tx_hash`, `receipt.anchor ==
    /// bvn_root_chain_anchor`, `receipt.local_block ==
    /// bvn_minor_block_index`) or across L2/L3 (the DN-anchor link).
    #[error("semantic invariant violated")]
    SemanticViolation,

    /// Consensus binding failed while building a proof.
    #[error(transparent)]
    Consensus(#[from] ConsensusError),
}

/// Errors from binding a layer's state-tree anchor to a consensus commit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsensusError {
    /// The commit at the expected height carried an empty `app_hash`.
    #[error("commit at height {height} has an empty app_hash")]
    EmptyAppHash { height: u64 },

    /// The commit's `app_hash` did not equal the expected state-tree
    /// anchor.
    #[error("commit at height {height} has app_hash {actual} but expected {expected}")]
    AppHashMismatch {
        height: u64,
        expected: String,
        actual: String,
    },
}
