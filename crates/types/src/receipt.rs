//! Single-layer Merkle receipt: a path from a leaf to an anchor root.

use crate::hash::{hash_pair, Hash32};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One step of a receipt's path from `start` to `anchor`.
///
/// `right = true` means the sibling is on the right: `next = H(current ||
/// sibling)`. Otherwise the sibling is on the left: `next = H(sibling ||
/// current)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptStep {
    pub hash: Hash32,
    pub right: bool,
}

/// A single-layer Merkle receipt.
///
/// Invariant: walking `start` through `entries` under `H(left||right) =
/// SHA-256(left||right)` must yield `anchor`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub start: Hash32,
    pub anchor: Hash32,
    pub local_block: u64,
    pub entries: Vec<ReceiptStep>,
}

/// Errors constructing or validating a `Receipt`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReceiptError {
    /// Re-walking `start` through `entries` did not reproduce `anchor`.
    #[error("receipt walk does not reproduce anchor")]
    MerkleMismatch,

    /// `local_block == 0` where the caller required a nonzero block.
    #[error("receipt local_block is zero but a nonzero block was required")]
    MissingReceiptBlock,

    /// `receipt.start` did not match an expected leaf value.
    #[error("receipt start does not match expected leaf")]
    ReceiptStartMismatch,

    /// `receipt.anchor` did not match an expected anchor value.
    #[error("receipt anchor does not match expected anchor")]
    ReceiptAnchorMismatch,
}

impl Receipt {
    /// Recompute the anchor by walking `start` through `entries`.
    pub fn compute_root(start: Hash32, entries: &[ReceiptStep]) -> Hash32 {
        let mut current = start;
        for step in entries {
            current = if step.right {
                hash_pair(&current, &step.hash)
            } else {
                hash_pair(&step.hash, &current)
            };
        }
        current
    }

    /// Validate that this receipt's path reproduces its declared anchor.
    ///
    /// All failures are fatal to the owning layer's construction: the first
    /// mismatch between the computed and declared anchor rejects the whole
    /// receipt, there is no partial acceptance.
    pub fn validate(&self) -> Result<(), ReceiptError> {
        let computed = Self::compute_root(self.start, &self.entries);
        if computed != self.anchor {
            return Err(ReceiptError::MerkleMismatch);
        }
        Ok(())
    }

    /// Require that the start leaf matches an expected value.
    pub fn require_start(&self, expected: Hash32) -> Result<(), ReceiptError> {
        if self.start != expected {
            return Err(ReceiptError::ReceiptStartMismatch);
        }
        Ok(())
    }

    /// Require that the anchor matches an expected value.
    pub fn require_anchor(&self, expected: Hash32) -> Result<(), ReceiptError> {
        if self.anchor != expected {
            return Err(ReceiptError::ReceiptAnchorMismatch);
        }
        Ok(())
    }

    /// Require a nonzero `local_block`.
    pub fn require_block_set(&self) -> Result<(), ReceiptError> {
        if self.local_block == 0 {
            return Err(ReceiptError::MissingReceiptBlock);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(b: u8) -> Hash32 {
        Hash32::digest(&[b])
    }

    #[test]
    fn empty_path_requires_start_equals_anchor() {
        let start = leaf(1);
        let r = Receipt {
            start,
            anchor: start,
            local_block: 1,
            entries: vec![],
        };
        assert!(r.validate().is_ok());
    }

    #[test]
    fn single_step_recomputes_anchor() {
        let start = leaf(1);
        let sibling = leaf(2);
        let anchor = hash_pair(&start, &sibling);
        let r = Receipt {
            start,
            anchor,
            local_block: 5,
            entries: vec![ReceiptStep {
                hash: sibling,
                right: true,
            }],
        };
        assert!(r.validate().is_ok());
    }

    #[test]
    fn tampered_step_fails_validation() {
        let start = leaf(1);
        let sibling = leaf(2);
        let anchor = hash_pair(&start, &sibling);
        let mut r = Receipt {
            start,
            anchor,
            local_block: 5,
            entries: vec![ReceiptStep {
                hash: sibling,
                right: true,
            }],
        };
        r.entries[0].hash = leaf(99);
        assert_eq!(r.validate(), Err(ReceiptError::MerkleMismatch));
    }

    #[test]
    fn flipping_right_flag_fails_validation() {
        let start = leaf(1);
        let sibling = leaf(2);
        let anchor = hash_pair(&start, &sibling);
        let r = Receipt {
            start,
            anchor,
            local_block: 5,
            entries: vec![ReceiptStep {
                hash: sibling,
                right: false,
            }],
        };
        assert_eq!(r.validate(), Err(ReceiptError::MerkleMismatch));
    }

    #[test]
    fn hex_and_binary_encodings_validate_identically() {
        let start = leaf(7);
        let sibling = leaf(8);
        let anchor = hash_pair(&start, &sibling);
        let r = Receipt {
            start,
            anchor,
            local_block: 1,
            entries: vec![ReceiptStep {
                hash: sibling,
                right: true,
            }],
        };
        let json = serde_json::to_string(&r).unwrap();
        let back: Receipt = serde_json::from_str(&json).unwrap();
        assert_eq!(back.validate(), r.validate());
        assert_eq!(back, r);
    }

    #[test]
    fn missing_block_detected() {
        let r = Receipt {
            start: leaf(1),
            anchor: leaf(1),
            local_block: 0,
            entries: vec![],
        };
        assert_eq!(r.require_block_set(), Err(ReceiptError::MissingReceiptBlock));
    }
}
