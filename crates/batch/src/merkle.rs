//! Deterministic binary Merkle tree with odd-leaf duplication.
//!
//! Used both for the batch aggregator (leaves are attested transaction
//! hashes) and for the governance Merkle root (leaves are governance-proof
//! hashes there) — the same `build`/`root`/`path` functions serve both
//! callers.

use certen_types::{hash_pair, Hash32, ReceiptStep};

/// A built Merkle tree: every level from the leaves up to the root.
///
/// `levels[0]` holds the original (unpadded) leaves; each subsequent level
/// holds the parent hashes. Odd-length levels are paired by duplicating
/// the last element only at pairing time — the duplicate is never stored,
/// so `levels[0].len()` always equals the original leaf count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTree {
    levels: Vec<Vec<Hash32>>,
}

impl MerkleTree {
    /// Build a tree over `leaves`, in order.
    ///
    /// An empty input yields the all-zero root. A single leaf is its own
    /// root (no self-pairing).
    pub fn build(leaves: &[Hash32]) -> Self {
        if leaves.is_empty() {
            return Self { levels: vec![] };
        }

        let mut levels = vec![leaves.to_vec()];
        let mut current = leaves.to_vec();
        while current.len() > 1 {
            let len = current.len();
            let next_len = len.div_ceil(2);
            let mut next = Vec::with_capacity(next_len);
            for i in 0..next_len {
                let left = current[2 * i];
                let right = if 2 * i + 1 < len {
                    current[2 * i + 1]
                } else {
                    // Odd level: duplicate the last leaf.
                    current[len - 1]
                };
                next.push(hash_pair(&left, &right));
            }
            levels.push(next.clone());
            current = next;
        }
        Self { levels }
    }

    /// The tree's root. Zero for an empty tree.
    pub fn root(&self) -> Hash32 {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(Hash32::ZERO)
    }

    /// Number of original leaves.
    pub fn len(&self) -> usize {
        self.levels.first().map_or(0, |l| l.len())
    }

    /// `true` iff the tree has no leaves.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build the inclusion proof for leaf `index`.
    ///
    /// Panics if `index` is out of bounds.
    pub fn path(&self, index: usize) -> Vec<ReceiptStep> {
        assert!(index < self.len(), "leaf index out of bounds");

        let mut steps = Vec::new();
        let mut idx = index;
        for level in &self.levels[..self.levels.len().saturating_sub(1)] {
            let len = level.len();
            let is_left = idx % 2 == 0;
            let sibling_idx = if is_left { idx + 1 } else { idx - 1 };
            let sibling_hash = if sibling_idx < len {
                level[sibling_idx]
            } else {
                // Odd level: the duplicated last leaf is its own sibling.
                level[len - 1]
            };
            steps.push(ReceiptStep {
                hash: sibling_hash,
                right: is_left,
            });
            idx /= 2;
        }
        steps
    }
}

/// Verify that `leaf` is included in `root` at `index` via `path`.
pub fn verify(leaf: Hash32, index: usize, path: &[ReceiptStep], root: Hash32) -> bool {
    let mut current = leaf;
    let mut idx = index;
    for step in path {
        current = if step.right {
            hash_pair(&current, &step.hash)
        } else {
            hash_pair(&step.hash, &current)
        };
        idx /= 2;
    }
    current == root
}
