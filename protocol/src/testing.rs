//! Guest-tree construction for tests, benches and fixtures.
//!
//! Production trees are built off-chain; this builder exists so that the
//! verifier can be exercised against trees that follow the exact same
//! pairing rule. Enabled under `cfg(test)` or the `test-utils` feature.

use std::collections::HashMap;

use crate::crypto::hash::{hash_pair, leaf_hash};
use crate::types::{Address, Hash32};

/// A fully materialized guest tree.
#[derive(Debug, Clone)]
pub struct GuestTree {
    /// `levels[0]` holds the leaves, the last level holds the root.
    levels: Vec<Vec<Hash32>>,
    /// Leaf position of each member.
    positions: HashMap<Address, usize>,
}

impl GuestTree {
    /// Builds a tree over `members` in the given order. Duplicates keep
    /// their first position.
    pub fn new(members: &[Address]) -> Self {
        let mut positions = HashMap::new();
        for (i, m) in members.iter().enumerate() {
            positions.entry(*m).or_insert(i);
        }

        let mut levels = vec![members.iter().map(leaf_hash).collect::<Vec<_>>()];
        while levels.last().map_or(0, Vec::len) > 1 {
            let next = levels
                .last()
                .map(|level| {
                    level
                        .chunks(2)
                        .map(|pair| match pair {
                            [a, b] => hash_pair(a, b),
                            [lone] => *lone,
                            _ => unreachable!("chunks(2) yields one or two nodes"),
                        })
                        .collect()
                })
                .unwrap_or_default();
            levels.push(next);
        }

        Self { levels, positions }
    }

    /// The tree root, or [`Hash32::ZERO`] for an empty tree.
    pub fn root(&self) -> Hash32 {
        self.levels
            .last()
            .and_then(|top| top.first().copied())
            .unwrap_or(Hash32::ZERO)
    }

    /// The sibling path for `member`, or `None` if it is not in the tree.
    pub fn proof(&self, member: &Address) -> Option<Vec<Hash32>> {
        let mut index = *self.positions.get(member)?;
        let mut proof = Vec::new();
        for level in &self.levels[..self.levels.len() - 1] {
            if let Some(sibling) = level.get(index ^ 1) {
                proof.push(*sibling);
            }
            index /= 2;
        }
        Some(proof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_has_zero_root() {
        assert_eq!(GuestTree::new(&[]).root(), Hash32::ZERO);
    }

    #[test]
    fn two_leaf_root_is_their_pair() {
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        let tree = GuestTree::new(&[a, b]);
        assert_eq!(tree.root(), hash_pair(&leaf_hash(&a), &leaf_hash(&b)));
        assert_eq!(tree.proof(&a).unwrap(), vec![leaf_hash(&b)]);
    }

    #[test]
    fn lone_node_is_promoted() {
        let members: Vec<_> = (1..=3).map(Address::repeat_byte).collect();
        let tree = GuestTree::new(&members);
        // The third leaf has no sibling on the bottom level.
        assert_eq!(tree.proof(&members[2]).unwrap().len(), 1);
        assert_eq!(tree.proof(&members[0]).unwrap().len(), 2);
    }

    #[test]
    fn unknown_member_has_no_proof() {
        let tree = GuestTree::new(&[Address::repeat_byte(1)]);
        assert!(tree.proof(&Address::repeat_byte(2)).is_none());
    }
}
