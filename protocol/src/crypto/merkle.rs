//! # Merkle Proof Verification
//!
//! Guest lists are published as the root of a binary merkle tree over
//! [`leaf_hash`]es of the admitted addresses. A depositor proves membership
//! by supplying the sibling hashes on the path from their leaf to the root.
//!
//! ```text
//!            root
//!          /      \
//!       n01        n23          proof for B = [A, n23]
//!      /   \      /   \
//!     A     B    C     D
//! ```
//!
//! Pairing is canonical ([`hash_pair`] sorts its inputs), so proofs carry no
//! direction bits. A lone node at the end of an odd level is promoted to the
//! next level unchanged and contributes no proof element.
//!
//! Everything here is pure and fails closed: a proof that cannot be checked
//! is a proof that does not verify.

use crate::config::MAX_PROOF_DEPTH;
use crate::types::{Address, Hash32};

use super::hash::{hash_pair, leaf_hash};

/// Fold `proof` from `leaf` toward the root and return the computed root.
///
/// Returns `None` if the proof is longer than [`MAX_PROOF_DEPTH`].
pub fn process_proof(leaf: Hash32, proof: &[Hash32]) -> Option<Hash32> {
    if proof.len() > MAX_PROOF_DEPTH {
        return None;
    }
    Some(proof.iter().fold(leaf, |node, sibling| hash_pair(&node, sibling)))
}

/// Check that `leaf` is committed to by `root` through `proof`.
///
/// An empty proof verifies iff the leaf *is* the root (single-leaf tree).
/// A zero root paired with a non-empty proof never verifies.
pub fn verify_leaf(root: &Hash32, leaf: Hash32, proof: &[Hash32]) -> bool {
    if root.is_zero() && !proof.is_empty() {
        return false;
    }
    match process_proof(leaf, proof) {
        Some(computed) => computed == *root,
        None => false,
    }
}

/// Check that `address` is a member of the guest tree with root `root`.
///
/// # Example
///
/// ```
/// use bouncer_protocol::crypto::merkle::verify;
/// use bouncer_protocol::crypto::hash::leaf_hash;
/// use bouncer_protocol::Address;
///
/// let guest = Address::repeat_byte(9);
/// let single_leaf_root = leaf_hash(&guest);
/// assert!(verify(&single_leaf_root, &guest, &[]));
/// assert!(!verify(&single_leaf_root, &Address::repeat_byte(8), &[]));
/// ```
pub fn verify(root: &Hash32, address: &Address, proof: &[Hash32]) -> bool {
    let ok = verify_leaf(root, leaf_hash(address), proof);
    tracing::trace!(%root, %address, depth = proof.len(), ok, "merkle proof checked");
    ok
}
