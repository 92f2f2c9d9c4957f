//! # Hashing Utilities
//!
//! Bouncer needs exactly one hash function: SHA-256. Guest trees are built
//! by off-chain tooling in whatever language the operator prefers, and
//! SHA-256 is the one digest every one of those ecosystems ships.
//!
//! ## Domain separation
//!
//! Leaves and interior nodes are hashed under different tags
//! ([`LEAF_DOMAIN`] and [`NODE_DOMAIN`]). Without the split, a 64-byte
//! interior node preimage could be replayed as a leaf and "prove" an
//! address that was never in the tree.
//!
//! ## Canonical pairing
//!
//! [`hash_pair`] sorts its operands before hashing, so a proof is just a
//! list of siblings with no left/right flags. Trees built this way are
//! verified by [`super::merkle::verify`].

use sha2::{Digest, Sha256};

use crate::config::{LEAF_DOMAIN, NODE_DOMAIN};
use crate::types::{Address, Hash32};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use bouncer_protocol::crypto::sha256;
///
/// let hash = sha256(b"bouncer");
/// assert_eq!(hash.as_bytes().len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Hash32 {
    sha256_multi(&[data])
}

/// Hash multiple byte slices together without concatenation overhead.
///
/// Feeding the parts sequentially into one hasher gives the same digest as
/// hashing their concatenation, minus the temporary buffer.
pub fn sha256_multi(parts: &[&[u8]]) -> Hash32 {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    Hash32::new(output)
}

/// The merkle leaf for a guest address: `SHA-256(LEAF_DOMAIN || address)`.
pub fn leaf_hash(address: &Address) -> Hash32 {
    sha256_multi(&[LEAF_DOMAIN, address.as_bytes()])
}

/// Combine two nodes into their parent:
/// `SHA-256(NODE_DOMAIN || min(a, b) || max(a, b))`.
///
/// Commutative by construction: `hash_pair(a, b) == hash_pair(b, a)`.
pub fn hash_pair(a: &Hash32, b: &Hash32) -> Hash32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    sha256_multi(&[NODE_DOMAIN, lo.as_bytes(), hi.as_bytes()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        // SHA-256 of the empty string.
        let hash = sha256(b"");
        let expected: Hash32 = "0xe3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
            .parse()
            .unwrap();
        assert_eq!(hash, expected);
    }

    #[test]
    fn test_sha256_multi_matches_concatenation() {
        let multi = sha256_multi(&[b"hello", b" world"]);
        let single = sha256(b"hello world");
        assert_eq!(multi, single);
    }

    #[test]
    fn leaf_hash_is_domain_separated() {
        let addr = Address::repeat_byte(7);
        assert_ne!(leaf_hash(&addr), sha256(addr.as_bytes()));
    }

    #[test]
    fn leaf_hash_distinguishes_addresses() {
        assert_ne!(
            leaf_hash(&Address::repeat_byte(1)),
            leaf_hash(&Address::repeat_byte(2))
        );
    }

    #[test]
    fn hash_pair_is_commutative() {
        let a = sha256(b"left");
        let b = sha256(b"right");
        assert_eq!(hash_pair(&a, &b), hash_pair(&b, &a));
    }

    #[test]
    fn hash_pair_is_not_a_leaf() {
        // A parent must never collide with a leaf built from the same bytes.
        let a = Hash32::repeat_byte(1);
        let b = Hash32::repeat_byte(2);
        let plain = sha256_multi(&[a.as_bytes(), b.as_bytes()]);
        assert_ne!(hash_pair(&a, &b), plain);
    }
}
