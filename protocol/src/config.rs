//! # Protocol Configuration & Constants
//!
//! Every magic number in Bouncer lives here. The hashing tags in particular
//! are part of the wire format: off-chain tooling that builds guest trees
//! must use the exact same bytes, or every proof it hands out is garbage.

use crate::types::Amount;

// ---------------------------------------------------------------------------
// Identity & Hash Widths
// ---------------------------------------------------------------------------

/// Length of an account or vault address in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// Length of a root, leaf, or interior merkle node in bytes.
pub const HASH_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Merkle Parameters
// ---------------------------------------------------------------------------

/// Domain tag prepended to an address before it is hashed into a leaf.
///
/// Keeps a leaf from ever being confused with an interior node, which
/// blocks second-preimage tricks where a node is presented as a leaf.
pub const LEAF_DOMAIN: &[u8] = b"bouncer.guestlist.leaf.v1";

/// Domain tag prepended to every interior node hash.
pub const NODE_DOMAIN: &[u8] = b"bouncer.guestlist.node.v1";

/// Longest proof the verifier will fold. A 64-level tree covers 2^64
/// guests; anything deeper is malformed and rejected outright.
pub const MAX_PROOF_DEPTH: usize = 64;

// ---------------------------------------------------------------------------
// Deposit Caps
// ---------------------------------------------------------------------------

/// A per-user cap of zero disables the per-user check.
pub const USER_CAP_UNCAPPED: Amount = 0;

/// A total cap at the maximum amount disables the aggregate check.
pub const TOTAL_CAP_UNCAPPED: Amount = Amount::MAX;

/// Total cap reported for a vault the owner never configured. Nothing can
/// be deposited into such a vault until a cap is set.
pub const TOTAL_CAP_UNSET: Amount = 0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_tags_are_distinct() {
        assert_ne!(LEAF_DOMAIN, NODE_DOMAIN);
    }

    #[test]
    fn cap_sentinels() {
        assert_eq!(USER_CAP_UNCAPPED, 0);
        assert_eq!(TOTAL_CAP_UNCAPPED, u128::MAX);
        assert_ne!(TOTAL_CAP_UNSET, TOTAL_CAP_UNCAPPED);
    }
}
