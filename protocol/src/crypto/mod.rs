//! # Cryptographic Primitives for Bouncer
//!
//! Hashing and merkle proof verification. That is the whole list, and it
//! should stay that way: the gate only ever *checks* guest trees, it never
//! builds or signs anything.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. The digest comes from `sha2`; this module only fixes the
//! domain tags and the pairing rule so that every tree builder and every
//! verifier agree on the same bytes.

pub mod hash;
pub mod merkle;

pub use hash::{hash_pair, leaf_hash, sha256};
pub use merkle::verify;
