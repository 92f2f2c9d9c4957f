// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Bouncer Protocol: Core Library
//!
//! The primitives every other Bouncer crate leans on. Nothing in here holds
//! mutable state of its own; the contracts crate owns the state machines and
//! calls down into these modules for hashing, proof checking, and talking to
//! the vaults and tokens it guards.
//!
//! ## Architecture
//!
//! - **types**: `Address`, `Hash32` and `Amount`, with hex wire formats.
//! - **config**: Protocol constants (domain tags, proof limits, cap sentinels).
//! - **crypto**: SHA-256 hashing and stateless merkle proof verification.
//! - **vault**: The vault and token collaborators, as traits plus in-memory
//!   implementations for tests and tooling.
//!
//! ## Design Philosophy
//!
//! 1. Verification fails closed. A bad proof is `false`, never a panic.
//! 2. The all-zero hash means "unset" everywhere. No `Option<Hash32>` games.
//! 3. If it touches money, it has tests. Plural.

pub mod config;
pub mod crypto;
pub mod types;
pub mod vault;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use types::{Address, Amount, Hash32, VaultId};
