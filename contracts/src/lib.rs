//! # Bouncer Contracts
//!
//! The stateful half of Bouncer. Two independent engines live here:
//!
//! - **Access Gate**: decides whether a depositor may put an amount into a
//!   vault. Layers a global ban list, per-vault manual guest lists, and
//!   merkle-rooted guest trees, then enforces per-user and per-vault deposit
//!   caps through the **Cap Ledger**.
//! - **Registry**: a per-author directory of vaults, plus a governance list
//!   of promoted vaults.
//!
//! Around them sit the **Deposit Router** (admission wired to the token and
//! vault collaborators), a **Shared** handle that serializes access across
//! threads, and serde **config** documents that seed both engines.
//!
//! ## Design Principles
//!
//! 1. Every privileged call takes the caller explicitly. No ambient identity.
//! 2. Errors abort the whole call. Nothing is half-written.
//! 3. No-ops are outcomes, not errors. `AlreadyPresent` is a success.
//! 4. State transitions are explicit: enum variants, not boolean flags.

pub mod access_gate;
pub mod cap_ledger;
pub mod config;
pub mod registry;
pub mod router;
pub mod shared;

pub use access_gate::{
    AccessGate, AccessGrant, Admission, Denial, EffectiveRoot, GateError, Invitation, RootOverride,
};
pub use cap_ledger::{CapLedger, VaultCaps};
pub use config::{AuthorListing, ConfigError, GateConfig, RegistryConfig, VaultPolicy};
pub use registry::{
    AddOutcome, PromoteOutcome, Registry, RegistryError, RemoveOutcome, VaultDescriptor,
};
pub use router::{DepositReceipt, DepositRouter, RouteError};
pub use shared::{Shared, SharedGate, SharedRegistry};
