//! # Vault Module - External Collaborators
//!
//! Bouncer guards vaults, it does not implement them. This module pins down
//! the surface the gate and the registry consume from the outside world:
//!
//! ```text
//! mod.rs     - the Vault and VaultSource traits, strategy parameters
//! token.rs   - the Token trait and an in-memory ledger implementation
//! memory.rs  - an in-memory vault with 1:1 initial share pricing, and a
//!              VaultBook that resolves vault ids for registry lookups
//! ```
//!
//! ## Design Principles
//!
//! 1. **Traits at the seam.** The contracts crate only ever sees `dyn Vault`
//!    and `dyn Token`, so a real chain adapter can slot in without touching
//!    admission logic.
//!
//! 2. **Field reads are independent.** A descriptor assembled from several
//!    getters may straddle a mutation of the underlying vault. Callers accept
//!    that; nothing here tries to snapshot atomically.
//!
//! 3. **All amounts are [`Amount`] in smallest-unit denomination**, with
//!    checked arithmetic on every balance change.

pub mod memory;
pub mod token;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Address, Amount, VaultId};

pub use memory::{InMemoryVault, VaultBook};
pub use token::{InMemoryToken, Token, TokenError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors reported by a vault collaborator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VaultError {
    /// The deposit would push managed assets past the vault's own limit.
    #[error("vault deposit limit exceeded: limit {limit}, would reach {attempted}")]
    DepositLimitExceeded {
        /// The vault's configured limit.
        limit: Amount,
        /// Total assets the deposit would have produced.
        attempted: Amount,
    },

    /// The holder tried to redeem more shares than they own.
    #[error("insufficient shares: holder has {available}, requested {requested}")]
    InsufficientShares {
        /// Shares currently held.
        available: Amount,
        /// Shares the caller tried to redeem.
        requested: Amount,
    },

    /// Zero-amount deposits and withdrawals are rejected.
    #[error("amount must be non-zero")]
    ZeroAmount,

    /// Share or asset arithmetic overflowed.
    #[error("arithmetic overflow")]
    Overflow,
}

// ---------------------------------------------------------------------------
// Strategy Parameters
// ---------------------------------------------------------------------------

/// The live configuration and accounting of one strategy attached to a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyParams {
    /// Strategy contract address.
    pub address: Address,
    /// Human-readable strategy name.
    pub name: String,
    /// Identity operating the strategy.
    pub strategist: Address,
    /// Where the strategist's fees go.
    pub rewards: Address,
    /// Identity allowed to trigger harvests.
    pub keeper: Address,
    /// Performance fee in basis points.
    pub performance_fee: u32,
    /// Unix timestamp the strategy was activated.
    pub activation: u64,
    /// Share of vault assets allotted to the strategy, in basis points.
    pub debt_ratio: u32,
    /// Lower bound on debt taken per harvest.
    pub min_debt_per_harvest: Amount,
    /// Upper bound on debt taken per harvest.
    pub max_debt_per_harvest: Amount,
    /// Unix timestamp of the last report.
    pub last_report: u64,
    /// Assets currently lent to the strategy.
    pub total_debt: Amount,
    /// Lifetime gains reported.
    pub total_gain: Amount,
    /// Lifetime losses reported.
    pub total_loss: Amount,
    /// Whether report sanity limits are enforced.
    pub enforce_change_limit: bool,
    /// Maximum tolerated profit per report, in basis points.
    pub profit_limit_ratio: u32,
    /// Maximum tolerated loss per report, in basis points.
    pub loss_limit_ratio: u32,
    /// Optional external health check contract (zero if none).
    pub custom_check: Address,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A yield vault as seen from the admission layer.
///
/// Descriptor getters mirror the vault's public fields. Each call is a
/// separate read.
pub trait Vault {
    /// The vault's own address.
    fn address(&self) -> VaultId;
    /// Vault share token name.
    fn name(&self) -> String;
    /// Vault share token symbol.
    fn symbol(&self) -> String;
    /// Address of the underlying asset.
    fn token(&self) -> Address;
    /// Governance nominee awaiting acceptance (zero if none).
    fn pending_governance(&self) -> Address;
    /// Active governance.
    fn governance(&self) -> Address;
    /// Fee recipient.
    fn rewards(&self) -> Address;
    /// Emergency guardian.
    fn guardian(&self) -> Address;
    /// Day-to-day management.
    fn management(&self) -> Address;
    /// Strategies currently attached, in withdrawal-queue order.
    fn strategies(&self) -> Vec<StrategyParams>;

    /// Underlying value of one whole share, scaled by the token decimals.
    fn price_per_share(&self) -> Amount;
    /// Shares held by `holder`.
    fn balance_of(&self, holder: &Address) -> Amount;
    /// Total shares outstanding.
    fn total_supply(&self) -> Amount;

    /// Accept `amount` of the underlying asset and mint shares to
    /// `recipient`. Returns the shares minted.
    fn deposit(&mut self, amount: Amount, recipient: &Address) -> Result<Amount, VaultError>;

    /// Burn `shares` from `holder` and return the underlying released.
    fn withdraw(&mut self, holder: &Address, shares: Amount) -> Result<Amount, VaultError>;
}

/// Resolves a vault id to a live vault handle.
pub trait VaultSource {
    /// The vault at `id`, or `None` if nothing lives there.
    fn vault(&self, id: &VaultId) -> Option<&dyn Vault>;
}
