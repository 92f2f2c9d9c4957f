//! # In-Memory Vaults
//!
//! A minimal share-accounting vault and a book of vaults keyed by address.
//! Shares are minted 1:1 against the first deposit and pro rata afterwards,
//! so `price_per_share` starts at exactly `10^decimals`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{StrategyParams, Vault, VaultError, VaultSource};
use crate::types::{Address, Amount, VaultId};

/// Descriptor fields and share accounting for one vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InMemoryVault {
    /// Vault address.
    pub address: VaultId,
    /// Share token name.
    pub name: String,
    /// Share token symbol.
    pub symbol: String,
    /// Underlying asset.
    pub token: Address,
    /// Decimals of the underlying asset.
    pub decimals: u8,
    /// Pending governance nominee.
    pub pending_governance: Address,
    /// Active governance.
    pub governance: Address,
    /// Fee recipient.
    pub rewards: Address,
    /// Emergency guardian.
    pub guardian: Address,
    /// Day-to-day management.
    pub management: Address,
    /// Attached strategies.
    pub strategies: Vec<StrategyParams>,
    /// Maximum underlying the vault will hold.
    pub deposit_limit: Amount,
    total_assets: Amount,
    total_supply: Amount,
    shares: HashMap<Address, Amount>,
}

impl InMemoryVault {
    /// Creates an empty vault over `token`, governed by `governance`, with
    /// no deposit limit. Rewards, guardian and management default to the
    /// governance address.
    pub fn new(
        address: VaultId,
        token: Address,
        governance: Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
            token,
            decimals: 18,
            pending_governance: Address::ZERO,
            governance,
            rewards: governance,
            guardian: governance,
            management: governance,
            strategies: Vec::new(),
            deposit_limit: Amount::MAX,
            total_assets: 0,
            total_supply: 0,
            shares: HashMap::new(),
        }
    }

    /// Underlying currently held.
    pub fn total_assets(&self) -> Amount {
        self.total_assets
    }

    fn unit(&self) -> Amount {
        10u128.saturating_pow(u32::from(self.decimals))
    }
}

impl Vault for InMemoryVault {
    fn address(&self) -> VaultId {
        self.address
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn symbol(&self) -> String {
        self.symbol.clone()
    }

    fn token(&self) -> Address {
        self.token
    }

    fn pending_governance(&self) -> Address {
        self.pending_governance
    }

    fn governance(&self) -> Address {
        self.governance
    }

    fn rewards(&self) -> Address {
        self.rewards
    }

    fn guardian(&self) -> Address {
        self.guardian
    }

    fn management(&self) -> Address {
        self.management
    }

    fn strategies(&self) -> Vec<StrategyParams> {
        self.strategies.clone()
    }

    fn price_per_share(&self) -> Amount {
        if self.total_supply == 0 {
            return self.unit();
        }
        self.total_assets
            .checked_mul(self.unit())
            .map(|scaled| scaled / self.total_supply)
            .unwrap_or(Amount::MAX)
    }

    fn balance_of(&self, holder: &Address) -> Amount {
        self.shares.get(holder).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn deposit(&mut self, amount: Amount, recipient: &Address) -> Result<Amount, VaultError> {
        if amount == 0 {
            return Err(VaultError::ZeroAmount);
        }
        let new_assets = self
            .total_assets
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;
        if new_assets > self.deposit_limit {
            return Err(VaultError::DepositLimitExceeded {
                limit: self.deposit_limit,
                attempted: new_assets,
            });
        }

        let minted = if self.total_supply == 0 || self.total_assets == 0 {
            amount
        } else {
            amount
                .checked_mul(self.total_supply)
                .ok_or(VaultError::Overflow)?
                / self.total_assets
        };
        let new_supply = self
            .total_supply
            .checked_add(minted)
            .ok_or(VaultError::Overflow)?;

        self.total_assets = new_assets;
        self.total_supply = new_supply;
        *self.shares.entry(*recipient).or_insert(0) += minted;
        Ok(minted)
    }

    fn withdraw(&mut self, holder: &Address, shares: Amount) -> Result<Amount, VaultError> {
        if shares == 0 {
            return Err(VaultError::ZeroAmount);
        }
        let available = self.balance_of(holder);
        if available < shares {
            return Err(VaultError::InsufficientShares {
                available,
                requested: shares,
            });
        }

        let released = shares
            .checked_mul(self.total_assets)
            .ok_or(VaultError::Overflow)?
            / self.total_supply;

        self.shares.insert(*holder, available - shares);
        self.total_supply -= shares;
        self.total_assets -= released;
        Ok(released)
    }
}

/// A set of in-memory vaults addressable by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultBook {
    vaults: HashMap<VaultId, InMemoryVault>,
}

impl VaultBook {
    /// Creates an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a vault, keyed by its own address.
    pub fn insert(&mut self, vault: InMemoryVault) {
        self.vaults.insert(vault.address, vault);
    }

    /// Mutable access to a vault, e.g. to route a deposit into it.
    pub fn get_mut(&mut self, id: &VaultId) -> Option<&mut InMemoryVault> {
        self.vaults.get_mut(id)
    }

    /// Number of vaults in the book.
    pub fn len(&self) -> usize {
        self.vaults.len()
    }

    /// Returns `true` if the book holds no vaults.
    pub fn is_empty(&self) -> bool {
        self.vaults.is_empty()
    }
}

impl VaultSource for VaultBook {
    fn vault(&self, id: &VaultId) -> Option<&dyn Vault> {
        self.vaults.get(id).map(|v| v as &dyn Vault)
    }
}
