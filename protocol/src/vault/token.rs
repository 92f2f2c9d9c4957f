//! # Token Standard
//!
//! The fungible-token surface the deposit router needs: balances, approvals
//! and transfers. [`InMemoryToken`] is a plain ledger implementation used by
//! tests and the CLI; it enforces the invariant that no account can ever go
//! negative and that total supply is conserved by transfers.

use std::collections::HashMap;

use thiserror::Error;

use crate::types::{Address, Amount};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during token operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Attempted to move more than the available balance.
    #[error("insufficient balance: {owner} has {available}, requested {requested}")]
    InsufficientBalance {
        /// Account being debited.
        owner: Address,
        /// Its current balance.
        available: Amount,
        /// The amount that was requested.
        requested: Amount,
    },

    /// The spender's allowance does not cover the transfer.
    #[error("insufficient allowance: {spender} may move {allowed}, requested {requested}")]
    InsufficientAllowance {
        /// The account spending on the owner's behalf.
        spender: Address,
        /// Remaining allowance.
        allowed: Amount,
        /// The amount that was requested.
        requested: Amount,
    },

    /// Arithmetic overflow while crediting.
    #[error("balance overflow crediting {0}")]
    Overflow(Address),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A fungible token ledger.
pub trait Token {
    /// The token's own address.
    fn address(&self) -> Address;

    /// Balance of `owner`.
    fn balance_of(&self, owner: &Address) -> Amount;

    /// How much `spender` may still move out of `owner`'s balance.
    fn allowance(&self, owner: &Address, spender: &Address) -> Amount;

    /// Set `spender`'s allowance over `owner`'s balance.
    fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount);

    /// Move `amount` from `from` to `to`, authorized by `from` itself.
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError>;

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError>;
}

// ---------------------------------------------------------------------------
// InMemoryToken
// ---------------------------------------------------------------------------

/// A token ledger held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryToken {
    address: Address,
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    total_supply: Amount,
}

impl InMemoryToken {
    /// Creates an empty ledger for the token at `address`.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    /// Mints `amount` to `to`.
    pub fn mint(&mut self, to: &Address, amount: Amount) -> Result<(), TokenError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow(*to))?;
        self.credit(to, amount)?;
        self.total_supply = supply;
        Ok(())
    }

    /// Total tokens in existence.
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn credit(&mut self, to: &Address, amount: Amount) -> Result<(), TokenError> {
        let balance = self.balances.entry(*to).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(TokenError::Overflow(*to))?;
        Ok(())
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                owner: *from,
                available,
                requested: amount,
            });
        }
        if from == to {
            return Ok(());
        }
        if self.balance_of(to).checked_add(amount).is_none() {
            return Err(TokenError::Overflow(*to));
        }
        self.balances.insert(*from, available - amount);
        self.credit(to, amount)
    }
}

impl Token for InMemoryToken {
    fn address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, owner: &Address) -> Amount {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) {
        self.allowances.insert((*owner, *spender), amount);
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        self.move_balance(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(TokenError::InsufficientAllowance {
                spender: *spender,
                allowed,
                requested: amount,
            });
        }
        self.move_balance(from, to, amount)?;
        // An unlimited approval is never drawn down.
        if allowed != Amount::MAX {
            self.allowances.insert((*from, *spender), allowed - amount);
        }
        Ok(())
    }
}
