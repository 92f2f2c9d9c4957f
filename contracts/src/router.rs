//! # Deposit Router
//!
//! Wires an admission decision to the token and vault collaborators, the way
//! a deposit wrapper in front of a guarded vault would:
//!
//! 1. Check access and both caps (nothing recorded yet).
//! 2. Pull `amount` of the underlying from the depositor into the vault,
//!    spending the allowance the depositor granted the router.
//! 3. Ask the vault to mint shares to the depositor.
//! 4. Record the deposit in the cap ledger.
//!
//! If step 3 fails the pulled tokens are returned, the router's allowance is
//! put back to what the depositor granted, and the ledger is never touched. The gate is borrowed mutably for the whole sequence, so no other
//! admission can slip in between the check and the commit.

use bouncer_protocol::vault::{Token, TokenError, Vault, VaultError};
use bouncer_protocol::{Address, Amount, Hash32};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::access_gate::{AccessGate, Admission, GateError};

/// Errors that can occur while routing a deposit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    /// The gate refused the deposit.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// The token transfer failed.
    #[error("token transfer failed: {0}")]
    Token(#[from] TokenError),

    /// The vault rejected the deposit.
    #[error("vault deposit failed: {0}")]
    Vault(#[from] VaultError),

    /// The vault rejected the deposit and returning the pulled tokens also
    /// failed. The funds are still held by the vault.
    #[error("vault deposit failed ({source}) and refund failed ({refund})")]
    RefundFailed {
        /// Why the vault rejected the deposit.
        source: VaultError,
        /// Why the refund did not go through.
        refund: TokenError,
    },

    /// The token handed in is not the vault's underlying asset.
    #[error("token mismatch: vault expects {expected}, got {got}")]
    TokenMismatch {
        /// The vault's underlying asset.
        expected: Address,
        /// The token supplied by the caller.
        got: Address,
    },
}

/// What a routed deposit produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositReceipt {
    /// The recorded admission.
    pub admission: Admission,
    /// Vault shares minted to the depositor.
    pub shares: Amount,
}

/// A deposit wrapper identified by its own address, which depositors
/// approve as a spender on the underlying token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRouter {
    address: Address,
}

impl DepositRouter {
    /// Creates a router acting as `address`.
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// The router's spender identity.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Admits `depositor`, moves the funds and mints vault shares.
    ///
    /// # Errors
    ///
    /// Any gate, token or vault error. On error the cap ledger is unchanged
    /// and the depositor's tokens are where they started.
    pub fn deposit(
        &self,
        gate: &mut AccessGate,
        token: &mut dyn Token,
        vault: &mut dyn Vault,
        depositor: &Address,
        amount: Amount,
        proof: &[Hash32],
    ) -> Result<DepositReceipt, RouteError> {
        let vault_id = vault.address();
        if token.address() != vault.token() {
            return Err(RouteError::TokenMismatch {
                expected: vault.token(),
                got: token.address(),
            });
        }

        let pending = gate.prepare_deposit(&vault_id, depositor, amount, proof)?;
        let granted = token.allowance(depositor, &self.address);
        token.transfer_from(&self.address, depositor, &vault_id, amount)?;

        let shares = match vault.deposit(amount, depositor) {
            Ok(shares) => shares,
            Err(source) => {
                if let Err(refund) = token.transfer(&vault_id, depositor, amount) {
                    warn!(vault = %vault_id, %depositor, error = %refund, "refund after failed deposit did not go through");
                    return Err(RouteError::RefundFailed { source, refund });
                }
                token.approve(depositor, &self.address, granted);
                return Err(source.into());
            }
        };

        let admission = gate.commit_deposit(pending);
        info!(vault = %vault_id, %depositor, amount, shares, "deposit routed");
        Ok(DepositReceipt { admission, shares })
    }
}
