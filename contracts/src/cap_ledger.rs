//! # Cap Ledger
//!
//! Per-vault deposit caps and the cumulative amounts deposited against them.
//!
//! Two caps apply to every vault:
//!
//! - **User cap**: the most any single depositor may put in over the
//!   vault's lifetime. `0` means uncapped.
//! - **Total cap**: the most all depositors together may put in.
//!   `Amount::MAX` means uncapped; a vault nobody configured reads as `0`
//!   and admits nothing.
//!
//! Deposited amounts only ever grow, and only through a successful
//! admission. Checking and committing are separate steps so that the gate
//! can validate a deposit, hand control to external collaborators, and only
//! then record usage. Both steps are crate-private: outside this crate the
//! only writers are the owner-gated cap setters and
//! [`AccessGate::admit_deposit`](crate::access_gate::AccessGate::admit_deposit).

use std::collections::HashMap;

use bouncer_protocol::config::{TOTAL_CAP_UNSET, USER_CAP_UNCAPPED};
use bouncer_protocol::{Address, Amount, VaultId};
use serde::{Deserialize, Serialize};

use crate::access_gate::GateError;

/// The two caps configured for a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultCaps {
    /// Per-depositor lifetime cap. `0` = uncapped.
    pub user_cap: Amount,
    /// Aggregate cap. `Amount::MAX` = uncapped.
    pub total_cap: Amount,
}

impl Default for VaultCaps {
    fn default() -> Self {
        Self {
            user_cap: USER_CAP_UNCAPPED,
            total_cap: TOTAL_CAP_UNSET,
        }
    }
}

/// A deposit that passed both cap checks but has not been recorded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CapCheck {
    pub(crate) vault: VaultId,
    pub(crate) user: Address,
    pub(crate) amount: Amount,
}

/// Caps and cumulative deposits for every vault.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapLedger {
    caps: HashMap<VaultId, VaultCaps>,
    deposited_total: HashMap<VaultId, Amount>,
    deposited_by_user: HashMap<VaultId, HashMap<Address, Amount>>,
}

impl CapLedger {
    /// Creates a ledger with no caps configured and nothing deposited.
    pub fn new() -> Self {
        Self::default()
    }

    /// Both caps for `vault`.
    pub fn caps(&self, vault: &VaultId) -> VaultCaps {
        self.caps.get(vault).copied().unwrap_or_default()
    }

    /// Per-user cap for `vault`.
    pub fn user_cap(&self, vault: &VaultId) -> Amount {
        self.caps(vault).user_cap
    }

    /// Aggregate cap for `vault`.
    pub fn total_cap(&self, vault: &VaultId) -> Amount {
        self.caps(vault).total_cap
    }

    /// Lifetime amount `user` has deposited into `vault`.
    pub fn deposited_by_user(&self, vault: &VaultId, user: &Address) -> Amount {
        self.deposited_by_user
            .get(vault)
            .and_then(|users| users.get(user))
            .copied()
            .unwrap_or(0)
    }

    /// Lifetime amount deposited into `vault` by everyone.
    pub fn deposited_total(&self, vault: &VaultId) -> Amount {
        self.deposited_total.get(vault).copied().unwrap_or(0)
    }

    /// How much more `user` may deposit before hitting the user cap.
    /// `Amount::MAX` when the vault has no user cap.
    pub fn remaining_user_deposit_allowed(&self, vault: &VaultId, user: &Address) -> Amount {
        let cap = self.user_cap(vault);
        if cap == USER_CAP_UNCAPPED {
            return Amount::MAX;
        }
        cap.saturating_sub(self.deposited_by_user(vault, user))
    }

    /// How much more may be deposited into `vault` before the total cap.
    pub fn remaining_total_deposit_allowed(&self, vault: &VaultId) -> Amount {
        self.total_cap(vault)
            .saturating_sub(self.deposited_total(vault))
    }

    pub(crate) fn set_user_cap(&mut self, vault: VaultId, amount: Amount) {
        self.caps.entry(vault).or_default().user_cap = amount;
    }

    pub(crate) fn set_total_cap(&mut self, vault: VaultId, amount: Amount) {
        self.caps.entry(vault).or_default().total_cap = amount;
    }

    /// Validate a deposit against both caps without recording it.
    ///
    /// The user cap is checked first. A sum that overflows [`Amount`] is
    /// over any cap.
    pub(crate) fn check(
        &self,
        vault: &VaultId,
        user: &Address,
        amount: Amount,
    ) -> Result<CapCheck, GateError> {
        let caps = self.caps(vault);

        let by_user = self.deposited_by_user(vault, user);
        if caps.user_cap != USER_CAP_UNCAPPED
            && by_user.checked_add(amount).map_or(true, |n| n > caps.user_cap)
        {
            return Err(GateError::UserCapExceeded {
                vault: *vault,
                cap: caps.user_cap,
                deposited: by_user,
                requested: amount,
            });
        }

        let total = self.deposited_total(vault);
        if total.checked_add(amount).map_or(true, |n| n > caps.total_cap) {
            return Err(GateError::TotalCapExceeded {
                vault: *vault,
                cap: caps.total_cap,
                deposited: total,
                requested: amount,
            });
        }

        Ok(CapCheck {
            vault: *vault,
            user: *user,
            amount,
        })
    }

    /// Record a checked deposit. Returns the new `(by_user, total)` amounts.
    pub(crate) fn commit(&mut self, check: CapCheck) -> (Amount, Amount) {
        let total = self.deposited_total.entry(check.vault).or_insert(0);
        *total = total.saturating_add(check.amount);
        let total = *total;

        let by_user = self
            .deposited_by_user
            .entry(check.vault)
            .or_default()
            .entry(check.user)
            .or_insert(0);
        *by_user = by_user.saturating_add(check.amount);

        (*by_user, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> VaultId {
        Address::repeat_byte(0x11)
    }

    fn alice() -> Address {
        Address::repeat_byte(0xa1)
    }

    #[test]
    fn unconfigured_vault_admits_nothing() {
        let ledger = CapLedger::new();
        assert_eq!(ledger.total_cap(&vault()), 0);
        assert!(matches!(
            ledger.check(&vault(), &alice(), 1),
            Err(GateError::TotalCapExceeded { cap: 0, .. })
        ));
    }

    #[test]
    fn zero_user_cap_is_uncapped() {
        let mut ledger = CapLedger::new();
        ledger.set_total_cap(vault(), Amount::MAX);
        assert_eq!(
            ledger.remaining_user_deposit_allowed(&vault(), &alice()),
            Amount::MAX
        );
        let plan = ledger.check(&vault(), &alice(), 1_000_000).unwrap();
        assert_eq!(ledger.commit(plan), (1_000_000, 1_000_000));
    }

    #[test]
    fn user_cap_checked_before_total_cap() {
        let mut ledger = CapLedger::new();
        ledger.set_user_cap(vault(), 10);
        ledger.set_total_cap(vault(), 5);
        assert!(matches!(
            ledger.check(&vault(), &alice(), 11),
            Err(GateError::UserCapExceeded { cap: 10, .. })
        ));
        assert!(matches!(
            ledger.check(&vault(), &alice(), 6),
            Err(GateError::TotalCapExceeded { cap: 5, .. })
        ));
    }

    #[test]
    fn deposit_up_to_the_cap_is_allowed() {
        let mut ledger = CapLedger::new();
        ledger.set_user_cap(vault(), 10);
        ledger.set_total_cap(vault(), 10);
        let plan = ledger.check(&vault(), &alice(), 10).unwrap();
        ledger.commit(plan);
        assert_eq!(ledger.remaining_user_deposit_allowed(&vault(), &alice()), 0);
        assert_eq!(ledger.remaining_total_deposit_allowed(&vault()), 0);
        assert!(ledger.check(&vault(), &alice(), 1).is_err());
    }

    #[test]
    fn check_does_not_mutate() {
        let mut ledger = CapLedger::new();
        ledger.set_total_cap(vault(), 100);
        let _ = ledger.check(&vault(), &alice(), 50).unwrap();
        assert_eq!(ledger.deposited_total(&vault()), 0);
        assert_eq!(ledger.deposited_by_user(&vault(), &alice()), 0);
    }

    #[test]
    fn overflowing_sum_exceeds_uncapped_total() {
        let mut ledger = CapLedger::new();
        ledger.set_total_cap(vault(), Amount::MAX);
        let plan = ledger.check(&vault(), &alice(), Amount::MAX).unwrap();
        ledger.commit(plan);
        assert!(matches!(
            ledger.check(&vault(), &alice(), 1),
            Err(GateError::TotalCapExceeded { .. })
        ));
    }

    #[test]
    fn caps_are_per_vault() {
        let mut ledger = CapLedger::new();
        let other = Address::repeat_byte(0x22);
        ledger.set_user_cap(vault(), 7);
        assert_eq!(ledger.user_cap(&vault()), 7);
        assert_eq!(ledger.user_cap(&other), 0);
    }
}
