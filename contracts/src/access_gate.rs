//! # Access Gate Contract
//!
//! Decides who may deposit into which vault, and how much.
//!
//! ## Admission Rules
//!
//! Access is resolved in strict precedence order:
//!
//! 1. **Ban list**: a banned address is refused everywhere. Nothing else is
//!    consulted.
//! 2. **Manual guests**: an address the owner flagged for this vault is
//!    admitted without a proof. Lets operators onboard late additions
//!    without regenerating a tree.
//! 3. **Guest root**: the vault's [`RootOverride`] picks the root:
//!    `Disabled` opens the vault, `Override(root)` uses that root, `Inherit`
//!    falls back to the default root.
//! 4. **Open**: a zero effective root admits everyone.
//! 5. **Proof**: otherwise the caller's merkle proof must verify.
//!
//! A deposit that clears access is then checked against the vault's user and
//! total caps (see [`crate::cap_ledger`]). Only if every check passes is the
//! deposit recorded.
//!
//! ## Security Model
//!
//! - **Owner gating**: every setter takes the caller explicitly and rejects
//!   anyone but the owner with [`GateError::Unauthorized`].
//! - **All-or-nothing**: validation happens before the first write, so a
//!   failed call never leaves partial state behind.

use std::collections::{HashMap, HashSet};
use std::fmt;

use bouncer_protocol::crypto::merkle;
use bouncer_protocol::{Address, Amount, Hash32, VaultId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::cap_ledger::{CapCheck, CapLedger, VaultCaps};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why an address was refused access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
    /// The address is on the global ban list.
    Banned,
    /// The vault is gated by a root and the proof did not verify.
    InvalidProof,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::Banned => write!(f, "banned"),
            Denial::InvalidProof => write!(f, "invalid proof"),
        }
    }
}

/// Errors that can occur during gate operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GateError {
    /// The caller is not the gate owner.
    #[error("unauthorized: {caller} is not the gate owner")]
    Unauthorized {
        /// Identity that attempted the call.
        caller: Address,
    },

    /// `set_vault_guests` got address and flag lists of different lengths.
    #[error("arity mismatch: {addresses} addresses but {flags} flags")]
    ArityMismatch {
        /// Number of addresses supplied.
        addresses: usize,
        /// Number of flags supplied.
        flags: usize,
    },

    /// Access to the vault was refused.
    #[error("not allowed: {account} may not deposit into {vault} ({reason})")]
    NotAllowed {
        /// Target vault.
        vault: VaultId,
        /// Refused depositor.
        account: Address,
        /// Which rule refused them.
        reason: Denial,
    },

    /// The deposit would take the depositor past the per-user cap.
    #[error("user cap exceeded on {vault}: cap {cap}, deposited {deposited}, requested {requested}")]
    UserCapExceeded {
        /// Target vault.
        vault: VaultId,
        /// Configured per-user cap.
        cap: Amount,
        /// Amount the depositor already put in.
        deposited: Amount,
        /// Amount the depositor tried to add.
        requested: Amount,
    },

    /// The deposit would take the vault past its total cap.
    #[error("total cap exceeded on {vault}: cap {cap}, deposited {deposited}, requested {requested}")]
    TotalCapExceeded {
        /// Target vault.
        vault: VaultId,
        /// Configured aggregate cap.
        cap: Amount,
        /// Amount already deposited by everyone.
        deposited: Amount,
        /// Amount the depositor tried to add.
        requested: Amount,
    },

    /// A merkle proof did not verify against the vault's effective root.
    #[error("invalid proof: {account} is not under root {root} for {vault}")]
    InvalidProof {
        /// Target vault.
        vault: VaultId,
        /// Account the proof was for.
        account: Address,
        /// Root checked against (zero if the vault has none).
        root: Hash32,
    },
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How a vault picks its guest root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "root", rename_all = "snake_case")]
pub enum RootOverride {
    /// Use the gate-wide default root.
    #[default]
    Inherit,
    /// Use this vault-specific root instead of the default.
    Override(Hash32),
    /// Guest gating is switched off for this vault, whatever the default.
    Disabled,
}

/// The root a vault actually enforces after resolving overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "root", rename_all = "snake_case")]
pub enum EffectiveRoot {
    /// Anyone may enter: gating disabled or the root is zero.
    Open,
    /// Entry requires a proof against this root.
    Gated(Hash32),
}

/// Why an address was admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum AccessGrant {
    /// The owner listed the address for this vault.
    Guest,
    /// The vault has no effective root.
    Open,
    /// The address proved membership under `root`.
    Proof {
        /// Root the proof verified against.
        root: Hash32,
    },
}

/// A recorded deposit admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admission {
    /// Target vault.
    pub vault: VaultId,
    /// Admitted depositor.
    pub depositor: Address,
    /// Amount recorded.
    pub amount: Amount,
    /// Why access was granted.
    pub grant: AccessGrant,
    /// Depositor's lifetime total after this deposit.
    pub deposited_by_user: Amount,
    /// Vault's lifetime total after this deposit.
    pub deposited_total: Amount,
}

/// Proof that an account belongs to a vault's guest tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    /// Vault whose root was checked.
    pub vault: VaultId,
    /// Account that proved membership.
    pub account: Address,
    /// Root the proof verified against.
    pub root: Hash32,
}

/// An admission that passed every check but is not yet recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingAdmission {
    grant: AccessGrant,
    cap: CapCheck,
}

// ---------------------------------------------------------------------------
// AccessGate
// ---------------------------------------------------------------------------

/// The deposit gate: guest configuration, ban list and cap ledger for every
/// vault it guards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGate {
    /// The only identity allowed to reconfigure the gate.
    owner: Address,
    /// Root inherited by every vault without an override.
    default_root: Hash32,
    /// Per-vault root selection.
    root_overrides: HashMap<VaultId, RootOverride>,
    /// Manual guest flags: `vault -> (address -> flag)`.
    guests: HashMap<VaultId, HashMap<Address, bool>>,
    /// Global ban list.
    banned: HashSet<Address>,
    /// Caps and cumulative deposits.
    ledger: CapLedger,
}

impl AccessGate {
    /// Creates a gate owned by `owner` with no roots, guests, bans or caps.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            default_root: Hash32::ZERO,
            root_overrides: HashMap::new(),
            guests: HashMap::new(),
            banned: HashSet::new(),
            ledger: CapLedger::new(),
        }
    }

    fn ensure_owner(&self, caller: &Address) -> Result<(), GateError> {
        if *caller != self.owner {
            return Err(GateError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    // -- Owner-only configuration -------------------------------------------

    /// Hands the gate to `new_owner`.
    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<(), GateError> {
        self.ensure_owner(caller)?;
        info!(previous = %self.owner, new = %new_owner, "gate ownership transferred");
        self.owner = new_owner;
        Ok(())
    }

    /// Replaces the default root inherited by vaults without an override.
    pub fn set_default_guest_list_root(&mut self, caller: &Address, root: Hash32) -> Result<(), GateError> {
        self.ensure_owner(caller)?;
        self.default_root = root;
        info!(%root, "default guest root set");
        Ok(())
    }

    /// Gives `vault` its own root, replacing any `Disabled` state.
    pub fn set_root_for_vault(&mut self, caller: &Address, vault: VaultId, root: Hash32) -> Result<(), GateError> {
        self.ensure_owner(caller)?;
        self.root_overrides.insert(vault, RootOverride::Override(root));
        info!(%vault, %root, "vault guest root set");
        Ok(())
    }

    /// Switches guest gating off for `vault`. Takes precedence over the
    /// default root until a new override is set.
    pub fn remove_root_for_vault(&mut self, caller: &Address, vault: VaultId) -> Result<(), GateError> {
        self.ensure_owner(caller)?;
        self.root_overrides.insert(vault, RootOverride::Disabled);
        info!(%vault, "vault guest root removed");
        Ok(())
    }

    /// Sets manual guest flags for `vault`, pairwise.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::ArityMismatch`] if the slices differ in length;
    /// nothing is written in that case.
    pub fn set_vault_guests(
        &mut self,
        caller: &Address,
        vault: VaultId,
        addresses: &[Address],
        flags: &[bool],
    ) -> Result<(), GateError> {
        self.ensure_owner(caller)?;
        if addresses.len() != flags.len() {
            return Err(GateError::ArityMismatch {
                addresses: addresses.len(),
                flags: flags.len(),
            });
        }

        let entries = self.guests.entry(vault).or_default();
        for (address, flag) in addresses.iter().zip(flags) {
            entries.insert(*address, *flag);
            debug!(%vault, %address, flag, "vault guest flag set");
        }
        info!(%vault, count = addresses.len(), "vault guests updated");
        Ok(())
    }

    /// Bans `address` from every vault.
    pub fn ban_address(&mut self, caller: &Address, address: Address) -> Result<(), GateError> {
        self.ensure_owner(caller)?;
        self.banned.insert(address);
        info!(%address, "address banned");
        Ok(())
    }

    /// Lifts a ban on `address`.
    pub fn unban_address(&mut self, caller: &Address, address: Address) -> Result<(), GateError> {
        self.ensure_owner(caller)?;
        self.banned.remove(&address);
        info!(%address, "address unbanned");
        Ok(())
    }

    /// Sets the per-user lifetime cap for `vault`. `0` removes the cap.
    pub fn set_user_deposit_cap(&mut self, caller: &Address, vault: VaultId, amount: Amount) -> Result<(), GateError> {
        self.ensure_owner(caller)?;
        self.ledger.set_user_cap(vault, amount);
        info!(%vault, amount, "user deposit cap set");
        Ok(())
    }

    /// Sets the aggregate cap for `vault`. `Amount::MAX` removes the cap.
    pub fn set_total_deposit_cap(&mut self, caller: &Address, vault: VaultId, amount: Amount) -> Result<(), GateError> {
        self.ensure_owner(caller)?;
        self.ledger.set_total_cap(vault, amount);
        info!(%vault, amount, "total deposit cap set");
        Ok(())
    }

    // -- Decisions ----------------------------------------------------------

    /// Resolves the root `vault` enforces.
    pub fn effective_root(&self, vault: &VaultId) -> EffectiveRoot {
        let root = match self.root_override(vault) {
            RootOverride::Disabled => return EffectiveRoot::Open,
            RootOverride::Override(root) => root,
            RootOverride::Inherit => self.default_root,
        };
        if root.is_zero() {
            EffectiveRoot::Open
        } else {
            EffectiveRoot::Gated(root)
        }
    }

    /// Runs the access rules and reports which one admitted `account`.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::NotAllowed`] with the refusing rule.
    pub fn check_access(
        &self,
        vault: &VaultId,
        account: &Address,
        proof: &[Hash32],
    ) -> Result<AccessGrant, GateError> {
        let deny = |reason| GateError::NotAllowed {
            vault: *vault,
            account: *account,
            reason,
        };

        if self.is_banned(account) {
            return Err(deny(Denial::Banned));
        }
        if self.vault_guests(vault, account) {
            return Ok(AccessGrant::Guest);
        }
        match self.effective_root(vault) {
            EffectiveRoot::Open => Ok(AccessGrant::Open),
            EffectiveRoot::Gated(root) if merkle::verify(&root, account, proof) => {
                Ok(AccessGrant::Proof { root })
            }
            EffectiveRoot::Gated(_) => Err(deny(Denial::InvalidProof)),
        }
    }

    /// Returns `true` if `account` may deposit into `vault` with `proof`.
    /// Caps are not considered.
    pub fn is_allowed(&self, vault: &VaultId, account: &Address, proof: &[Hash32]) -> bool {
        self.check_access(vault, account, proof).is_ok()
    }

    /// Checks that `account` is in `vault`'s guest tree, without recording
    /// anything. Bans and manual flags are not consulted.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::InvalidProof`] if the vault has no effective root
    /// or the proof does not verify against it.
    pub fn prove_invitation(
        &self,
        vault: &VaultId,
        account: &Address,
        proof: &[Hash32],
    ) -> Result<Invitation, GateError> {
        let root = match self.effective_root(vault) {
            EffectiveRoot::Gated(root) => root,
            EffectiveRoot::Open => Hash32::ZERO,
        };
        if root.is_zero() || !merkle::verify(&root, account, proof) {
            return Err(GateError::InvalidProof {
                vault: *vault,
                account: *account,
                root,
            });
        }
        Ok(Invitation {
            vault: *vault,
            account: *account,
            root,
        })
    }

    /// Admits and records a deposit of `amount` by `depositor` into `vault`.
    ///
    /// Access is checked first, then the user cap, then the total cap. Only
    /// if all three pass are the ledger counters advanced.
    ///
    /// # Errors
    ///
    /// [`GateError::NotAllowed`], [`GateError::UserCapExceeded`] or
    /// [`GateError::TotalCapExceeded`]; the ledger is untouched on error.
    pub fn admit_deposit(
        &mut self,
        vault: &VaultId,
        depositor: &Address,
        amount: Amount,
        proof: &[Hash32],
    ) -> Result<Admission, GateError> {
        let pending = self.prepare_deposit(vault, depositor, amount, proof)?;
        Ok(self.commit_deposit(pending))
    }

    pub(crate) fn prepare_deposit(
        &self,
        vault: &VaultId,
        depositor: &Address,
        amount: Amount,
        proof: &[Hash32],
    ) -> Result<PendingAdmission, GateError> {
        let grant = self.check_access(vault, depositor, proof).map_err(|e| {
            debug!(%vault, %depositor, error = %e, "deposit refused");
            e
        })?;
        let cap = self.ledger.check(vault, depositor, amount).map_err(|e| {
            debug!(%vault, %depositor, amount, error = %e, "deposit over cap");
            e
        })?;
        Ok(PendingAdmission { grant, cap })
    }

    pub(crate) fn commit_deposit(&mut self, pending: PendingAdmission) -> Admission {
        let PendingAdmission { grant, cap } = pending;
        let (vault, depositor, amount) = (cap.vault, cap.user, cap.amount);
        let (deposited_by_user, deposited_total) = self.ledger.commit(cap);
        info!(%vault, %depositor, amount, deposited_total, "deposit admitted");
        Admission {
            vault,
            depositor,
            amount,
            grant,
            deposited_by_user,
            deposited_total,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// The gate owner.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// The default root inherited by vaults without an override.
    pub fn default_guest_list_root(&self) -> Hash32 {
        self.default_root
    }

    /// How `vault` selects its root.
    pub fn root_override(&self, vault: &VaultId) -> RootOverride {
        self.root_overrides.get(vault).copied().unwrap_or_default()
    }

    /// The vault-specific root, or zero unless an override is active.
    pub fn guest_list_root_override(&self, vault: &VaultId) -> Hash32 {
        match self.root_override(vault) {
            RootOverride::Override(root) => root,
            RootOverride::Inherit | RootOverride::Disabled => Hash32::ZERO,
        }
    }

    /// Returns `true` if guest gating was switched off for `vault`.
    pub fn removed_guest_list(&self, vault: &VaultId) -> bool {
        self.root_override(vault) == RootOverride::Disabled
    }

    /// The manual guest flag for `address` on `vault`.
    pub fn vault_guests(&self, vault: &VaultId, address: &Address) -> bool {
        self.guests
            .get(vault)
            .and_then(|entries| entries.get(address))
            .copied()
            .unwrap_or(false)
    }

    /// Returns `true` if `address` is banned.
    pub fn is_banned(&self, address: &Address) -> bool {
        self.banned.contains(address)
    }

    /// Both caps for `vault`.
    pub fn caps(&self, vault: &VaultId) -> VaultCaps {
        self.ledger.caps(vault)
    }

    /// The per-user cap for `vault`.
    pub fn user_cap(&self, vault: &VaultId) -> Amount {
        self.ledger.user_cap(vault)
    }

    /// The aggregate cap for `vault`.
    pub fn total_cap(&self, vault: &VaultId) -> Amount {
        self.ledger.total_cap(vault)
    }

    /// Lifetime amount `user` deposited into `vault`.
    pub fn deposited_by_user(&self, vault: &VaultId, user: &Address) -> Amount {
        self.ledger.deposited_by_user(vault, user)
    }

    /// Lifetime amount deposited into `vault`.
    pub fn deposited_total(&self, vault: &VaultId) -> Amount {
        self.ledger.deposited_total(vault)
    }

    /// Headroom left under the user cap.
    pub fn remaining_user_deposit_allowed(&self, vault: &VaultId, user: &Address) -> Amount {
        self.ledger.remaining_user_deposit_allowed(vault, user)
    }

    /// Headroom left under the total cap.
    pub fn remaining_total_deposit_allowed(&self, vault: &VaultId) -> Amount {
        self.ledger.remaining_total_deposit_allowed(vault)
    }

    /// Read-only view of the cap ledger.
    pub fn ledger(&self) -> &CapLedger {
        &self.ledger
    }
}
