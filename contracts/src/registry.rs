//! # Vault Registry Contract
//!
//! A directory of vaults keyed by the author who registered them. Anyone can
//! maintain their own list; only governance can promote a vault into the
//! governance list, which indexers treat as the curated set.
//!
//! ## List Semantics
//!
//! Each author's list is an ordered set. Adding a vault already present and
//! removing one that is absent are both successful no-ops, reported through
//! the returned outcome rather than an error.
//!
//! Removal swaps the last entry into the freed slot and truncates, so it is
//! O(1) but **does not preserve order**:
//!
//! ```text
//! [v1, v2, v3]  remove(v1)  ->  [v3, v2]
//! ```
//!
//! Promotion appends to the governance list only; the registering author's list
//! is left exactly as it was.

use std::collections::HashMap;

use bouncer_protocol::vault::{StrategyParams, VaultSource};
use bouncer_protocol::{Address, VaultId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Only governance may promote vaults.
    #[error("unauthorized: {caller} is not registry governance")]
    Unauthorized {
        /// Identity that attempted the call.
        caller: Address,
    },
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of [`Registry::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddOutcome {
    /// The vault was appended to the author's list.
    Added,
    /// The author had already listed the vault; nothing changed.
    AlreadyPresent,
}

/// Result of [`Registry::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoveOutcome {
    /// The vault was removed from the author's list.
    Removed,
    /// The author had not listed the vault; nothing changed.
    NotFound,
}

/// Result of [`Registry::promote`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromoteOutcome {
    /// The vault was appended to the governance list.
    Promoted,
    /// The vault was already promoted; nothing changed.
    AlreadyPromoted,
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// Live snapshot of a registered vault, assembled field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultDescriptor {
    /// Vault address.
    pub address: VaultId,
    /// Share token name.
    pub name: String,
    /// Share token symbol.
    pub symbol: String,
    /// Underlying asset.
    pub token: Address,
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
}

// ---------------------------------------------------------------------------
// VaultSet
// ---------------------------------------------------------------------------

/// An ordered set with O(1) insert, lookup and swap-remove.
///
/// Serialized as the plain list; the index is rebuilt on load, dropping
/// repeated entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<VaultId>", into = "Vec<VaultId>")]
struct VaultSet {
    items: Vec<VaultId>,
    index: HashMap<VaultId, usize>,
}

impl VaultSet {
    fn contains(&self, vault: &VaultId) -> bool {
        self.index.contains_key(vault)
    }

    fn insert(&mut self, vault: VaultId) -> bool {
        if self.contains(&vault) {
            return false;
        }
        self.index.insert(vault, self.items.len());
        self.items.push(vault);
        true
    }

    fn remove(&mut self, vault: &VaultId) -> bool {
        let Some(slot) = self.index.remove(vault) else {
            return false;
        };
        self.items.swap_remove(slot);
        if let Some(moved) = self.items.get(slot) {
            self.index.insert(*moved, slot);
        }
        true
    }

    fn as_slice(&self) -> &[VaultId] {
        &self.items
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<VaultId>> for VaultSet {
    fn from(items: Vec<VaultId>) -> Self {
        let mut set = VaultSet::default();
        for vault in items {
            set.insert(vault);
        }
        set
    }
}

impl From<VaultSet> for Vec<VaultId> {
    fn from(set: VaultSet) -> Self {
        set.items
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The vault directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registry {
    /// Identity allowed to promote; its own list is the promoted set.
    governance: Address,
    /// Per-author vault lists.
    lists: HashMap<Address, VaultSet>,
}

impl Registry {
    /// Creates an empty registry administered by `governance`.
    pub fn new(governance: Address) -> Self {
        Self {
            governance,
            lists: HashMap::new(),
        }
    }

    /// The governance identity.
    pub fn governance(&self) -> Address {
        self.governance
    }

    /// Lists `vault` under `author`.
    pub fn add(&mut self, author: &Address, vault: VaultId) -> AddOutcome {
        if self.lists.get(author).map_or(false, |set| set.contains(&vault)) {
            return AddOutcome::AlreadyPresent;
        }
        self.lists.entry(*author).or_default().insert(vault);
        info!(%author, %vault, "vault added");
        AddOutcome::Added
    }

    /// Removes `vault` from `author`'s list. Other authors' lists, including
    /// the governance list, are never touched.
    pub fn remove(&mut self, author: &Address, vault: &VaultId) -> RemoveOutcome {
        let removed = self
            .lists
            .get_mut(author)
            .map_or(false, |set| set.remove(vault));
        if !removed {
            return RemoveOutcome::NotFound;
        }
        if self.lists.get(author).map_or(false, VaultSet::is_empty) {
            self.lists.remove(author);
        }
        info!(%author, %vault, "vault removed");
        RemoveOutcome::Removed
    }

    /// Promotes `vault` into the governance list.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unauthorized`] unless `caller` is governance.
    pub fn promote(&mut self, caller: &Address, vault: VaultId) -> Result<PromoteOutcome, RegistryError> {
        if *caller != self.governance {
            return Err(RegistryError::Unauthorized { caller: *caller });
        }
        if self.lists.get(&self.governance).map_or(false, |set| set.contains(&vault)) {
            return Ok(PromoteOutcome::AlreadyPromoted);
        }
        self.lists.entry(self.governance).or_default().insert(vault);
        info!(%vault, "vault promoted");
        Ok(PromoteOutcome::Promoted)
    }

    /// Vault ids listed by `author`, in list order.
    pub fn from_author(&self, author: &Address) -> Vec<VaultId> {
        self.lists
            .get(author)
            .map(|set| set.as_slice().to_vec())
            .unwrap_or_default()
    }

    /// The governance list.
    pub fn promoted(&self) -> Vec<VaultId> {
        self.from_author(&self.governance)
    }

    /// Authors with at least one listed vault, sorted.
    pub fn authors(&self) -> Vec<Address> {
        let mut authors: Vec<Address> = self
            .lists
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(author, _)| *author)
            .collect();
        authors.sort();
        authors
    }

    /// Live descriptors for every vault `author` listed.
    ///
    /// Each field is a separate read from `source`; if a vault changes
    /// mid-read the descriptor may mix old and new values. Ids the source
    /// cannot resolve are skipped.
    pub fn from_author_vaults(&self, author: &Address, source: &dyn VaultSource) -> Vec<VaultDescriptor> {
        self.from_author(author)
            .into_iter()
            .filter_map(|id| {
                let Some(vault) = source.vault(&id) else {
                    warn!(%author, vault = %id, "registered vault not found");
                    return None;
                };
                Some(VaultDescriptor {
                    address: id,
                    name: vault.name(),
                    symbol: vault.symbol(),
                    token: vault.token(),
                    pending_governance: vault.pending_governance(),
                    governance: vault.governance(),
                    rewards: vault.rewards(),
                    guardian: vault.guardian(),
                    management: vault.management(),
                    strategies: vault.strategies(),
                })
            })
            .collect()
    }
}
