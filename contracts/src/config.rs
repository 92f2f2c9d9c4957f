//! # Gate & Registry Configuration
//!
//! Serde documents that describe a gate or a registry as a whole, so an
//! operator can keep the policy in a JSON file and rebuild the state from it.
//!
//! Building goes through the same owner- and governance-gated calls an
//! operator would make by hand, so a config can never produce state the
//! public API could not.
//!
//! ```json
//! {
//!   "owner": "0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a",
//!   "default_root": "0x0",
//!   "banned": [],
//!   "vaults": [
//!     {
//!       "vault": "0x1111111111111111111111111111111111111111",
//!       "root": { "mode": "disabled" },
//!       "guests": [],
//!       "user_cap": 0,
//!       "total_cap": 1000000
//!     }
//!   ]
//! }
//! ```

use bouncer_protocol::{Address, Amount, Hash32, VaultId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access_gate::{AccessGate, GateError, RootOverride};
use crate::registry::{Registry, RegistryError};

/// Errors that can occur while loading or applying a config document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON for the expected shape.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Applying the gate policy failed.
    #[error("gate config rejected: {0}")]
    Gate(#[from] GateError),

    /// Applying the registry listings failed.
    #[error("registry config rejected: {0}")]
    Registry(#[from] RegistryError),
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Policy for one vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultPolicy {
    /// The vault this policy applies to.
    pub vault: VaultId,
    /// Root selection. Defaults to inheriting the gate-wide root.
    #[serde(default)]
    pub root: RootOverride,
    /// Addresses manually admitted to this vault.
    #[serde(default)]
    pub guests: Vec<Address>,
    /// Per-user cap. `0` (the default) is uncapped.
    #[serde(default)]
    pub user_cap: Amount,
    /// Aggregate cap. Left unset, the vault admits nothing.
    #[serde(default)]
    pub total_cap: Option<Amount>,
}

/// A complete gate policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Gate owner.
    pub owner: Address,
    /// Root inherited by vaults without an override.
    #[serde(default)]
    pub default_root: Hash32,
    /// Globally banned addresses.
    #[serde(default)]
    pub banned: Vec<Address>,
    /// Per-vault policies.
    #[serde(default)]
    pub vaults: Vec<VaultPolicy>,
}

impl GateConfig {
    /// Parses a JSON policy document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds a gate owned by `owner` and applies the policy as that owner.
    pub fn build(&self) -> Result<AccessGate, ConfigError> {
        let owner = self.owner;
        let mut gate = AccessGate::new(owner);
        gate.set_default_guest_list_root(&owner, self.default_root)?;
        for address in &self.banned {
            gate.ban_address(&owner, *address)?;
        }

        for policy in &self.vaults {
            match policy.root {
                RootOverride::Inherit => {}
                RootOverride::Override(root) => gate.set_root_for_vault(&owner, policy.vault, root)?,
                RootOverride::Disabled => gate.remove_root_for_vault(&owner, policy.vault)?,
            }
            let flags = vec![true; policy.guests.len()];
            gate.set_vault_guests(&owner, policy.vault, &policy.guests, &flags)?;
            gate.set_user_deposit_cap(&owner, policy.vault, policy.user_cap)?;
            if let Some(cap) = policy.total_cap {
                gate.set_total_deposit_cap(&owner, policy.vault, cap)?;
            }
        }

        tracing::debug!(vaults = self.vaults.len(), banned = self.banned.len(), "gate built from config");
        Ok(gate)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The vaults one author has listed, in listing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorListing {
    /// The author.
    pub author: Address,
    /// Vaults added by the author.
    pub vaults: Vec<VaultId>,
}

/// A complete registry snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry governance.
    pub governance: Address,
    /// Author listings, applied in order.
    #[serde(default)]
    pub listings: Vec<AuthorListing>,
    /// Vaults promoted by governance, applied after the listings.
    #[serde(default)]
    pub promoted: Vec<VaultId>,
}

impl RegistryConfig {
    /// Parses a JSON registry document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Replays the listings and promotions into a fresh registry.
    pub fn build(&self) -> Result<Registry, ConfigError> {
        let mut registry = Registry::new(self.governance);
        for listing in &self.listings {
            for vault in &listing.vaults {
                registry.add(&listing.author, *vault);
            }
        }
        for vault in &self.promoted {
            registry.promote(&self.governance, *vault)?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_gate::AccessGrant;

    const OWNER: Address = Address::repeat_byte(0x0a);
    const VAULT: VaultId = Address::repeat_byte(0x11);

    #[test]
    fn minimal_gate_config_parses() {
        let json = format!("{{\"owner\":\"{OWNER}\"}}");
        let config = GateConfig::from_json(&json).unwrap();
        let gate = config.build().unwrap();
        assert_eq!(gate.owner(), OWNER);
        assert_eq!(gate.default_guest_list_root(), Hash32::ZERO);
        assert_eq!(gate.total_cap(&VAULT), 0);
    }

    #[test]
    fn vault_policy_is_applied() {
        let guest = Address::repeat_byte(0x42);
        let banned = Address::repeat_byte(0x66);
        let config = GateConfig {
            owner: OWNER,
            default_root: Hash32::repeat_byte(0x1a),
            banned: vec![banned],
            vaults: vec![VaultPolicy {
                vault: VAULT,
                root: RootOverride::Override(Hash32::repeat_byte(0x2b)),
                guests: vec![guest],
                user_cap: 50,
                total_cap: Some(Amount::MAX),
            }],
        };
        let gate = config.build().unwrap();

        assert!(gate.is_banned(&banned));
        assert_eq!(gate.guest_list_root_override(&VAULT), Hash32::repeat_byte(0x2b));
        assert_eq!(gate.check_access(&VAULT, &guest, &[]), Ok(AccessGrant::Guest));
        assert_eq!(gate.user_cap(&VAULT), 50);
        assert_eq!(gate.total_cap(&VAULT), Amount::MAX);
    }

    #[test]
    fn gate_config_round_trips_through_json() {
        let config = GateConfig {
            owner: OWNER,
            default_root: Hash32::ZERO,
            banned: vec![],
            vaults: vec![VaultPolicy {
                vault: VAULT,
                root: RootOverride::Disabled,
                guests: vec![],
                user_cap: 0,
                total_cap: None,
            }],
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(GateConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn malformed_gate_config_is_a_parse_error() {
        let err = GateConfig::from_json("{\"owner\":\"0x12\"}").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn registry_config_replays_in_order() {
        let gov = Address::repeat_byte(0x60);
        let author = Address::repeat_byte(0x99);
        let v = |n| Address::repeat_byte(n);
        let config = RegistryConfig {
            governance: gov,
            listings: vec![AuthorListing {
                author,
                vaults: vec![v(1), v(2), v(1)],
            }],
            promoted: vec![v(2)],
        };
        let registry = config.build().unwrap();
        assert_eq!(registry.from_author(&author), vec![v(1), v(2)]);
        assert_eq!(registry.promoted(), vec![v(2)]);
    }
}
