//! # CLI Interface
//!
//! Defines the command-line argument structure for `bouncer-node` using
//! `clap` derive. Supports four subcommands: `verify`, `check`, `registry`,
//! and `version`.

use bouncer_protocol::{Address, Amount, Hash32, VaultId};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Guest list gate and vault registry tooling.
///
/// Verifies guest-tree proofs, evaluates deposit admissions against a gate
/// policy file, and lists the vaults an author has registered.
#[derive(Parser, Debug)]
#[command(
    name = "bouncer-node",
    about = "Guest list gate and vault registry tooling",
    version,
    propagate_version = true
)]
pub struct BouncerCli {
    /// Log output format: `pretty` or `json`. Logs go to stderr.
    #[arg(long, global = true, env = "BOUNCER_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the bouncer binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a Merkle proof for an address against a root.
    Verify(VerifyArgs),
    /// Evaluate an address against a gate policy file.
    Check(CheckArgs),
    /// List an author's vaults from a registry file.
    Registry(RegistryArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `verify` subcommand.
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Guest tree root, 0x-prefixed hex.
    #[arg(long)]
    pub root: Hash32,

    /// Address to check.
    #[arg(long)]
    pub address: Address,

    /// Sibling hashes from leaf to root. Repeat the flag once per level.
    #[arg(long = "proof")]
    pub proof: Vec<Hash32>,
}

/// Arguments for the `check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Path to the gate policy file (JSON).
    #[arg(long, short = 'c', env = "BOUNCER_GATE_CONFIG")]
    pub config: PathBuf,

    /// Vault being deposited into.
    #[arg(long)]
    pub vault: VaultId,

    /// Depositing address.
    #[arg(long)]
    pub address: Address,

    /// Sibling hashes from leaf to root. Repeat the flag once per level.
    #[arg(long = "proof")]
    pub proof: Vec<Hash32>,

    /// Deposit amount to test against the caps.
    ///
    /// When omitted, only access is evaluated.
    #[arg(long)]
    pub amount: Option<Amount>,
}

/// Arguments for the `registry` subcommand.
#[derive(Parser, Debug)]
pub struct RegistryArgs {
    /// Path to the registry snapshot file (JSON).
    #[arg(long, short = 'c', env = "BOUNCER_REGISTRY_CONFIG")]
    pub config: PathBuf,

    /// Author whose vaults to list.
    #[arg(long)]
    pub author: Address,
}
