// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Bouncer Node
//!
//! Entry point for the `bouncer-node` binary. Parses CLI arguments,
//! initializes logging, and runs one command against a gate policy or
//! registry snapshot loaded from disk.
//!
//! The binary supports four subcommands:
//!
//! - `verify`   - check a Merkle proof against a root
//! - `check`    - evaluate an address (and optionally a deposit) against a gate policy
//! - `registry` - list an author's vaults from a registry snapshot
//! - `version`  - print build version information

mod cli;
mod logging;

use anyhow::{Context, Result};
use bouncer_contracts::{
    AccessGrant, AuthorListing, Denial, EffectiveRoot, GateConfig, GateError, RegistryConfig,
};
use bouncer_protocol::crypto::merkle;
use bouncer_protocol::{Address, Amount, VaultId};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::Path;

use cli::{BouncerCli, Commands};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = BouncerCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, LogFormat::from_str_lossy(&cli.log_format));

    match cli.command {
        Commands::Verify(args) => {
            println!("{}", run_verify(&args));
            Ok(())
        }
        Commands::Check(args) => {
            let report = run_check(&args)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Registry(args) => {
            let listing = run_registry(&args)?;
            println!("{}", serde_json::to_string_pretty(&listing)?);
            Ok(())
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Outcome of the access rules for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum AccessDecision {
    Allowed(AccessGrant),
    Denied(Denial),
}

/// Outcome of a trial deposit against the caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DepositDecision {
    amount: Amount,
    admitted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Everything `check` prints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CheckReport {
    vault: VaultId,
    address: Address,
    effective_root: EffectiveRoot,
    access: AccessDecision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deposit: Option<DepositDecision>,
    remaining_user_deposit: Amount,
    remaining_total_deposit: Amount,
}

/// Verifies a proof and renders the verdict.
fn run_verify(args: &cli::VerifyArgs) -> &'static str {
    let allowed = merkle::verify(&args.root, &args.address, &args.proof);
    tracing::info!(root = %args.root, address = %args.address, depth = args.proof.len(), allowed, "proof checked");
    if allowed {
        "allowed"
    } else {
        "denied"
    }
}

/// Loads a gate policy and evaluates one address against it.
///
/// The gate is rebuilt from the file on every call, so a trial deposit
/// never outlives the command.
fn run_check(args: &cli::CheckArgs) -> Result<CheckReport> {
    let json = read_config(&args.config)?;
    let mut gate = GateConfig::from_json(&json)
        .and_then(|config| config.build())
        .with_context(|| format!("invalid gate config {}", args.config.display()))?;

    let access = match gate.check_access(&args.vault, &args.address, &args.proof) {
        Ok(grant) => AccessDecision::Allowed(grant),
        Err(GateError::NotAllowed { reason, .. }) => AccessDecision::Denied(reason),
        Err(other) => return Err(other.into()),
    };

    let deposit = args.amount.map(|amount| {
        match gate.admit_deposit(&args.vault, &args.address, amount, &args.proof) {
            Ok(_) => DepositDecision {
                amount,
                admitted: true,
                error: None,
            },
            Err(e) => DepositDecision {
                amount,
                admitted: false,
                error: Some(e.to_string()),
            },
        }
    });

    Ok(CheckReport {
        vault: args.vault,
        address: args.address,
        effective_root: gate.effective_root(&args.vault),
        access,
        deposit,
        remaining_user_deposit: gate.remaining_user_deposit_allowed(&args.vault, &args.address),
        remaining_total_deposit: gate.remaining_total_deposit_allowed(&args.vault),
    })
}

/// Loads a registry snapshot and lists one author's vaults.
fn run_registry(args: &cli::RegistryArgs) -> Result<AuthorListing> {
    let json = read_config(&args.config)?;
    let registry = RegistryConfig::from_json(&json)
        .and_then(|config| config.build())
        .with_context(|| format!("invalid registry config {}", args.config.display()))?;

    let vaults = registry.from_author(&args.author);
    tracing::info!(author = %args.author, count = vaults.len(), "registry listing");
    Ok(AuthorListing {
        author: args.author,
        vaults,
    })
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))
}

/// Prints version information to stdout.
fn print_version() {
    println!("bouncer-node {}", env!("CARGO_PKG_VERSION"));
    println!(
        "leaf domain  {}",
        String::from_utf8_lossy(bouncer_protocol::config::LEAF_DOMAIN)
    );
    println!("rustc        {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
