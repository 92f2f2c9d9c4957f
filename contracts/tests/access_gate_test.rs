//! Integration tests for the access gate.
//!
//! These tests walk the gate through the same operator flows a live
//! deployment sees: opening a vault, gating it behind a guest tree, listing
//! late additions by hand, banning and unbanning, and filling caps.

use bouncer_contracts::access_gate::{AccessGate, AccessGrant, Denial, GateError};
use bouncer_contracts::router::DepositRouter;
use bouncer_protocol::testing::GuestTree;
use bouncer_protocol::vault::{InMemoryToken, InMemoryVault, Token, Vault};
use bouncer_protocol::{Address, Amount, Hash32, VaultId};

const GOV: Address = Address::repeat_byte(0x0a);
const RANDO: Address = Address::repeat_byte(0x99);
const VAULT: VaultId = Address::repeat_byte(0x11);

/// Helper: a gate with the vault uncapped.
fn open_gate() -> AccessGate {
    let mut gate = AccessGate::new(GOV);
    gate.set_total_deposit_cap(&GOV, VAULT, Amount::MAX).unwrap();
    gate
}

fn some_root() -> Hash32 {
    "0xc8eb7b9a26b0681320a4f6db1c93891f573fa496b6a99653f11cba4616899027"
        .parse()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Root Resolution
// ---------------------------------------------------------------------------

#[test]
fn unlisted_address_allowed_without_any_root() {
    let gate = AccessGate::new(GOV);
    assert!(gate.is_allowed(&VAULT, &RANDO, &[]));
}

#[test]
fn default_root_blocks_unlisted_address_without_proof() {
    let mut gate = AccessGate::new(GOV);
    gate.set_default_guest_list_root(&GOV, some_root()).unwrap();
    assert!(!gate.vault_guests(&VAULT, &RANDO));
    assert!(!gate.is_allowed(&VAULT, &RANDO, &[]));
}

#[test]
fn removed_vault_root_beats_default_root() {
    let mut gate = AccessGate::new(GOV);
    gate.set_default_guest_list_root(&GOV, some_root()).unwrap();
    gate.set_root_for_vault(&GOV, VAULT, some_root()).unwrap();
    assert!(!gate.is_allowed(&VAULT, &RANDO, &[]));

    gate.remove_root_for_vault(&GOV, VAULT).unwrap();
    assert_eq!(gate.default_guest_list_root(), some_root());
    assert!(gate.is_allowed(&VAULT, &RANDO, &[]));
}

#[test]
fn disabled_vault_admits_any_proof() {
    let mut gate = AccessGate::new(GOV);
    gate.remove_root_for_vault(&GOV, VAULT).unwrap();
    for n in 0..8u8 {
        let account = Address::repeat_byte(n);
        let junk = vec![Hash32::repeat_byte(n); n as usize];
        assert!(gate.is_allowed(&VAULT, &account, &[]));
        assert!(gate.is_allowed(&VAULT, &account, &junk));
    }
}

#[test]
fn vault_root_applies_even_when_default_is_cleared() {
    let mut gate = AccessGate::new(GOV);
    gate.set_default_guest_list_root(&GOV, some_root()).unwrap();
    gate.set_default_guest_list_root(&GOV, Hash32::ZERO).unwrap();
    gate.set_root_for_vault(&GOV, VAULT, some_root()).unwrap();
    assert!(!gate.is_allowed(&VAULT, &RANDO, &[]));
}

// ---------------------------------------------------------------------------
// Merkle Admission
// ---------------------------------------------------------------------------

#[test]
fn tree_members_deposit_with_proofs() {
    let members: Vec<Address> = (1..=6).map(Address::repeat_byte).collect();
    let tree = GuestTree::new(&members);
    let mut gate = open_gate();
    gate.set_default_guest_list_root(&GOV, tree.root()).unwrap();

    for member in &members {
        let proof = tree.proof(member).unwrap();
        let admission = gate.admit_deposit(&VAULT, member, 100, &proof).unwrap();
        assert_eq!(admission.grant, AccessGrant::Proof { root: tree.root() });
    }
    assert_eq!(gate.deposited_total(&VAULT), 600);

    // A stranger reusing a member's proof is refused.
    let proof = tree.proof(&members[0]).unwrap();
    assert_eq!(
        gate.admit_deposit(&VAULT, &RANDO, 100, &proof),
        Err(GateError::NotAllowed {
            vault: VAULT,
            account: RANDO,
            reason: Denial::InvalidProof
        })
    );
}

#[test]
fn tampered_proof_is_refused() {
    let members: Vec<Address> = (1..=4).map(Address::repeat_byte).collect();
    let tree = GuestTree::new(&members);
    let mut gate = open_gate();
    gate.set_root_for_vault(&GOV, VAULT, tree.root()).unwrap();

    let mut proof = tree.proof(&members[1]).unwrap();
    proof[0] = Hash32::repeat_byte(0xee);
    assert!(!gate.is_allowed(&VAULT, &members[1], &proof));
}

// ---------------------------------------------------------------------------
// Manual Guests & Bans
// ---------------------------------------------------------------------------

#[test]
fn manual_guest_ban_and_removal_flow() {
    let mut gate = open_gate();
    let balance: Amount = 1_000_000;
    gate.set_user_deposit_cap(&GOV, VAULT, balance).unwrap();

    // Open vault: unlisted user deposits.
    gate.admit_deposit(&VAULT, &RANDO, balance / 4, &[]).unwrap();

    // Gate it: the same user is refused.
    gate.set_root_for_vault(&GOV, VAULT, some_root()).unwrap();
    assert!(gate.admit_deposit(&VAULT, &RANDO, balance / 4, &[]).is_err());

    // Listed by hand: admitted without a proof.
    gate.set_vault_guests(&GOV, VAULT, &[RANDO], &[true]).unwrap();
    let admission = gate.admit_deposit(&VAULT, &RANDO, balance / 4, &[]).unwrap();
    assert_eq!(admission.grant, AccessGrant::Guest);

    // Banned: the guest flag no longer helps.
    gate.ban_address(&GOV, RANDO).unwrap();
    assert!(matches!(
        gate.admit_deposit(&VAULT, &RANDO, balance / 4, &[]),
        Err(GateError::NotAllowed { reason: Denial::Banned, .. })
    ));

    // Unbanned: admitted again.
    gate.unban_address(&GOV, RANDO).unwrap();
    gate.admit_deposit(&VAULT, &RANDO, balance / 4, &[]).unwrap();

    // Delisted: refused.
    gate.set_vault_guests(&GOV, VAULT, &[RANDO], &[false]).unwrap();
    assert!(gate.admit_deposit(&VAULT, &RANDO, balance / 4, &[]).is_err());

    // Root removed: open again, up to the user cap.
    gate.remove_root_for_vault(&GOV, VAULT).unwrap();
    gate.admit_deposit(&VAULT, &RANDO, balance / 4, &[]).unwrap();
    assert_eq!(gate.deposited_by_user(&VAULT, &RANDO), balance);
    assert!(matches!(
        gate.admit_deposit(&VAULT, &RANDO, 1, &[]),
        Err(GateError::UserCapExceeded { .. })
    ));
}

#[test]
fn ban_is_global_across_vaults() {
    let mut gate = AccessGate::new(GOV);
    let other: VaultId = Address::repeat_byte(0x22);
    gate.set_vault_guests(&GOV, other, &[RANDO], &[true]).unwrap();
    gate.ban_address(&GOV, RANDO).unwrap();
    assert!(!gate.is_allowed(&VAULT, &RANDO, &[]));
    assert!(!gate.is_allowed(&other, &RANDO, &[]));
}

// ---------------------------------------------------------------------------
// Caps
// ---------------------------------------------------------------------------

#[test]
fn dual_caps_then_uncapped() {
    let balance: Amount = 4_000_000;
    let mut gate = AccessGate::new(GOV);
    gate.set_user_deposit_cap(&GOV, VAULT, balance / 4).unwrap();
    gate.set_total_deposit_cap(&GOV, VAULT, balance / 2).unwrap();

    let first = Address::repeat_byte(1);
    let second = Address::repeat_byte(2);
    let third = Address::repeat_byte(3);

    gate.admit_deposit(&VAULT, &first, balance / 4, &[]).unwrap();
    gate.admit_deposit(&VAULT, &second, balance / 4, &[]).unwrap();
    assert_eq!(
        gate.admit_deposit(&VAULT, &third, balance / 4, &[]),
        Err(GateError::TotalCapExceeded {
            vault: VAULT,
            cap: balance / 2,
            deposited: balance / 2,
            requested: balance / 4
        })
    );
    assert_eq!(gate.deposited_by_user(&VAULT, &third), 0);

    gate.set_user_deposit_cap(&GOV, VAULT, 0).unwrap();
    gate.set_total_deposit_cap(&GOV, VAULT, Amount::MAX).unwrap();
    gate.admit_deposit(&VAULT, &third, balance, &[]).unwrap();
    assert_eq!(gate.deposited_total(&VAULT), balance * 3 / 2);
}

#[test]
fn remaining_allowances_track_usage() {
    let mut gate = AccessGate::new(GOV);
    gate.set_user_deposit_cap(&GOV, VAULT, 100).unwrap();
    gate.set_total_deposit_cap(&GOV, VAULT, 150).unwrap();
    assert_eq!(gate.remaining_user_deposit_allowed(&VAULT, &RANDO), 100);
    assert_eq!(gate.remaining_total_deposit_allowed(&VAULT), 150);

    gate.admit_deposit(&VAULT, &RANDO, 80, &[]).unwrap();
    assert_eq!(gate.remaining_user_deposit_allowed(&VAULT, &RANDO), 20);
    assert_eq!(gate.remaining_total_deposit_allowed(&VAULT), 70);
}

#[test]
fn lowering_a_cap_below_usage_blocks_further_deposits() {
    let mut gate = open_gate();
    gate.admit_deposit(&VAULT, &RANDO, 500, &[]).unwrap();
    gate.set_total_deposit_cap(&GOV, VAULT, 400).unwrap();
    assert_eq!(gate.remaining_total_deposit_allowed(&VAULT), 0);
    assert!(gate.admit_deposit(&VAULT, &RANDO, 1, &[]).is_err());
    // Recorded usage never shrinks.
    assert_eq!(gate.deposited_total(&VAULT), 500);
}

// ---------------------------------------------------------------------------
// Routed Deposits
// ---------------------------------------------------------------------------

#[test]
fn routed_deposit_through_guest_tree() {
    let router = DepositRouter::new(Address::repeat_byte(0x0e));
    let token_addr = Address::repeat_byte(0x70);
    let members = vec![RANDO, Address::repeat_byte(1), Address::repeat_byte(2)];
    let tree = GuestTree::new(&members);

    let mut gate = open_gate();
    gate.set_root_for_vault(&GOV, VAULT, tree.root()).unwrap();

    let mut token = InMemoryToken::new(token_addr);
    token.mint(&RANDO, 1_000).unwrap();
    token.approve(&RANDO, &router.address(), 1_000);
    let mut vault = InMemoryVault::new(VAULT, token_addr, GOV, "Guarded Vault", "gVLT");

    let proof = tree.proof(&RANDO).unwrap();
    let receipt = router
        .deposit(&mut gate, &mut token, &mut vault, &RANDO, 250, &proof)
        .unwrap();
    assert_eq!(receipt.shares, 250);
    assert_eq!(receipt.admission.deposited_total, 250);
    assert_eq!(vault.balance_of(&RANDO), 250);
    assert_eq!(vault.price_per_share(), 10u128.pow(18));
    assert_eq!(token.balance_of(&VAULT), 250);

    // Withdrawing is never gated and never rewinds the ledger.
    assert_eq!(vault.withdraw(&RANDO, 250).unwrap(), 250);
    assert_eq!(gate.deposited_by_user(&VAULT, &RANDO), 250);
}
