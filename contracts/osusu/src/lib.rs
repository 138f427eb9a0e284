#![no_std]

use soroban_sdk::{contract, contractimpl, Address, Env, String, Vec};

mod admin;
mod chain_break;
mod contribution;
mod errors;
mod events;
mod group;
mod ledger;
mod membership;
mod payout;
mod storage;
mod types;
mod validation;
mod wallet;

pub use chain_break::FAILURE_THRESHOLD_BPS;
pub use errors::{ContractError, ErrorKind};
pub use events::AuditEvent;
pub use types::*;

#[contract]
pub struct OsusuContract;

#[contractimpl]
impl OsusuContract {
    /// Initialize the protocol with a global admin and default policy limits.
    pub fn __constructor(env: Env, admin: Address) {
        if storage::has_config(&env) {
            panic!("already initialized");
        }
        storage::set_config(&env, &admin::default_config(admin));
    }

    // ─── Configuration ──────────────────────────────────────────────

    pub fn get_config(env: Env) -> Result<ProtocolConfig, ContractError> {
        admin::get_config(&env)
    }

    /// Replace the protocol policy limits. Protocol admin only.
    pub fn update_config(
        env: Env,
        admin: Address,
        config: ProtocolConfig,
    ) -> Result<(), ContractError> {
        admin::update_config(&env, admin, config)
    }

    // ─── Group Lifecycle ────────────────────────────────────────────

    /// Create a new savings group. The caller becomes the group admin.
    pub fn create_group(
        env: Env,
        admin: Address,
        params: GroupParams,
    ) -> Result<u64, ContractError> {
        group::create_group(&env, admin, params)
    }

    /// Join an open group by its join code. Filling the last seat locks the
    /// group and opens round one.
    pub fn join_group(env: Env, member: Address, join_code: String) -> Result<u64, ContractError> {
        group::join_group(&env, member, join_code)
    }

    /// Leave a group (only allowed while the group is still open).
    pub fn leave_group(env: Env, member: Address, group_id: u64) -> Result<(), ContractError> {
        group::leave_group(&env, member, group_id)
    }

    /// Lock a group before it is full and start round one.
    pub fn lock_group(
        env: Env,
        admin: Address,
        group_id: u64,
        reason: String,
    ) -> Result<(), ContractError> {
        group::lock_group(&env, admin, group_id, reason)
    }

    pub fn freeze_group(
        env: Env,
        admin: Address,
        group_id: u64,
        reason: String,
    ) -> Result<(), ContractError> {
        group::freeze_group(&env, admin, group_id, reason)
    }

    pub fn unfreeze_group(
        env: Env,
        admin: Address,
        group_id: u64,
        reason: String,
    ) -> Result<(), ContractError> {
        group::unfreeze_group(&env, admin, group_id, reason)
    }

    pub fn get_group(env: Env, group_id: u64) -> Result<SavingsGroup, ContractError> {
        group::get_group(&env, group_id)
    }

    pub fn get_group_by_code(env: Env, join_code: String) -> Result<SavingsGroup, ContractError> {
        group::get_group_by_code(&env, join_code)
    }

    /// Get all group IDs a member belongs to.
    pub fn get_member_groups(env: Env, member: Address) -> Vec<u64> {
        group::get_member_groups(&env, member)
    }

    /// Transfer group admin role.
    pub fn set_group_admin(
        env: Env,
        current_admin: Address,
        group_id: u64,
        new_admin: Address,
    ) -> Result<(), ContractError> {
        admin::set_group_admin(&env, current_admin, group_id, new_admin)
    }

    // ─── Membership ─────────────────────────────────────────────────

    pub fn remove_member(
        env: Env,
        admin: Address,
        group_id: u64,
        member: Address,
        reason: String,
    ) -> Result<(), ContractError> {
        membership::remove_member(&env, admin, group_id, member, reason)
    }

    pub fn reinstate_member(
        env: Env,
        admin: Address,
        group_id: u64,
        member: Address,
    ) -> Result<(), ContractError> {
        membership::reinstate_member(&env, admin, group_id, member)
    }

    pub fn get_member(env: Env, group_id: u64, member: Address) -> Result<Member, ContractError> {
        membership::get_member(&env, group_id, member)
    }

    pub fn get_members(env: Env, group_id: u64) -> Result<Vec<Member>, ContractError> {
        membership::get_members(&env, group_id)
    }

    pub fn get_chain_breaks(env: Env, group_id: u64, member: Address) -> Vec<ChainBreak> {
        membership::get_chain_breaks(&env, group_id, member)
    }

    // ─── Contributions ──────────────────────────────────────────────

    /// Contribute to the open round of a group.
    pub fn contribute(
        env: Env,
        member: Address,
        group_id: u64,
        round_number: u32,
        amount: i128,
    ) -> Result<Settlement, ContractError> {
        contribution::contribute(&env, member, group_id, round_number, amount)
    }

    /// Get the status of a specific round.
    pub fn get_round(env: Env, group_id: u64, round: u32) -> Result<Round, ContractError> {
        payout::get_round(&env, group_id, round)
    }

    /// Check if a member has contributed in a specific round.
    pub fn has_contributed(
        env: Env,
        member: Address,
        group_id: u64,
        round: u32,
    ) -> Result<bool, ContractError> {
        contribution::has_contributed(&env, member, group_id, round)
    }

    pub fn get_round_contribution(
        env: Env,
        member: Address,
        group_id: u64,
        round: u32,
    ) -> Option<RoundContribution> {
        contribution::get_round_contribution(&env, member, group_id, round)
    }

    // ─── Payouts ────────────────────────────────────────────────────

    pub fn check_round_funding(env: Env, group_id: u64) -> Result<FundingStatus, ContractError> {
        payout::check_round_funding(&env, group_id)
    }

    /// Pay a fully funded round to its rotation recipient. Anyone can call
    /// this once the round is funded.
    pub fn standard_payout(
        env: Env,
        caller: Address,
        group_id: u64,
        round_number: u32,
    ) -> Result<Settlement, ContractError> {
        payout::standard_payout(&env, caller, group_id, round_number)
    }

    /// Pay out whatever the round holds, closing it as partially funded.
    pub fn forced_partial_payout(
        env: Env,
        admin: Address,
        group_id: u64,
        round_number: u32,
        reason: String,
    ) -> Result<Settlement, ContractError> {
        payout::forced_partial_payout(&env, admin, group_id, round_number, reason)
    }

    /// Get the payout order for a group.
    pub fn get_payout_order(env: Env, group_id: u64) -> Result<Vec<Address>, ContractError> {
        payout::get_payout_order(&env, group_id)
    }

    /// Get the current round's recipient.
    pub fn get_current_recipient(env: Env, group_id: u64) -> Result<Address, ContractError> {
        payout::get_current_recipient(&env, group_id)
    }

    // ─── Chain-break monitor ────────────────────────────────────────

    /// Periodic tick: flag members who missed the current round's grace
    /// window. Returns the number flagged.
    pub fn process_chain_breaks(env: Env, group_id: u64) -> Result<u32, ContractError> {
        chain_break::process_chain_breaks(&env, group_id)
    }

    // ─── Ledger ─────────────────────────────────────────────────────

    pub fn refund_member(
        env: Env,
        admin: Address,
        group_id: u64,
        member: Address,
        amount: i128,
        reason: String,
    ) -> Result<Settlement, ContractError> {
        admin::refund_member(&env, admin, group_id, member, amount, reason)
    }

    pub fn get_escrow_balance(env: Env, group_id: u64) -> Result<i128, ContractError> {
        ledger::escrow_balance(&env, group_id)
    }

    pub fn get_totals(env: Env, group_id: u64) -> GroupTotals {
        storage::get_totals(&env, group_id)
    }

    pub fn get_entry(env: Env, group_id: u64, entry_id: u64) -> Result<LedgerEntry, ContractError> {
        ledger::get_entry(&env, group_id, entry_id)
    }

    pub fn get_entries(env: Env, group_id: u64, start: u64, limit: u32) -> Vec<LedgerEntry> {
        ledger::get_entries(&env, group_id, start, limit)
    }

    /// Recompute the group's totals from every ledger entry and fail if they
    /// disagree with the stored counters.
    pub fn audit_ledger(env: Env, group_id: u64) -> Result<GroupTotals, ContractError> {
        ledger::audit(&env, group_id)
    }
}

#[cfg(test)]
mod test;
