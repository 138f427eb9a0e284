use soroban_sdk::{log, Address, Env, String};

use crate::errors::ContractError;
use crate::events;
use crate::group;
use crate::ledger;
use crate::storage;
use crate::types::{RoundContribution, Settlement};
use crate::wallet::Wallet;

/// Contribute `amount` to `round_number` of a group.
///
/// The ledger entry is committed before the member's wallet is debited. If
/// the debit fails the entry is reversed and the outcome says so; the
/// original entry stays in the ledger either way.
pub fn contribute(
    env: &Env,
    member: Address,
    group_id: u64,
    round_number: u32,
    amount: i128,
) -> Result<Settlement, ContractError> {
    member.require_auth();

    let group = storage::get_group(env, group_id).ok_or(ContractError::GroupNotFound)?;
    ledger::ensure_integrity(env, group_id)?;
    group::require_active(&group)?;

    let entry = ledger::record_contribution(
        env,
        group_id,
        group.contribution_amount,
        &member,
        amount,
        round_number,
    )?;

    if !Wallet::new(env, &group.token).debit(&member, amount) {
        log!(env, "contribution debit failed for group {}, reversing", group_id);
        let reversal = ledger::record_reversal(
            env,
            group_id,
            entry.id,
            String::from_str(env, "wallet debit failed"),
        )?;
        return Ok(Settlement::Reversed(reversal.id));
    }

    if let Some(round) = storage::get_round(env, group_id, round_number) {
        if round.funded_amount >= round.required_amount {
            events::round_funded(env, group_id, round_number, round.funded_amount);
        }
    }

    Ok(Settlement::Settled(entry.id))
}

pub fn get_round_contribution(
    env: &Env,
    member: Address,
    group_id: u64,
    round: u32,
) -> Option<RoundContribution> {
    storage::get_round_contribution(env, group_id, round, &member)
}

pub fn has_contributed(
    env: &Env,
    member: Address,
    group_id: u64,
    round: u32,
) -> Result<bool, ContractError> {
    storage::get_round(env, group_id, round).ok_or(ContractError::RoundNotFound)?;
    Ok(storage::get_round_contribution(env, group_id, round, &member)
        .map(|c| c.amount > 0)
        .unwrap_or(false))
}
