use soroban_sdk::{log, Env, String};

use crate::errors::ContractError;
use crate::events::{self, ChainBreakEvent};
use crate::group;
use crate::ledger;
use crate::membership;
use crate::storage;
use crate::types::{
    ChainBreak, GroupState, MemberStatus, SavingsGroup, SECONDS_PER_DAY, SECONDS_PER_HOUR,
};

/// The group fails once more than this share of its seats (in basis points)
/// is chain-broken at the same time.
pub const FAILURE_THRESHOLD_BPS: u32 = 5_000;

const BPS_DENOMINATOR: u32 = 10_000;

/// Permissionless tick over the current round of a group. Once the grace
/// window has closed, every active member without an on-time contribution
/// is flagged, gets a [`ChainBreak`] record and is charged the late fee as a
/// penalty obligation. A round is scanned at most once. Returns how many
/// members were flagged.
pub fn process_chain_breaks(env: &Env, group_id: u64) -> Result<u32, ContractError> {
    let mut group = storage::get_group(env, group_id).ok_or(ContractError::GroupNotFound)?;
    ledger::ensure_integrity(env, group_id)?;
    group::require_active(&group)?;

    let mut round = storage::get_round(env, group_id, group.current_round)
        .ok_or(ContractError::RoundNotFound)?;
    if !round.is_open() || round.chain_checked {
        return Ok(0);
    }

    let deadline = round.due_date + group.grace_period_hours as u64 * SECONDS_PER_HOUR;
    let now = env.ledger().timestamp();
    if now <= deadline {
        return Ok(0);
    }

    let mut flagged = 0u32;
    for address in storage::get_roster(env, group_id).iter() {
        let mut member = match storage::get_member(env, group_id, &address) {
            Some(member) if member.status == MemberStatus::Active => member,
            _ => continue,
        };

        let paid = storage::get_round_contribution(env, group_id, round.round_number, &address);
        let on_time = paid
            .as_ref()
            .map(|c| c.amount > 0 && c.first_at <= deadline)
            .unwrap_or(false);
        if on_time {
            continue;
        }

        let penalty_until = now + group.chain_break_penalty_days as u64 * SECONDS_PER_DAY;
        let fee = late_fee(&group)?;
        let shortfall = group.contribution_amount - paid.map(|c| c.amount).unwrap_or(0);

        member.status = MemberStatus::ChainBroken;
        member.penalty_until = penalty_until;
        member.makeup_owed = member
            .makeup_owed
            .checked_add(shortfall.max(0))
            .and_then(|v| v.checked_add(fee))
            .ok_or(ContractError::ArithmeticOverflow)?;
        storage::set_member(env, &member);

        let reason = String::from_str(env, "missed contribution");
        storage::add_chain_break(
            env,
            &ChainBreak {
                group_id,
                member: address.clone(),
                round_number: round.round_number,
                detected_at: now,
                reason: reason.clone(),
                penalty_until,
            },
        );

        if fee > 0 {
            ledger::record_penalty(env, group_id, &address, fee, round.round_number, reason)?;
        }

        events::chain_broken(
            env,
            ChainBreakEvent {
                group_id,
                member: address,
                round_number: round.round_number,
                penalty_until,
            },
        );
        flagged += 1;
    }

    round.chain_checked = true;
    storage::set_round(env, &round);

    if flagged > 0 {
        log!(env, "group {} round {}: {} chain breaks", group_id, round.round_number, flagged);
        if rotation_unrecoverable(env, &group) {
            group::set_state(env, &mut group, GroupState::Failed, None, None);
            storage::set_group(env, &group);
        }
    }

    Ok(flagged)
}

/// Late fee charged on a missed contribution, rounded down.
pub fn late_fee(group: &SavingsGroup) -> Result<i128, ContractError> {
    group
        .contribution_amount
        .checked_mul(group.late_fee_percentage as i128)
        .map(|v| v / 100)
        .ok_or(ContractError::ArithmeticOverflow)
}

fn rotation_unrecoverable(env: &Env, group: &SavingsGroup) -> bool {
    let broken = membership::count_with_status(env, group.id, MemberStatus::ChainBroken);
    (broken as u64) * BPS_DENOMINATOR as u64
        > (group.max_members as u64) * FAILURE_THRESHOLD_BPS as u64
}
