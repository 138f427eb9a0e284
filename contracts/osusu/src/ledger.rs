use soroban_sdk::{Address, Env, String, Vec};

use crate::errors::ContractError;
use crate::events::{self, LedgerEvent};
use crate::storage;
use crate::types::{EntryKind, GroupTotals, LedgerEntry, MemberStatus, RoundContribution};
use crate::validation::require_positive;

/// Escrow is `contributions - payouts - refunds`. Penalties are obligations
/// and never count towards it.
pub fn escrow_of(totals: &GroupTotals) -> Result<i128, ContractError> {
    totals
        .contributions
        .checked_sub(totals.payouts)
        .and_then(|v| v.checked_sub(totals.refunds))
        .ok_or(ContractError::ArithmeticOverflow)
}

pub fn escrow_balance(env: &Env, group_id: u64) -> Result<i128, ContractError> {
    escrow_of(&storage::get_totals(env, group_id))
}

/// Precheck run before every mutation of a group. `append` validates the
/// totals it writes, so counters only fail here if they were written outside
/// the ledger (restored or migrated state); such a group takes no writes.
pub fn ensure_integrity(env: &Env, group_id: u64) -> Result<(), ContractError> {
    check_totals(&storage::get_totals(env, group_id))
}

fn check_totals(totals: &GroupTotals) -> Result<(), ContractError> {
    if totals.contributions < 0 || totals.payouts < 0 || totals.refunds < 0 || totals.penalties < 0
    {
        return Err(ContractError::LedgerIntegrity);
    }
    if escrow_of(totals)? < 0 {
        return Err(ContractError::LedgerIntegrity);
    }
    Ok(())
}

/// Fold one entry into the totals. `reversed` is the kind of the entry a
/// reversal cancels.
fn apply(
    totals: &GroupTotals,
    kind: EntryKind,
    amount: i128,
    reversed: Option<EntryKind>,
) -> Result<GroupTotals, ContractError> {
    let mut next = totals.clone();
    let overflow = ContractError::ArithmeticOverflow;
    match (kind, reversed) {
        (EntryKind::Contribution, _) => {
            next.contributions = next.contributions.checked_add(amount).ok_or(overflow)?
        }
        (EntryKind::Payout, _) => next.payouts = next.payouts.checked_add(amount).ok_or(overflow)?,
        (EntryKind::Refund, _) => next.refunds = next.refunds.checked_add(amount).ok_or(overflow)?,
        (EntryKind::Penalty, _) => {
            next.penalties = next.penalties.checked_add(amount).ok_or(overflow)?
        }
        (EntryKind::Reversal, Some(EntryKind::Contribution)) => {
            next.contributions = next.contributions.checked_sub(amount).ok_or(overflow)?
        }
        (EntryKind::Reversal, Some(EntryKind::Payout)) => {
            next.payouts = next.payouts.checked_sub(amount).ok_or(overflow)?
        }
        (EntryKind::Reversal, Some(EntryKind::Refund)) => {
            next.refunds = next.refunds.checked_sub(amount).ok_or(overflow)?
        }
        (EntryKind::Reversal, Some(EntryKind::Penalty)) => {
            next.penalties = next.penalties.checked_sub(amount).ok_or(overflow)?
        }
        (EntryKind::Reversal, _) => return Err(ContractError::LedgerIntegrity),
    }
    next.entry_count = next.entry_count.checked_add(1).ok_or(overflow)?;
    Ok(next)
}

#[allow(clippy::too_many_arguments)]
fn append(
    env: &Env,
    group_id: u64,
    member: Option<Address>,
    kind: EntryKind,
    amount: i128,
    round_number: u32,
    actor: Option<Address>,
    reason: Option<String>,
    reverses: Option<(u64, EntryKind)>,
) -> Result<LedgerEntry, ContractError> {
    let totals = storage::get_totals(env, group_id);
    let next = apply(&totals, kind, amount, reverses.map(|(_, k)| k))?;
    check_totals(&next)?;

    let entry = LedgerEntry {
        id: next.entry_count,
        group_id,
        member,
        kind,
        amount,
        round_number,
        timestamp: env.ledger().timestamp(),
        actor,
        reason,
        reverses: reverses.map(|(id, _)| id),
    };
    storage::set_entry(env, &entry);
    storage::set_totals(env, group_id, &next);

    events::ledger_entry(
        env,
        LedgerEvent {
            group_id,
            entry_id: entry.id,
            kind,
            member: entry.member.clone(),
            amount,
            round_number,
        },
    );
    Ok(entry)
}

/// Record a member's contribution to the open round, updating the round's
/// funded amount and the member's running total alongside the entry.
///
/// The group must already have passed its state guard; this checks the round,
/// the member and the amount.
pub fn record_contribution(
    env: &Env,
    group_id: u64,
    contribution_amount: i128,
    member: &Address,
    amount: i128,
    round_number: u32,
) -> Result<LedgerEntry, ContractError> {
    require_positive(amount)?;
    if amount > contribution_amount {
        return Err(ContractError::ExceedsContribution);
    }

    let mut round =
        storage::get_round(env, group_id, round_number).ok_or(ContractError::RoundNotFound)?;
    if !round.is_open() {
        return Err(ContractError::RoundClosed);
    }

    let mut record =
        storage::get_member(env, group_id, member).ok_or(ContractError::MemberNotFound)?;
    if record.status != MemberStatus::Active {
        return Err(ContractError::MemberNotActive);
    }

    let now = env.ledger().timestamp();
    let mut so_far = storage::get_round_contribution(env, group_id, round_number, member)
        .unwrap_or(RoundContribution {
            amount: 0,
            first_at: now,
        });
    if so_far.amount == 0 {
        so_far.first_at = now;
    }
    let new_amount = so_far
        .amount
        .checked_add(amount)
        .ok_or(ContractError::ArithmeticOverflow)?;
    if new_amount > contribution_amount {
        return Err(ContractError::ExceedsContribution);
    }

    let entry = append(
        env,
        group_id,
        Some(member.clone()),
        EntryKind::Contribution,
        amount,
        round_number,
        None,
        None,
        None,
    )?;

    so_far.amount = new_amount;
    round.funded_amount = round
        .funded_amount
        .checked_add(amount)
        .ok_or(ContractError::ArithmeticOverflow)?;
    record.total_contributed = record
        .total_contributed
        .checked_add(amount)
        .ok_or(ContractError::ArithmeticOverflow)?;

    storage::set_round_contribution(env, group_id, round_number, member, &so_far);
    storage::set_round(env, &round);
    storage::set_member(env, &record);

    Ok(entry)
}

/// Record a payout out of escrow. Paying more than escrow holds is an
/// integrity failure, not a user error.
pub fn record_payout(
    env: &Env,
    group_id: u64,
    member: &Address,
    amount: i128,
    round_number: u32,
    actor: Option<Address>,
    reason: Option<String>,
) -> Result<LedgerEntry, ContractError> {
    require_positive(amount)?;
    append(
        env,
        group_id,
        Some(member.clone()),
        EntryKind::Payout,
        amount,
        round_number,
        actor,
        reason,
        None,
    )
}

pub fn record_penalty(
    env: &Env,
    group_id: u64,
    member: &Address,
    amount: i128,
    round_number: u32,
    reason: String,
) -> Result<LedgerEntry, ContractError> {
    require_positive(amount)?;
    append(
        env,
        group_id,
        Some(member.clone()),
        EntryKind::Penalty,
        amount,
        round_number,
        None,
        Some(reason),
        None,
    )
}

/// Return escrowed funds to a member.
///
/// With a `round_number` the refund comes out of what the member paid into
/// that open round, and the round and member counters move back with it.
/// `round_number == 0` refunds leftover escrow of a closed-out group and is
/// only checked against escrow.
pub fn record_refund(
    env: &Env,
    group_id: u64,
    member: &Address,
    amount: i128,
    round_number: u32,
    actor: Address,
    reason: String,
) -> Result<LedgerEntry, ContractError> {
    require_positive(amount)?;
    if amount > escrow_balance(env, group_id)? {
        return Err(ContractError::InsufficientEscrow);
    }
    if round_number > 0 {
        let round =
            storage::get_round(env, group_id, round_number).ok_or(ContractError::RoundNotFound)?;
        if !round.is_open() {
            return Err(ContractError::RoundClosed);
        }
        let paid = storage::get_round_contribution(env, group_id, round_number, member)
            .map(|c| c.amount)
            .unwrap_or(0);
        if amount > paid {
            return Err(ContractError::InsufficientEscrow);
        }
    }

    let entry = append(
        env,
        group_id,
        Some(member.clone()),
        EntryKind::Refund,
        amount,
        round_number,
        Some(actor),
        Some(reason),
        None,
    )?;

    if round_number > 0 {
        shift_round_contribution(env, group_id, member, round_number, -amount)?;
    }
    Ok(entry)
}

/// Cancel an entry whose wallet settlement failed. Reversing a contribution
/// also rolls back the round and member counters it moved.
pub fn record_reversal(
    env: &Env,
    group_id: u64,
    entry_id: u64,
    reason: String,
) -> Result<LedgerEntry, ContractError> {
    let original =
        storage::get_entry(env, group_id, entry_id).ok_or(ContractError::EntryNotFound)?;

    let reversal = append(
        env,
        group_id,
        original.member.clone(),
        EntryKind::Reversal,
        original.amount,
        original.round_number,
        None,
        Some(reason),
        Some((original.id, original.kind)),
    )?;

    // Round-linked entries also moved the round and member counters.
    let delta = match original.kind {
        EntryKind::Contribution => -original.amount,
        EntryKind::Refund if original.round_number > 0 => original.amount,
        _ => 0,
    };
    if delta != 0 {
        if let Some(member) = original.member.as_ref() {
            shift_round_contribution(env, group_id, member, original.round_number, delta)?;
        }
    }

    Ok(reversal)
}

/// Move a member's paid-in amount for a round by `delta`, keeping the
/// round's funded amount and the member's running total in step. A record
/// that drops to zero is kept so its first payment time survives a reversal.
fn shift_round_contribution(
    env: &Env,
    group_id: u64,
    member: &Address,
    round_number: u32,
    delta: i128,
) -> Result<(), ContractError> {
    let mut round =
        storage::get_round(env, group_id, round_number).ok_or(ContractError::RoundNotFound)?;
    let mut record =
        storage::get_member(env, group_id, member).ok_or(ContractError::MemberNotFound)?;
    let mut so_far = storage::get_round_contribution(env, group_id, round_number, member)
        .ok_or(ContractError::LedgerIntegrity)?;

    let overflow = ContractError::ArithmeticOverflow;
    round.funded_amount = round.funded_amount.checked_add(delta).ok_or(overflow)?;
    record.total_contributed = record.total_contributed.checked_add(delta).ok_or(overflow)?;
    so_far.amount = so_far.amount.checked_add(delta).ok_or(overflow)?;
    if round.funded_amount < 0 || record.total_contributed < 0 || so_far.amount < 0 {
        return Err(ContractError::LedgerIntegrity);
    }

    storage::set_round_contribution(env, group_id, round_number, member, &so_far);
    storage::set_round(env, &round);
    storage::set_member(env, &record);
    Ok(())
}

/// Recompute the totals from every entry and compare them with the
/// materialized counters.
pub fn audit(env: &Env, group_id: u64) -> Result<GroupTotals, ContractError> {
    let stored = storage::get_totals(env, group_id);
    let mut scanned = GroupTotals::default();

    for id in 1..=stored.entry_count {
        let entry = storage::get_entry(env, group_id, id).ok_or(ContractError::LedgerIntegrity)?;
        let reversed = match entry.reverses {
            Some(target) => Some(
                storage::get_entry(env, group_id, target)
                    .ok_or(ContractError::LedgerIntegrity)?
                    .kind,
            ),
            None => None,
        };
        scanned = apply(&scanned, entry.kind, entry.amount, reversed)?;
    }

    check_totals(&scanned)?;
    if scanned != stored {
        return Err(ContractError::LedgerIntegrity);
    }
    Ok(scanned)
}

pub fn get_entry(env: &Env, group_id: u64, entry_id: u64) -> Result<LedgerEntry, ContractError> {
    storage::get_entry(env, group_id, entry_id).ok_or(ContractError::EntryNotFound)
}

/// Page through a group's entries, oldest first.
pub fn get_entries(env: &Env, group_id: u64, start: u64, limit: u32) -> Vec<LedgerEntry> {
    let total = storage::get_totals(env, group_id).entry_count;
    let mut out = Vec::new(env);
    let first = start.max(1);
    let mut id = first;
    while id <= total && out.len() < limit {
        if let Some(entry) = storage::get_entry(env, group_id, id) {
            out.push_back(entry);
        }
        id += 1;
    }
    out
}
