use soroban_sdk::{log, symbol_short, Address, Env, String, Vec};

use crate::admin;
use crate::errors::ContractError;
use crate::events::{self, RoundOpenedEvent};
use crate::group;
use crate::ledger;
use crate::membership;
use crate::storage;
use crate::types::{
    FundingStatus, GroupState, MemberStatus, Round, RoundStatus, SavingsGroup, Settlement,
};
use crate::validation::require_reason;
use crate::wallet::Wallet;

/// How a payout treats an underfunded round.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PayoutMode {
    /// Only a fully funded round may be paid.
    Standard,
    /// Pay whatever has been funded and close the round as partial.
    ForcedPartial,
}

/// Create round `round_number` with its requirement fixed from the members
/// active right now. The caller persists `group`.
pub fn open_round(
    env: &Env,
    group: &mut SavingsGroup,
    round_number: u32,
) -> Result<Round, ContractError> {
    let now = env.ledger().timestamp();
    let active = membership::active_count(env, group.id);
    let required_amount = group
        .contribution_amount
        .checked_mul(active as i128)
        .ok_or(ContractError::ArithmeticOverflow)?;

    let round = Round {
        group_id: group.id,
        round_number,
        opened_at: now,
        due_date: now + group.frequency.period_seconds(),
        required_amount,
        funded_amount: 0,
        status: RoundStatus::Open,
        recipient: None,
        paid_amount: 0,
        chain_checked: false,
    };
    storage::set_round(env, &round);
    group.current_round = round_number;

    events::round_opened(
        env,
        RoundOpenedEvent {
            group_id: group.id,
            round_number,
            due_date: round.due_date,
            required_amount,
        },
    );
    Ok(round)
}

pub fn check_round_funding(env: &Env, group_id: u64) -> Result<FundingStatus, ContractError> {
    let group = storage::get_group(env, group_id).ok_or(ContractError::GroupNotFound)?;
    let round = storage::get_round(env, group_id, group.current_round)
        .ok_or(ContractError::RoundNotFound)?;
    Ok(funding_of(&round))
}

fn funding_of(round: &Round) -> FundingStatus {
    FundingStatus {
        round_number: round.round_number,
        required_amount: round.required_amount,
        funded_amount: round.funded_amount,
        fully_funded: round.funded_amount >= round.required_amount,
    }
}

/// Pay a fully funded round. Anyone may call this; keepers do.
pub fn standard_payout(
    env: &Env,
    caller: Address,
    group_id: u64,
    round_number: u32,
) -> Result<Settlement, ContractError> {
    caller.require_auth();
    execute_payout(env, group_id, round_number, PayoutMode::Standard, None, None)
}

/// Admin override: pay out what the round holds even if it is short.
pub fn forced_partial_payout(
    env: &Env,
    admin: Address,
    group_id: u64,
    round_number: u32,
    reason: String,
) -> Result<Settlement, ContractError> {
    require_reason(&reason)?;
    let group = storage::get_group(env, group_id).ok_or(ContractError::GroupNotFound)?;
    admin::require_group_admin(env, &admin, &group)?;
    execute_payout(
        env,
        group_id,
        round_number,
        PayoutMode::ForcedPartial,
        Some(admin),
        Some(reason),
    )
}

/// Shared payout path. The amount paid is always the round's funded amount;
/// the mode only decides whether a shortfall is acceptable.
pub fn execute_payout(
    env: &Env,
    group_id: u64,
    round_number: u32,
    mode: PayoutMode,
    actor: Option<Address>,
    reason: Option<String>,
) -> Result<Settlement, ContractError> {
    let mut group = storage::get_group(env, group_id).ok_or(ContractError::GroupNotFound)?;
    ledger::ensure_integrity(env, group_id)?;
    group::require_active(&group)?;

    let mut round =
        storage::get_round(env, group_id, round_number).ok_or(ContractError::RoundNotFound)?;
    // A retried payout lands here once the round has been paid.
    if !round.is_open() {
        return Err(ContractError::RoundClosed);
    }
    if round_number != group.current_round {
        return Err(ContractError::RoundNotCurrent);
    }

    let recipient = match resolve_recipient(env, &group, round_number) {
        Ok(recipient) => recipient,
        Err(ContractError::NoEligibleRecipient) => {
            return hold_round(env, &mut group, &mut round, actor, reason);
        }
        Err(err) => return Err(err),
    };

    let fully_funded = round.funded_amount >= round.required_amount;
    if mode == PayoutMode::Standard && !fully_funded {
        return Err(ContractError::RoundNotFullyFunded);
    }
    if round.funded_amount <= 0 {
        return Err(ContractError::NothingToPay);
    }

    let amount = round.funded_amount;

    let entry = ledger::record_payout(
        env,
        group_id,
        &recipient,
        amount,
        round_number,
        actor,
        reason,
    )?;

    if !Wallet::new(env, &group.token).credit(&recipient, amount) {
        // The round stays open so the payout can be retried.
        log!(env, "payout credit failed for group {} round {}", group_id, round_number);
        let reversal = ledger::record_reversal(
            env,
            group_id,
            entry.id,
            String::from_str(env, "wallet credit failed"),
        )?;
        return Ok(Settlement::Reversed(reversal.id));
    }

    let mut member =
        storage::get_member(env, group_id, &recipient).ok_or(ContractError::MemberNotFound)?;
    member.received_payout = true;
    storage::set_member(env, &member);

    round.status = if fully_funded {
        RoundStatus::FullyFundedClosed
    } else {
        RoundStatus::PartiallyFundedClosed
    };
    round.recipient = Some(recipient);
    round.paid_amount = amount;
    storage::set_round(env, &round);

    log!(env, "group {} round {} paid {}", group_id, round_number, amount);
    advance_round(env, &mut group)?;
    storage::set_group(env, &group);

    Ok(Settlement::Settled(entry.id))
}

/// Close a round that has nobody left to pay and move the rotation on. The
/// funded amount is not paid out; it stays in escrow for refunds.
fn hold_round(
    env: &Env,
    group: &mut SavingsGroup,
    round: &mut Round,
    actor: Option<Address>,
    reason: Option<String>,
) -> Result<Settlement, ContractError> {
    round.status = RoundStatus::ClosedUnpaid;
    storage::set_round(env, round);

    log!(env, "group {} round {} closed unpaid", group.id, round.round_number);
    events::audit(env, group.id, symbol_short!("rnd_hold"), actor, reason);

    advance_round(env, group)?;
    storage::set_group(env, group);
    Ok(Settlement::Held(round.round_number))
}

/// Move past the closed current round: either open the next one or, after
/// the final round, complete the group.
fn advance_round(env: &Env, group: &mut SavingsGroup) -> Result<(), ContractError> {
    let next = group.current_round + 1;
    if next > group.total_rounds {
        group.current_round = next;
        group::set_state(env, group, GroupState::Completed, None, None);
        return Ok(());
    }
    open_round(env, group, next)?;
    Ok(())
}

/// The member to pay in `round_number`. The rotation slot is the position
/// equal to the round number; if its holder is not active or was already
/// paid, the next eligible position in rotation order takes the slot.
pub fn resolve_recipient(
    env: &Env,
    group: &SavingsGroup,
    round_number: u32,
) -> Result<Address, ContractError> {
    let total = group.total_rounds;
    if total == 0 {
        return Err(ContractError::NoEligibleRecipient);
    }

    let mut position = (round_number - 1) % total + 1;
    for _ in 0..total {
        if let Some(holder) = storage::get_position_holder(env, group.id, position) {
            if let Some(member) = storage::get_member(env, group.id, &holder) {
                if member.status == MemberStatus::Active && !member.received_payout {
                    return Ok(holder);
                }
            }
        }
        position = position % total + 1;
    }
    Err(ContractError::NoEligibleRecipient)
}

/// Payout order by position.
pub fn get_payout_order(env: &Env, group_id: u64) -> Result<Vec<Address>, ContractError> {
    let group = storage::get_group(env, group_id).ok_or(ContractError::GroupNotFound)?;
    let mut order = Vec::new(env);
    for position in 1..=group.total_rounds {
        if let Some(holder) = storage::get_position_holder(env, group_id, position) {
            order.push_back(holder);
        }
    }
    Ok(order)
}

pub fn get_current_recipient(env: &Env, group_id: u64) -> Result<Address, ContractError> {
    let group = storage::get_group(env, group_id).ok_or(ContractError::GroupNotFound)?;
    group::require_active(&group)?;
    resolve_recipient(env, &group, group.current_round)
}

pub fn get_round(env: &Env, group_id: u64, round_number: u32) -> Result<Round, ContractError> {
    storage::get_round(env, group_id, round_number).ok_or(ContractError::RoundNotFound)
}
