use soroban_sdk::{log, symbol_short, Address, Env, String, Vec};

use crate::admin;
use crate::errors::ContractError;
use crate::events;
use crate::storage;
use crate::types::{ChainBreak, Member, MemberStatus, PayoutOrderRule, SavingsGroup};
use crate::validation::require_reason;

/// Hand out payout positions 1..=n over the roster. Positions are written
/// once, at lock time, and never reassigned.
pub fn assign_positions(env: &Env, group: &SavingsGroup) -> Result<(), ContractError> {
    let mut order = storage::get_roster(env, group.id);

    if group.payout_order_rule == PayoutOrderRule::RandomizedAtLock {
        // Fisher-Yates over the host PRNG.
        let n = order.len();
        let mut i = n;
        while i > 1 {
            i -= 1;
            let j: u64 = env.prng().gen_range(0..=(i as u64));
            let j = j as u32;
            if i != j {
                let a = order.get(i).ok_or(ContractError::MemberNotFound)?;
                let b = order.get(j).ok_or(ContractError::MemberNotFound)?;
                order.set(i, b);
                order.set(j, a);
            }
        }
    }

    for (idx, address) in order.iter().enumerate() {
        let position = idx as u32 + 1;
        let mut member =
            storage::get_member(env, group.id, &address).ok_or(ContractError::MemberNotFound)?;
        member.payout_position = position;
        storage::set_member(env, &member);
        storage::set_position_holder(env, group.id, position, &address);
    }
    Ok(())
}

pub fn count_with_status(env: &Env, group_id: u64, status: MemberStatus) -> u32 {
    let mut count = 0;
    for address in storage::get_roster(env, group_id).iter() {
        if let Some(member) = storage::get_member(env, group_id, &address) {
            if member.status == status {
                count += 1;
            }
        }
    }
    count
}

pub fn active_count(env: &Env, group_id: u64) -> u32 {
    count_with_status(env, group_id, MemberStatus::Active)
}

pub fn remove_member(
    env: &Env,
    admin: Address,
    group_id: u64,
    member: Address,
    reason: String,
) -> Result<(), ContractError> {
    require_reason(&reason)?;
    let group = storage::get_group(env, group_id).ok_or(ContractError::GroupNotFound)?;
    admin::require_group_admin(env, &admin, &group)?;

    // Allowed while frozen so incidents can be handled.
    if group.state.is_terminal() {
        return Err(ContractError::GroupClosed);
    }

    let mut record =
        storage::get_member(env, group_id, &member).ok_or(ContractError::MemberNotFound)?;
    if record.status == MemberStatus::Removed {
        return Err(ContractError::MemberAlreadyRemoved);
    }

    record.status = MemberStatus::Removed;
    storage::set_member(env, &record);

    log!(env, "member removed from group {}", group_id);
    events::audit(
        env,
        group_id,
        symbol_short!("remove"),
        Some(admin),
        Some(reason),
    );
    Ok(())
}

/// Back to active. Contributions, obligations and chain-break history are
/// left exactly as they were.
pub fn reinstate_member(
    env: &Env,
    admin: Address,
    group_id: u64,
    member: Address,
) -> Result<(), ContractError> {
    let group = storage::get_group(env, group_id).ok_or(ContractError::GroupNotFound)?;
    admin::require_group_admin(env, &admin, &group)?;

    if group.state.is_terminal() {
        return Err(ContractError::GroupClosed);
    }

    let mut record =
        storage::get_member(env, group_id, &member).ok_or(ContractError::MemberNotFound)?;
    if record.status == MemberStatus::Active {
        return Err(ContractError::MemberAlreadyActive);
    }

    record.status = MemberStatus::Active;
    storage::set_member(env, &record);

    log!(env, "member reinstated in group {}", group_id);
    events::audit(env, group_id, symbol_short!("reinstate"), Some(admin), None);
    Ok(())
}

pub fn get_member(env: &Env, group_id: u64, member: Address) -> Result<Member, ContractError> {
    storage::get_member(env, group_id, &member).ok_or(ContractError::MemberNotFound)
}

/// All members in join order.
pub fn get_members(env: &Env, group_id: u64) -> Result<Vec<Member>, ContractError> {
    if storage::get_group(env, group_id).is_none() {
        return Err(ContractError::GroupNotFound);
    }
    let mut members = Vec::new(env);
    for address in storage::get_roster(env, group_id).iter() {
        let member =
            storage::get_member(env, group_id, &address).ok_or(ContractError::MemberNotFound)?;
        members.push_back(member);
    }
    Ok(members)
}

pub fn get_chain_breaks(env: &Env, group_id: u64, member: Address) -> Vec<ChainBreak> {
    storage::get_chain_breaks(env, group_id, &member)
}
