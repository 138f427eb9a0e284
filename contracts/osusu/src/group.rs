use soroban_sdk::{log, Address, Env, String, Vec};

use crate::admin;
use crate::errors::ContractError;
use crate::events;
use crate::membership;
use crate::payout;
use crate::storage;
use crate::types::{
    FreezeRecord, GroupParams, GroupState, Member, MemberStatus, SavingsGroup, StateTag,
};
use crate::validation::{require_reason, validate_group_params, MIN_MEMBERS};

pub fn create_group(
    env: &Env,
    admin: Address,
    params: GroupParams,
) -> Result<u64, ContractError> {
    admin.require_auth();

    let config = admin::get_config(env)?;
    validate_group_params(&params, &config)?;

    if storage::get_group_by_code(env, &params.join_code).is_some() {
        return Err(ContractError::DuplicateJoinCode);
    }

    let group_id = storage::get_group_counter(env) + 1;
    storage::set_group_counter(env, group_id);

    let group = SavingsGroup {
        id: group_id,
        name: params.name,
        join_code: params.join_code.clone(),
        admin: admin.clone(),
        token: params.token,
        contribution_amount: params.contribution_amount,
        frequency: params.frequency,
        max_members: params.max_members,
        payout_order_rule: params.payout_order_rule,
        late_fee_percentage: params.late_fee_percentage,
        grace_period_hours: params.grace_period_hours,
        chain_break_penalty_days: params.chain_break_penalty_days,
        state: GroupState::Open,
        member_count: 0,
        current_round: 0,
        total_rounds: 0,
        created_at: env.ledger().timestamp(),
    };

    storage::set_group(env, &group);
    storage::set_join_code(env, &params.join_code, group_id);

    log!(env, "group {} created", group_id);
    events::audit(
        env,
        group_id,
        soroban_sdk::symbol_short!("create"),
        Some(admin),
        None,
    );

    Ok(group_id)
}

/// Join by code. The member that fills the last seat locks the group and
/// starts round one.
pub fn join_group(env: &Env, member: Address, join_code: String) -> Result<u64, ContractError> {
    member.require_auth();

    let group_id = storage::get_group_by_code(env, &join_code).ok_or(ContractError::InvalidJoinCode)?;
    let mut group = storage::get_group(env, group_id).ok_or(ContractError::GroupNotFound)?;

    match group.state {
        GroupState::Open => {}
        GroupState::Frozen(_) => return Err(ContractError::GroupFrozen),
        _ => return Err(ContractError::GroupNotOpen),
    }

    if group.member_count >= group.max_members {
        return Err(ContractError::GroupFull);
    }

    if storage::get_member(env, group_id, &member).is_some() {
        return Err(ContractError::AlreadyMember);
    }

    storage::set_member(
        env,
        &Member {
            address: member.clone(),
            group_id,
            payout_position: 0,
            status: MemberStatus::Active,
            total_contributed: 0,
            makeup_owed: 0,
            penalty_until: 0,
            received_payout: false,
            joined_at: env.ledger().timestamp(),
        },
    );

    let mut roster = storage::get_roster(env, group_id);
    roster.push_back(member.clone());
    storage::set_roster(env, group_id, &roster);
    storage::add_member_group(env, &member, group_id);

    group.member_count += 1;
    events::member_joined(env, group_id, &member);

    if group.member_count == group.max_members {
        lock(env, &mut group, None, None)?;
    }
    storage::set_group(env, &group);

    Ok(group_id)
}

pub fn leave_group(env: &Env, member: Address, group_id: u64) -> Result<(), ContractError> {
    member.require_auth();

    let mut group = storage::get_group(env, group_id).ok_or(ContractError::GroupNotFound)?;

    if group.state != GroupState::Open {
        return Err(ContractError::GroupNotOpen);
    }

    let mut found = false;
    let mut new_roster = Vec::new(env);
    for m in storage::get_roster(env, group_id).iter() {
        if m == member {
            found = true;
        } else {
            new_roster.push_back(m);
        }
    }

    if !found {
        return Err(ContractError::MemberNotFound);
    }

    storage::set_roster(env, group_id, &new_roster);
    storage::remove_member_record(env, group_id, &member);
    storage::remove_member_group(env, &member, group_id);

    group.member_count -= 1;
    storage::set_group(env, &group);

    events::member_left(env, group_id, &member);

    Ok(())
}

/// Admin-forced early lock of a group that has not filled up.
pub fn lock_group(
    env: &Env,
    admin: Address,
    group_id: u64,
    reason: String,
) -> Result<(), ContractError> {
    require_reason(&reason)?;
    let mut group = storage::get_group(env, group_id).ok_or(ContractError::GroupNotFound)?;
    admin::require_group_admin(env, &admin, &group)?;

    match group.state {
        GroupState::Open => {}
        GroupState::Frozen(_) => return Err(ContractError::GroupFrozen),
        _ => return Err(ContractError::GroupNotOpen),
    }

    if group.member_count < MIN_MEMBERS {
        return Err(ContractError::InsufficientMembers);
    }

    lock(env, &mut group, Some(admin), Some(reason))?;
    storage::set_group(env, &group);
    Ok(())
}

/// open → locked → active in one step: positions are fixed, then round one
/// opens. The caller persists `group`.
fn lock(
    env: &Env,
    group: &mut SavingsGroup,
    actor: Option<Address>,
    reason: Option<String>,
) -> Result<(), ContractError> {
    set_state(env, group, GroupState::Locked, actor.clone(), reason.clone());
    storage::set_group(env, group);
    membership::assign_positions(env, group)?;

    group.total_rounds = group.member_count;
    set_state(env, group, GroupState::Active, actor, reason);
    payout::open_round(env, group, 1)?;
    Ok(())
}

pub fn freeze_group(
    env: &Env,
    admin: Address,
    group_id: u64,
    reason: String,
) -> Result<(), ContractError> {
    require_reason(&reason)?;
    let mut group = storage::get_group(env, group_id).ok_or(ContractError::GroupNotFound)?;
    admin::require_group_admin(env, &admin, &group)?;

    let resume_to = match group.state {
        GroupState::Open => StateTag::Open,
        GroupState::Active => StateTag::Active,
        GroupState::Frozen(_) => return Err(ContractError::AlreadyFrozen),
        GroupState::Completed | GroupState::Failed => return Err(ContractError::GroupClosed),
        GroupState::Locked => return Err(ContractError::GroupNotActive),
    };

    let record = FreezeRecord {
        reason: reason.clone(),
        since: env.ledger().timestamp(),
        actor: admin.clone(),
        resume_to,
    };
    set_state(env, &mut group, GroupState::Frozen(record), Some(admin), Some(reason));
    storage::set_group(env, &group);
    Ok(())
}

pub fn unfreeze_group(
    env: &Env,
    admin: Address,
    group_id: u64,
    reason: String,
) -> Result<(), ContractError> {
    require_reason(&reason)?;
    let mut group = storage::get_group(env, group_id).ok_or(ContractError::GroupNotFound)?;
    admin::require_group_admin(env, &admin, &group)?;

    let resumed = match &group.state {
        GroupState::Frozen(record) if record.resume_to == StateTag::Open => GroupState::Open,
        GroupState::Frozen(_) => GroupState::Active,
        _ => return Err(ContractError::NotFrozen),
    };

    set_state(env, &mut group, resumed, Some(admin), Some(reason));
    storage::set_group(env, &group);
    Ok(())
}

/// Move `group` to `next` and hand the transition to the audit sink. The
/// caller persists `group`.
pub fn set_state(
    env: &Env,
    group: &mut SavingsGroup,
    next: GroupState,
    actor: Option<Address>,
    reason: Option<String>,
) {
    let from = group.state.tag();
    let to = next.tag();
    group.state = next;

    log!(env, "group {} state {} -> {}", group.id, from as u32, to as u32);
    events::transition(env, group.id, actor, reason, from, to);
}

/// Guard for every money-moving operation.
pub fn require_active(group: &SavingsGroup) -> Result<(), ContractError> {
    match group.state {
        GroupState::Active => Ok(()),
        GroupState::Frozen(_) => Err(ContractError::GroupFrozen),
        GroupState::Completed | GroupState::Failed => Err(ContractError::GroupClosed),
        GroupState::Open | GroupState::Locked => Err(ContractError::GroupNotActive),
    }
}

pub fn get_group(env: &Env, group_id: u64) -> Result<SavingsGroup, ContractError> {
    storage::get_group(env, group_id).ok_or(ContractError::GroupNotFound)
}

pub fn get_group_by_code(env: &Env, join_code: String) -> Result<SavingsGroup, ContractError> {
    let group_id = storage::get_group_by_code(env, &join_code).ok_or(ContractError::GroupNotFound)?;
    get_group(env, group_id)
}

pub fn get_member_groups(env: &Env, member: Address) -> Vec<u64> {
    storage::get_member_groups(env, &member)
}
