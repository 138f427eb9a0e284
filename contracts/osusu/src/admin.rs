use soroban_sdk::{log, symbol_short, Address, Env, String};

use crate::errors::ContractError;
use crate::events;
use crate::ledger;
use crate::storage;
use crate::types::{ProtocolConfig, SavingsGroup, Settlement};
use crate::validation::{require_reason, validate_config};
use crate::wallet::Wallet;

pub const DEFAULT_MAX_GROUP_SIZE: u32 = 50;
pub const DEFAULT_MAX_GRACE_PERIOD_HOURS: u32 = 168;
pub const DEFAULT_MAX_LATE_FEE_PERCENTAGE: u32 = 25;
pub const DEFAULT_MAX_PENALTY_DAYS: u32 = 90;

pub fn default_config(admin: Address) -> ProtocolConfig {
    ProtocolConfig {
        admin,
        max_group_size: DEFAULT_MAX_GROUP_SIZE,
        max_grace_period_hours: DEFAULT_MAX_GRACE_PERIOD_HOURS,
        max_late_fee_percentage: DEFAULT_MAX_LATE_FEE_PERCENTAGE,
        max_penalty_days: DEFAULT_MAX_PENALTY_DAYS,
    }
}

pub fn get_config(env: &Env) -> Result<ProtocolConfig, ContractError> {
    storage::get_config(env).ok_or(ContractError::NotInitialized)
}

pub fn update_config(
    env: &Env,
    admin: Address,
    config: ProtocolConfig,
) -> Result<(), ContractError> {
    admin.require_auth();

    let current = get_config(env)?;
    if admin != current.admin {
        return Err(ContractError::Unauthorized);
    }
    validate_config(&config)?;

    storage::set_config(env, &config);
    log!(env, "protocol config updated");
    Ok(())
}

/// The caller must sign and be either the group admin or the protocol admin.
pub fn require_group_admin(
    env: &Env,
    admin: &Address,
    group: &SavingsGroup,
) -> Result<(), ContractError> {
    admin.require_auth();

    if *admin != group.admin && *admin != get_config(env)?.admin {
        return Err(ContractError::Unauthorized);
    }
    Ok(())
}

pub fn set_group_admin(
    env: &Env,
    current_admin: Address,
    group_id: u64,
    new_admin: Address,
) -> Result<(), ContractError> {
    current_admin.require_auth();

    let mut group = storage::get_group(env, group_id).ok_or(ContractError::GroupNotFound)?;

    if current_admin != group.admin {
        return Err(ContractError::Unauthorized);
    }

    group.admin = new_admin.clone();
    storage::set_group(env, &group);

    events::audit(
        env,
        group_id,
        symbol_short!("adm_chng"),
        Some(current_admin),
        None,
    );

    Ok(())
}

/// Return escrowed funds to a member. While the group runs, the refund comes
/// out of the member's payment into the open round; once the group is
/// terminal it draws on leftover escrow. The refund entry is written first;
/// if the wallet rejects the transfer it is reversed.
pub fn refund_member(
    env: &Env,
    admin: Address,
    group_id: u64,
    member: Address,
    amount: i128,
    reason: String,
) -> Result<Settlement, ContractError> {
    require_reason(&reason)?;
    let group = storage::get_group(env, group_id).ok_or(ContractError::GroupNotFound)?;
    require_group_admin(env, &admin, &group)?;
    ledger::ensure_integrity(env, group_id)?;

    if group.state.is_frozen() {
        return Err(ContractError::GroupFrozen);
    }
    if storage::get_member(env, group_id, &member).is_none() {
        return Err(ContractError::MemberNotFound);
    }

    let round_number = if group.state.is_terminal() {
        0
    } else {
        group.current_round
    };
    let entry = ledger::record_refund(
        env,
        group_id,
        &member,
        amount,
        round_number,
        admin.clone(),
        reason.clone(),
    )?;

    events::audit(env, group_id, symbol_short!("refund"), Some(admin), Some(reason));

    if Wallet::new(env, &group.token).credit(&member, amount) {
        return Ok(Settlement::Settled(entry.id));
    }

    log!(env, "refund credit failed for group {}, reversing", group_id);
    let reversal = ledger::record_reversal(
        env,
        group_id,
        entry.id,
        String::from_str(env, "wallet credit failed"),
    )?;
    Ok(Settlement::Reversed(reversal.id))
}
