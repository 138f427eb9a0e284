use soroban_sdk::String;

use crate::errors::ContractError;
use crate::types::{GroupParams, ProtocolConfig};

pub const MIN_MEMBERS: u32 = 2;

/// Admin reasons end up in the audit trail, so blank ones are refused.
pub fn require_reason(reason: &String) -> Result<(), ContractError> {
    if reason.len() == 0 {
        return Err(ContractError::MissingReason);
    }
    Ok(())
}

pub fn require_positive(amount: i128) -> Result<(), ContractError> {
    if amount <= 0 {
        return Err(ContractError::InvalidAmount);
    }
    Ok(())
}

pub fn validate_group_params(
    params: &GroupParams,
    config: &ProtocolConfig,
) -> Result<(), ContractError> {
    require_positive(params.contribution_amount)?;

    if params.name.len() == 0 {
        return Err(ContractError::InvalidGroupParams);
    }
    if params.join_code.len() == 0 {
        return Err(ContractError::InvalidJoinCode);
    }
    if params.max_members < MIN_MEMBERS || params.max_members > config.max_group_size {
        return Err(ContractError::InvalidGroupParams);
    }
    if params.grace_period_hours > config.max_grace_period_hours {
        return Err(ContractError::InvalidGroupParams);
    }
    if params.late_fee_percentage > config.max_late_fee_percentage {
        return Err(ContractError::InvalidGroupParams);
    }
    if params.chain_break_penalty_days > config.max_penalty_days {
        return Err(ContractError::InvalidGroupParams);
    }

    // A full pot must stay representable.
    params
        .contribution_amount
        .checked_mul(params.max_members as i128)
        .ok_or(ContractError::InvalidGroupParams)?;

    Ok(())
}

pub fn validate_config(config: &ProtocolConfig) -> Result<(), ContractError> {
    if config.max_group_size < MIN_MEMBERS {
        return Err(ContractError::InvalidConfig);
    }
    if config.max_late_fee_percentage > 100 {
        return Err(ContractError::InvalidConfig);
    }
    Ok(())
}
