use soroban_sdk::{testutils::Address as _, Address};

use super::*;
use crate::types::{GroupState, MemberStatus, Settlement};
use crate::ContractError;

#[test]
fn test_tick_inside_grace_window_flags_nobody() {
    let t = setup_env();
    let (group_id, _) = active_group(&t, 3);
    let deadline = grace_deadline(&t, group_id, 1);

    t.set_time(deadline);
    assert_eq!(t.client.process_chain_breaks(&group_id), 0);
    assert!(!t.client.get_round(&group_id, &1).chain_checked);
}

#[test]
fn test_grace_boundary() {
    let t = setup_env();
    let (group_id, members) = active_group(&t, 5);
    let deadline = grace_deadline(&t, group_id, 1);
    let late = members.get(1).unwrap();

    t.set_time(deadline - 1);
    for member in members.iter() {
        if member != late {
            t.client.contribute(&member, &group_id, &1, &CONTRIBUTION);
        }
    }

    t.set_time(deadline + 1);
    t.client.contribute(&late, &group_id, &1, &CONTRIBUTION);
    assert_eq!(t.client.process_chain_breaks(&group_id), 1);

    let record = t.client.get_member(&group_id, &late);
    assert_eq!(record.status, MemberStatus::ChainBroken);
    assert_eq!(
        record.penalty_until,
        deadline + 1 + PENALTY_DAYS as u64 * SECONDS_PER_DAY
    );
    // Paid in full, so only the late fee is owed.
    assert_eq!(record.makeup_owed, CONTRIBUTION * LATE_FEE_PERCENTAGE as i128 / 100);

    for member in members.iter() {
        if member != late {
            assert_eq!(
                t.client.get_member(&group_id, &member).status,
                MemberStatus::Active
            );
        }
    }

    let breaks = t.client.get_chain_breaks(&group_id, &late);
    assert_eq!(breaks.len(), 1);
    let brk = breaks.get(0).unwrap();
    assert_eq!(brk.round_number, 1);
    assert_eq!(brk.detected_at, deadline + 1);

    let totals = t.client.get_totals(&group_id);
    assert_eq!(totals.penalties, 10);
    // Penalties are obligations, not escrow.
    assert_eq!(t.client.get_escrow_balance(&group_id), 5 * CONTRIBUTION);
    assert_eq!(t.client.get_group(&group_id).state, GroupState::Active);

    // Each round is scanned once.
    t.set_time(deadline + 100);
    assert_eq!(t.client.process_chain_breaks(&group_id), 0);
    assert_eq!(t.client.get_chain_breaks(&group_id, &late).len(), 1);
}

#[test]
fn test_missed_contribution_owes_share_and_fee() {
    let t = setup_env();
    let (group_id, members) = active_group(&t, 5);
    let deadline = grace_deadline(&t, group_id, 1);
    let missing = members.get(4).unwrap();

    for member in members.iter().take(4) {
        t.client.contribute(&member, &group_id, &1, &CONTRIBUTION);
    }

    t.set_time(deadline + 1);
    assert_eq!(t.client.process_chain_breaks(&group_id), 1);

    let record = t.client.get_member(&group_id, &missing);
    assert_eq!(record.makeup_owed, CONTRIBUTION + 10);
    assert_eq!(
        t.client.try_contribute(&missing, &group_id, &1, &CONTRIBUTION),
        Err(Ok(ContractError::MemberNotActive))
    );
}

#[test]
fn test_broken_member_skipped_in_later_rounds() {
    let t = setup_env();
    let (group_id, members) = active_group(&t, 5);
    let deadline = grace_deadline(&t, group_id, 1);
    let late = members.get(1).unwrap();

    for member in members.iter() {
        if member != late {
            t.client.contribute(&member, &group_id, &1, &CONTRIBUTION);
        }
    }
    t.set_time(deadline + 1);
    t.client.contribute(&late, &group_id, &1, &CONTRIBUTION);
    assert_eq!(t.client.process_chain_breaks(&group_id), 1);

    let keeper = Address::generate(&t.env);
    t.client.standard_payout(&keeper, &group_id, &1);

    // The broken member no longer counts towards the requirement.
    let round = t.client.get_round(&group_id, &2);
    assert_eq!(round.required_amount, 4 * CONTRIBUTION);

    // Position 2 belongs to the broken member; position 3 takes the slot.
    assert_eq!(
        t.client.get_current_recipient(&group_id),
        members.get(2).unwrap()
    );

    for member in members.iter() {
        if member != late {
            t.client.contribute(&member, &group_id, &2, &CONTRIBUTION);
        }
    }
    t.client.standard_payout(&keeper, &group_id, &2);
    assert_eq!(
        t.client.get_round(&group_id, &2).recipient,
        Some(members.get(2).unwrap())
    );
}

#[test]
fn test_reinstated_member_keeps_history() {
    let t = setup_env();
    let (group_id, members) = active_group(&t, 3);
    let deadline = grace_deadline(&t, group_id, 1);
    let missing = members.get(2).unwrap();

    t.client
        .contribute(&members.get(0).unwrap(), &group_id, &1, &CONTRIBUTION);
    t.client
        .contribute(&members.get(1).unwrap(), &group_id, &1, &CONTRIBUTION);
    t.set_time(deadline + 1);
    t.client.process_chain_breaks(&group_id);

    t.client.reinstate_member(&t.admin, &group_id, &missing);

    let record = t.client.get_member(&group_id, &missing);
    assert_eq!(record.status, MemberStatus::Active);
    assert_eq!(record.makeup_owed, CONTRIBUTION + 10);
    assert_eq!(t.client.get_chain_breaks(&group_id, &missing).len(), 1);

    // Back in good standing, the member can still pay the open round.
    t.client.contribute(&missing, &group_id, &1, &CONTRIBUTION);
    assert!(t.client.check_round_funding(&group_id).fully_funded);
}

#[test]
fn test_half_broken_group_survives() {
    let t = setup_env();
    let (group_id, members) = active_group(&t, 4);
    let deadline = grace_deadline(&t, group_id, 1);

    t.client
        .contribute(&members.get(0).unwrap(), &group_id, &1, &CONTRIBUTION);
    t.client
        .contribute(&members.get(1).unwrap(), &group_id, &1, &CONTRIBUTION);

    t.set_time(deadline + 1);
    assert_eq!(t.client.process_chain_breaks(&group_id), 2);
    assert_eq!(t.client.get_group(&group_id).state, GroupState::Active);
}

#[test]
fn test_majority_broken_fails_group() {
    let t = setup_env();
    let (group_id, members) = active_group(&t, 4);
    let deadline = grace_deadline(&t, group_id, 1);
    let payer = members.get(0).unwrap();

    t.client.contribute(&payer, &group_id, &1, &CONTRIBUTION);

    t.set_time(deadline + 1);
    assert_eq!(t.client.process_chain_breaks(&group_id), 3);
    assert_eq!(t.client.get_group(&group_id).state, GroupState::Failed);
    assert_eq!(t.client.get_totals(&group_id).penalties, 30);

    let keeper = Address::generate(&t.env);
    assert_eq!(
        t.client.try_standard_payout(&keeper, &group_id, &1),
        Err(Ok(ContractError::GroupClosed))
    );

    // Escrow is returned by refund.
    assert_eq!(
        t.client.try_refund_member(
            &t.admin,
            &group_id,
            &payer,
            &(CONTRIBUTION + 1),
            &t.reason("group failed")
        ),
        Err(Ok(ContractError::InsufficientEscrow))
    );
    let outcome = t.client.refund_member(
        &t.admin,
        &group_id,
        &payer,
        &CONTRIBUTION,
        &t.reason("group failed"),
    );
    assert!(matches!(outcome, Settlement::Settled(_)));
    assert_eq!(t.balance(&payer), STARTING_FUNDS);
    assert_eq!(t.client.get_escrow_balance(&group_id), 0);
    assert_eq!(t.client.audit_ledger(&group_id).refunds, CONTRIBUTION);
}

#[test]
fn test_tick_requires_active_group() {
    let t = setup_env();
    let group_id = create_group(&t, "OSUSU-1", 3);
    assert_eq!(
        t.client.try_process_chain_breaks(&group_id),
        Err(Ok(ContractError::GroupNotActive))
    );
    assert_eq!(
        t.client.try_process_chain_breaks(&42),
        Err(Ok(ContractError::GroupNotFound))
    );
}
