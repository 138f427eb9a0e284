use soroban_sdk::{testutils::Address as _, Address};

use super::*;
use crate::types::{EntryKind, GroupState, Settlement};
use crate::ContractError;

#[test]
fn test_contribute_records_entry_and_moves_funds() {
    let t = setup_env();
    let (group_id, members) = active_group(&t, 3);
    let member = members.get(0).unwrap();

    let outcome = t.client.contribute(&member, &group_id, &1, &CONTRIBUTION);
    let entry_id = match outcome {
        Settlement::Settled(id) => id,
        other => panic!("expected settled, got {:?}", other),
    };

    let entry = t.client.get_entry(&group_id, &entry_id);
    assert_eq!(entry.kind, EntryKind::Contribution);
    assert_eq!(entry.amount, CONTRIBUTION);
    assert_eq!(entry.member, Some(member.clone()));
    assert_eq!(entry.round_number, 1);

    assert_eq!(t.balance(&member), STARTING_FUNDS - CONTRIBUTION);
    assert_eq!(t.balance(&t.contract_id), CONTRIBUTION);
    assert_eq!(t.client.get_escrow_balance(&group_id), CONTRIBUTION);

    assert!(t.client.has_contributed(&member, &group_id, &1));
    assert!(!t.client.has_contributed(&members.get(1).unwrap(), &group_id, &1));
    assert_eq!(t.client.get_member(&group_id, &member).total_contributed, CONTRIBUTION);
    assert_eq!(t.client.get_round(&group_id, &1).funded_amount, CONTRIBUTION);
}

#[test]
fn test_partial_contributions_accumulate() {
    let t = setup_env();
    let (group_id, members) = active_group(&t, 3);
    let member = members.get(0).unwrap();

    t.set_time(START_TIME + 10);
    t.client.contribute(&member, &group_id, &1, &40);
    t.set_time(START_TIME + 20);
    t.client.contribute(&member, &group_id, &1, &60);

    let so_far = t
        .client
        .get_round_contribution(&member, &group_id, &1)
        .unwrap();
    assert_eq!(so_far.amount, CONTRIBUTION);
    // The first payment dates the contribution.
    assert_eq!(so_far.first_at, START_TIME + 10);

    assert_eq!(
        t.client.try_contribute(&member, &group_id, &1, &1),
        Err(Ok(ContractError::ExceedsContribution))
    );
}

#[test]
fn test_contribution_amount_checks() {
    let t = setup_env();
    let (group_id, members) = active_group(&t, 3);
    let member = members.get(0).unwrap();

    assert_eq!(
        t.client.try_contribute(&member, &group_id, &1, &0),
        Err(Ok(ContractError::InvalidAmount))
    );
    assert_eq!(
        t.client.try_contribute(&member, &group_id, &1, &-5),
        Err(Ok(ContractError::InvalidAmount))
    );
    assert_eq!(
        t.client
            .try_contribute(&member, &group_id, &1, &(CONTRIBUTION + 1)),
        Err(Ok(ContractError::ExceedsContribution))
    );
    assert_eq!(t.client.get_totals(&group_id).entry_count, 0);
}

#[test]
fn test_contribution_round_checks() {
    let t = setup_env();
    let (group_id, members) = active_group(&t, 2);
    let member = members.get(0).unwrap();

    assert_eq!(
        t.client.try_contribute(&member, &group_id, &2, &CONTRIBUTION),
        Err(Ok(ContractError::RoundNotFound))
    );

    contribute_all(&t, group_id, 1, &members);
    let keeper = Address::generate(&t.env);
    t.client.standard_payout(&keeper, &group_id, &1);

    assert_eq!(
        t.client.try_contribute(&member, &group_id, &1, &CONTRIBUTION),
        Err(Ok(ContractError::RoundClosed))
    );
    t.client.contribute(&member, &group_id, &2, &CONTRIBUTION);
}

#[test]
fn test_contribution_member_checks() {
    let t = setup_env();
    let (group_id, members) = active_group(&t, 3);

    let outsider = Address::generate(&t.env);
    t.mint(&outsider, STARTING_FUNDS);
    assert_eq!(
        t.client.try_contribute(&outsider, &group_id, &1, &CONTRIBUTION),
        Err(Ok(ContractError::MemberNotFound))
    );

    let removed = members.get(2).unwrap();
    t.client
        .remove_member(&t.admin, &group_id, &removed, &t.reason("left town"));
    assert_eq!(
        t.client.try_contribute(&removed, &group_id, &1, &CONTRIBUTION),
        Err(Ok(ContractError::MemberNotActive))
    );
}

#[test]
fn test_contribution_requires_active_group() {
    let t = setup_env();
    let group_id = create_group(&t, "OSUSU-1", 3);
    let members = join_members(&t, "OSUSU-1", 2);

    assert_eq!(t.client.get_group(&group_id).state, GroupState::Open);
    assert_eq!(
        t.client
            .try_contribute(&members.get(0).unwrap(), &group_id, &1, &CONTRIBUTION),
        Err(Ok(ContractError::GroupNotActive))
    );
    assert_eq!(
        t.client.try_contribute(&members.get(0).unwrap(), &99, &1, &CONTRIBUTION),
        Err(Ok(ContractError::GroupNotFound))
    );
}

#[test]
fn test_failed_debit_is_reversed() {
    let t = setup_env();
    let group_id = create_group(&t, "OSUSU-1", 3);
    join_members(&t, "OSUSU-1", 2);

    // Joins without any funds.
    let broke = Address::generate(&t.env);
    t.client.join_group(&broke, &t.code("OSUSU-1"));

    let outcome = t.client.contribute(&broke, &group_id, &1, &CONTRIBUTION);
    let reversal_id = match outcome {
        Settlement::Reversed(id) => id,
        other => panic!("expected reversed, got {:?}", other),
    };

    let reversal = t.client.get_entry(&group_id, &reversal_id);
    assert_eq!(reversal.kind, EntryKind::Reversal);
    assert_eq!(reversal.reverses, Some(1));
    assert_eq!(reversal.amount, CONTRIBUTION);

    // The original entry is still there.
    let original = t.client.get_entry(&group_id, &1);
    assert_eq!(original.kind, EntryKind::Contribution);

    let totals = t.client.get_totals(&group_id);
    assert_eq!(totals.contributions, 0);
    assert_eq!(totals.entry_count, 2);
    assert_eq!(t.client.get_escrow_balance(&group_id), 0);
    assert_eq!(t.client.audit_ledger(&group_id), totals);

    assert_eq!(t.client.get_round(&group_id, &1).funded_amount, 0);
    assert_eq!(t.client.get_member(&group_id, &broke).total_contributed, 0);
    assert!(!t.client.has_contributed(&broke, &group_id, &1));

    // Once funded, the same member can pay in full.
    t.mint(&broke, STARTING_FUNDS);
    assert_eq!(
        t.client.contribute(&broke, &group_id, &1, &CONTRIBUTION),
        Settlement::Settled(3)
    );
}

#[test]
fn test_funding_status_tracks_contributions() {
    let t = setup_env();
    let (group_id, members) = active_group(&t, 3);

    let status = t.client.check_round_funding(&group_id);
    assert_eq!(status.round_number, 1);
    assert_eq!(status.required_amount, 3 * CONTRIBUTION);
    assert!(!status.fully_funded);

    contribute_all(&t, group_id, 1, &members);
    let status = t.client.check_round_funding(&group_id);
    assert_eq!(status.funded_amount, 3 * CONTRIBUTION);
    assert!(status.fully_funded);
}
