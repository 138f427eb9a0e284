use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token::{StellarAssetClient, TokenClient},
    Address, Env, String, Vec,
};

use crate::types::{Frequency, GroupParams, PayoutOrderRule, SECONDS_PER_DAY, SECONDS_PER_HOUR};
use crate::{OsusuContract, OsusuContractClient};

mod chain_break;
mod contribution;

pub const CONTRIBUTION: i128 = 100;
pub const STARTING_FUNDS: i128 = 10_000;
pub const GRACE_HOURS: u32 = 24;
pub const LATE_FEE_PERCENTAGE: u32 = 10;
pub const PENALTY_DAYS: u32 = 7;
pub const START_TIME: u64 = 1_000;

pub struct TestEnv {
    pub env: Env,
    pub admin: Address,
    pub contract_id: Address,
    pub client: OsusuContractClient<'static>,
    pub token: Address,
}

impl TestEnv {
    pub fn mint(&self, to: &Address, amount: i128) {
        StellarAssetClient::new(&self.env, &self.token).mint(to, &amount);
    }

    pub fn balance(&self, of: &Address) -> i128 {
        TokenClient::new(&self.env, &self.token).balance(of)
    }

    pub fn set_time(&self, timestamp: u64) {
        self.env.ledger().set_timestamp(timestamp);
    }

    pub fn reason(&self, text: &str) -> String {
        String::from_str(&self.env, text)
    }

    pub fn code(&self, text: &str) -> String {
        String::from_str(&self.env, text)
    }
}

pub fn setup_env() -> TestEnv {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START_TIME);

    let admin = Address::generate(&env);
    let contract_id = env.register(OsusuContract, (&admin,));
    let client = OsusuContractClient::new(&env, &contract_id);

    let token_admin = Address::generate(&env);
    let token = env
        .register_stellar_asset_contract_v2(token_admin)
        .address();

    TestEnv {
        env,
        admin,
        contract_id,
        client,
        token,
    }
}

pub fn group_params(
    t: &TestEnv,
    join_code: &str,
    max_members: u32,
    rule: PayoutOrderRule,
) -> GroupParams {
    GroupParams {
        name: String::from_str(&t.env, "Market Women Osusu"),
        join_code: String::from_str(&t.env, join_code),
        token: t.token.clone(),
        contribution_amount: CONTRIBUTION,
        frequency: Frequency::Weekly,
        max_members,
        payout_order_rule: rule,
        late_fee_percentage: LATE_FEE_PERCENTAGE,
        grace_period_hours: GRACE_HOURS,
        chain_break_penalty_days: PENALTY_DAYS,
    }
}

pub fn create_group(t: &TestEnv, join_code: &str, max_members: u32) -> u64 {
    t.client.create_group(
        &t.admin,
        &group_params(t, join_code, max_members, PayoutOrderRule::Sequential),
    )
}

/// Generate, fund and enroll `count` members.
pub fn join_members(t: &TestEnv, join_code: &str, count: u32) -> Vec<Address> {
    let mut members = Vec::new(&t.env);
    for _ in 0..count {
        let member = Address::generate(&t.env);
        t.mint(&member, STARTING_FUNDS);
        t.client.join_group(&member, &t.code(join_code));
        members.push_back(member);
    }
    members
}

/// A full, sequential group that has just opened round one.
pub fn active_group(t: &TestEnv, size: u32) -> (u64, Vec<Address>) {
    let group_id = create_group(t, "OSUSU-1", size);
    let members = join_members(t, "OSUSU-1", size);
    (group_id, members)
}

pub fn contribute_all(t: &TestEnv, group_id: u64, round: u32, members: &Vec<Address>) {
    for member in members.iter() {
        t.client.contribute(&member, &group_id, &round, &CONTRIBUTION);
    }
}

/// Timestamp at which the grace window of a round ends.
pub fn grace_deadline(t: &TestEnv, group_id: u64, round: u32) -> u64 {
    let round = t.client.get_round(&group_id, &round);
    round.due_date + GRACE_HOURS as u64 * SECONDS_PER_HOUR
}

#[test]
fn test_weekly_round_due_date() {
    let t = setup_env();
    let (group_id, _) = active_group(&t, 3);
    let round = t.client.get_round(&group_id, &1);
    assert_eq!(round.opened_at, START_TIME);
    assert_eq!(round.due_date, START_TIME + 7 * SECONDS_PER_DAY);
}
