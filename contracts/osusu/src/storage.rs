use soroban_sdk::{Address, Env, String, Vec};

use crate::types::{
    ChainBreak, DataKey, GroupTotals, LedgerEntry, Member, ProtocolConfig, Round,
    RoundContribution, SavingsGroup,
};

const INSTANCE_TTL_THRESHOLD: u32 = 100;
const INSTANCE_TTL_EXTEND: u32 = 500;
const PERSISTENT_TTL_THRESHOLD: u32 = 100;
const PERSISTENT_TTL_EXTEND: u32 = 1000;

// --- Config ---

pub fn get_config(env: &Env) -> Option<ProtocolConfig> {
    env.storage().instance().get(&DataKey::Config)
}

pub fn set_config(env: &Env, config: &ProtocolConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    extend_instance_ttl(env);
}

pub fn has_config(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

// --- Group Counter ---

pub fn get_group_counter(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::GroupCounter)
        .unwrap_or(0)
}

pub fn set_group_counter(env: &Env, counter: u64) {
    env.storage()
        .instance()
        .set(&DataKey::GroupCounter, &counter);
    extend_instance_ttl(env);
}

// --- Group ---

pub fn get_group(env: &Env, group_id: u64) -> Option<SavingsGroup> {
    read(env, &DataKey::Group(group_id))
}

pub fn set_group(env: &Env, group: &SavingsGroup) {
    write(env, &DataKey::Group(group.id), group);
}

pub fn get_group_by_code(env: &Env, join_code: &String) -> Option<u64> {
    read(env, &DataKey::JoinCode(join_code.clone()))
}

pub fn set_join_code(env: &Env, join_code: &String, group_id: u64) {
    write(env, &DataKey::JoinCode(join_code.clone()), &group_id);
}

// --- Roster & Members ---

/// Members in join order.
pub fn get_roster(env: &Env, group_id: u64) -> Vec<Address> {
    read(env, &DataKey::Roster(group_id)).unwrap_or(Vec::new(env))
}

pub fn set_roster(env: &Env, group_id: u64, roster: &Vec<Address>) {
    write(env, &DataKey::Roster(group_id), roster);
}

pub fn get_member(env: &Env, group_id: u64, member: &Address) -> Option<Member> {
    read(env, &DataKey::Member(group_id, member.clone()))
}

pub fn set_member(env: &Env, member: &Member) {
    write(
        env,
        &DataKey::Member(member.group_id, member.address.clone()),
        member,
    );
}

pub fn remove_member_record(env: &Env, group_id: u64, member: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::Member(group_id, member.clone()));
}

pub fn get_position_holder(env: &Env, group_id: u64, position: u32) -> Option<Address> {
    read(env, &DataKey::Position(group_id, position))
}

pub fn set_position_holder(env: &Env, group_id: u64, position: u32, member: &Address) {
    write(env, &DataKey::Position(group_id, position), member);
}

// --- Rounds ---

pub fn get_round(env: &Env, group_id: u64, round: u32) -> Option<Round> {
    read(env, &DataKey::Round(group_id, round))
}

pub fn set_round(env: &Env, round: &Round) {
    write(env, &DataKey::Round(round.group_id, round.round_number), round);
}

pub fn get_round_contribution(
    env: &Env,
    group_id: u64,
    round: u32,
    member: &Address,
) -> Option<RoundContribution> {
    read(env, &DataKey::RoundContribution(group_id, round, member.clone()))
}

pub fn set_round_contribution(
    env: &Env,
    group_id: u64,
    round: u32,
    member: &Address,
    contribution: &RoundContribution,
) {
    write(
        env,
        &DataKey::RoundContribution(group_id, round, member.clone()),
        contribution,
    );
}

// --- Chain breaks ---

pub fn get_chain_breaks(env: &Env, group_id: u64, member: &Address) -> Vec<ChainBreak> {
    read(env, &DataKey::ChainBreaks(group_id, member.clone())).unwrap_or(Vec::new(env))
}

pub fn add_chain_break(env: &Env, record: &ChainBreak) {
    let mut records = get_chain_breaks(env, record.group_id, &record.member);
    records.push_back(record.clone());
    write(
        env,
        &DataKey::ChainBreaks(record.group_id, record.member.clone()),
        &records,
    );
}

// --- Ledger ---

pub fn get_entry(env: &Env, group_id: u64, entry_id: u64) -> Option<LedgerEntry> {
    read(env, &DataKey::Entry(group_id, entry_id))
}

pub fn set_entry(env: &Env, entry: &LedgerEntry) {
    write(env, &DataKey::Entry(entry.group_id, entry.id), entry);
}

pub fn get_totals(env: &Env, group_id: u64) -> GroupTotals {
    read(env, &DataKey::Totals(group_id)).unwrap_or_default()
}

pub fn set_totals(env: &Env, group_id: u64, totals: &GroupTotals) {
    write(env, &DataKey::Totals(group_id), totals);
}

// --- Member Groups ---

pub fn get_member_groups(env: &Env, member: &Address) -> Vec<u64> {
    read(env, &DataKey::MemberGroups(member.clone())).unwrap_or(Vec::new(env))
}

pub fn add_member_group(env: &Env, member: &Address, group_id: u64) {
    let mut groups = get_member_groups(env, member);
    groups.push_back(group_id);
    write(env, &DataKey::MemberGroups(member.clone()), &groups);
}

pub fn remove_member_group(env: &Env, member: &Address, group_id: u64) {
    let groups = get_member_groups(env, member);
    let mut new_groups = Vec::new(env);
    for g in groups.iter() {
        if g != group_id {
            new_groups.push_back(g);
        }
    }
    write(env, &DataKey::MemberGroups(member.clone()), &new_groups);
}

// --- Persistent helpers ---

fn read<V>(env: &Env, key: &DataKey) -> Option<V>
where
    V: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
{
    let result = env.storage().persistent().get(key);
    if result.is_some() {
        extend_persistent_ttl(env, key);
    }
    result
}

fn write<V>(env: &Env, key: &DataKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(key, value);
    extend_persistent_ttl(env, key);
}

// --- TTL Management ---

fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}
