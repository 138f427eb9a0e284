use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol};

use crate::types::{EntryKind, StateTag};

/// Record handed to the audit sink for every admin action and state
/// transition. Published on the `("audit", group_id)` topic. States are
/// carried as `StateTag` codes.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuditEvent {
    pub group_id: u64,
    pub action: Symbol,
    pub actor: Option<Address>,
    pub reason: Option<String>,
    pub from_state: Option<u32>,
    pub to_state: Option<u32>,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct LedgerEvent {
    pub group_id: u64,
    pub entry_id: u64,
    pub kind: EntryKind,
    pub member: Option<Address>,
    pub amount: i128,
    pub round_number: u32,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct RoundOpenedEvent {
    pub group_id: u64,
    pub round_number: u32,
    pub due_date: u64,
    pub required_amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ChainBreakEvent {
    pub group_id: u64,
    pub member: Address,
    pub round_number: u32,
    pub penalty_until: u64,
}

pub fn audit(
    env: &Env,
    group_id: u64,
    action: Symbol,
    actor: Option<Address>,
    reason: Option<String>,
) {
    publish_audit(env, group_id, action, actor, reason, None, None);
}

pub fn transition(
    env: &Env,
    group_id: u64,
    actor: Option<Address>,
    reason: Option<String>,
    from: StateTag,
    to: StateTag,
) {
    publish_audit(
        env,
        group_id,
        symbol_short!("state"),
        actor,
        reason,
        Some(from as u32),
        Some(to as u32),
    );
}

fn publish_audit(
    env: &Env,
    group_id: u64,
    action: Symbol,
    actor: Option<Address>,
    reason: Option<String>,
    from_state: Option<u32>,
    to_state: Option<u32>,
) {
    env.events().publish(
        (symbol_short!("audit"), group_id),
        AuditEvent {
            group_id,
            action,
            actor,
            reason,
            from_state,
            to_state,
            timestamp: env.ledger().timestamp(),
        },
    );
}

// --- Notifications (best effort) ---

pub fn ledger_entry(env: &Env, event: LedgerEvent) {
    env.events()
        .publish((symbol_short!("ledger"), event.group_id), event);
}

pub fn round_opened(env: &Env, event: RoundOpenedEvent) {
    env.events()
        .publish((symbol_short!("rnd_new"), event.group_id), event);
}

pub fn round_funded(env: &Env, group_id: u64, round_number: u32, funded: i128) {
    env.events()
        .publish((symbol_short!("rnd_fund"), group_id), (round_number, funded));
}

pub fn chain_broken(env: &Env, event: ChainBreakEvent) {
    env.events()
        .publish((symbol_short!("chain_brk"), event.group_id), event);
}

pub fn member_joined(env: &Env, group_id: u64, member: &Address) {
    env.events()
        .publish((symbol_short!("grp_join"), group_id), member.clone());
}

pub fn member_left(env: &Env, group_id: u64, member: &Address) {
    env.events()
        .publish((symbol_short!("grp_leav"), group_id), member.clone());
}
