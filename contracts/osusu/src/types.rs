use soroban_sdk::{contracttype, Address, String};

pub const SECONDS_PER_HOUR: u64 = 3_600;
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Contribution cadence of a group.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Frequency {
    Daily = 0,
    Weekly = 1,
    Monthly = 2,
}

impl Frequency {
    /// Length of one round. Months are counted as 30 days.
    pub fn period_seconds(&self) -> u64 {
        match self {
            Frequency::Daily => SECONDS_PER_DAY,
            Frequency::Weekly => 7 * SECONDS_PER_DAY,
            Frequency::Monthly => 30 * SECONDS_PER_DAY,
        }
    }
}

/// How payout positions are handed out when the group locks.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PayoutOrderRule {
    Sequential = 0,       // Join order
    RandomizedAtLock = 1, // Shuffled once with the host PRNG
}

/// Flat tag for a [`GroupState`], used in audit records and for the state a
/// frozen group resumes to.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StateTag {
    Open = 0,
    Locked = 1,
    Active = 2,
    Frozen = 3,
    Completed = 4,
    Failed = 5,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FreezeRecord {
    pub reason: String,
    pub since: u64,
    pub actor: Address,
    pub resume_to: StateTag,
}

/// Lifecycle of a savings group. Frozen carries its own context so a group
/// can never be both frozen and terminal.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GroupState {
    Open,
    Locked,
    Active,
    Frozen(FreezeRecord),
    Completed,
    Failed,
}

impl GroupState {
    pub fn tag(&self) -> StateTag {
        match self {
            GroupState::Open => StateTag::Open,
            GroupState::Locked => StateTag::Locked,
            GroupState::Active => StateTag::Active,
            GroupState::Frozen(_) => StateTag::Frozen,
            GroupState::Completed => StateTag::Completed,
            GroupState::Failed => StateTag::Failed,
        }
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self, GroupState::Frozen(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, GroupState::Completed | GroupState::Failed)
    }
}

/// Creation parameters for a group.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupParams {
    pub name: String,
    pub join_code: String,
    pub token: Address,
    pub contribution_amount: i128,
    pub frequency: Frequency,
    pub max_members: u32,
    pub payout_order_rule: PayoutOrderRule,
    pub late_fee_percentage: u32,
    pub grace_period_hours: u32,
    pub chain_break_penalty_days: u32,
}

/// Core savings group configuration and state.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SavingsGroup {
    pub id: u64,
    pub name: String,
    pub join_code: String,
    pub admin: Address,
    pub token: Address,
    pub contribution_amount: i128,
    pub frequency: Frequency,
    pub max_members: u32,
    pub payout_order_rule: PayoutOrderRule,
    pub late_fee_percentage: u32,
    pub grace_period_hours: u32,
    pub chain_break_penalty_days: u32,
    pub state: GroupState,
    pub member_count: u32,
    pub current_round: u32,
    pub total_rounds: u32,
    pub created_at: u64,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MemberStatus {
    Active = 0,
    Removed = 1,
    ChainBroken = 2,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Member {
    pub address: Address,
    pub group_id: u64,
    /// 1-based slot in the rotation, 0 until the group locks.
    pub payout_position: u32,
    pub status: MemberStatus,
    pub total_contributed: i128,
    /// Missed contributions plus late fees. Informational, never collected.
    pub makeup_owed: i128,
    pub penalty_until: u64,
    pub received_payout: bool,
    pub joined_at: u64,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoundStatus {
    Open = 0,
    PartiallyFundedClosed = 1,
    FullyFundedClosed = 2,
    ClosedUnpaid = 3, // No eligible recipient; funds stayed in escrow
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Round {
    pub group_id: u64,
    pub round_number: u32,
    pub opened_at: u64,
    pub due_date: u64,
    pub required_amount: i128,
    pub funded_amount: i128,
    pub status: RoundStatus,
    pub recipient: Option<Address>,
    pub paid_amount: i128,
    pub chain_checked: bool,
}

impl Round {
    pub fn is_open(&self) -> bool {
        self.status == RoundStatus::Open
    }
}

/// What a member has put into one round.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundContribution {
    pub amount: i128,
    pub first_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChainBreak {
    pub group_id: u64,
    pub member: Address,
    pub round_number: u32,
    pub detected_at: u64,
    pub reason: String,
    pub penalty_until: u64,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryKind {
    Contribution = 0,
    Payout = 1,
    Penalty = 2,
    Refund = 3,
    Reversal = 4,
}

/// Append-only monetary event. Never mutated; a failed settlement is undone
/// by a later `Reversal` entry pointing back through `reverses`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerEntry {
    pub id: u64,
    pub group_id: u64,
    pub member: Option<Address>,
    pub kind: EntryKind,
    pub amount: i128,
    pub round_number: u32,
    pub timestamp: u64,
    pub actor: Option<Address>,
    pub reason: Option<String>,
    pub reverses: Option<u64>,
}

/// Materialized per-group counters, all net of reversals.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GroupTotals {
    pub contributions: i128,
    pub payouts: i128,
    pub refunds: i128,
    pub penalties: i128,
    pub entry_count: u64,
}

/// Funding snapshot of the current round.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundingStatus {
    pub round_number: u32,
    pub required_amount: i128,
    pub funded_amount: i128,
    pub fully_funded: bool,
}

/// Outcome of an operation that moves money through the wallet.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Settlement {
    /// Ledger entry id; wallet transfer went through.
    Settled(u64),
    /// Reversal entry id; wallet transfer failed and the entry was undone.
    Reversed(u64),
    /// Round number; nobody was eligible, so the round closed unpaid and its
    /// funds stay in escrow for refunds.
    Held(u32),
}

/// Protocol-wide policy limits.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProtocolConfig {
    pub admin: Address,
    pub max_group_size: u32,
    pub max_grace_period_hours: u32,
    pub max_late_fee_percentage: u32,
    pub max_penalty_days: u32,
}

/// Storage keys for all contract data.
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Config,
    GroupCounter,
    Group(u64),
    JoinCode(String),
    Roster(u64),
    Member(u64, Address),
    Position(u64, u32),
    Round(u64, u32),
    RoundContribution(u64, u32, Address),
    ChainBreaks(u64, Address),
    Entry(u64, u64),
    Totals(u64),
    MemberGroups(Address),
}
