use soroban_sdk::contracterror;

/// Every failure the engine reports. Codes are stable and grouped in ranges
/// by [`ErrorKind`] so clients can branch on the range as well as the code.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    // Setup (1-9)
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,

    // Validation (10-19)
    MissingReason = 10,
    InvalidAmount = 11,
    ExceedsContribution = 12,
    InvalidGroupParams = 13,
    InvalidJoinCode = 14,
    InvalidConfig = 15,

    // Conflict (20-39)
    GroupNotOpen = 20,
    GroupNotActive = 21,
    AlreadyFrozen = 22,
    NotFrozen = 23,
    GroupFull = 24,
    AlreadyMember = 25,
    MemberNotActive = 26,
    MemberAlreadyRemoved = 27,
    MemberAlreadyActive = 28,
    RoundClosed = 29,
    RoundNotCurrent = 30,
    NoEligibleRecipient = 31,
    InsufficientMembers = 32,
    DuplicateJoinCode = 33,
    GroupClosed = 34,

    // Insufficient funds (40-49)
    RoundNotFullyFunded = 40,
    NothingToPay = 41,
    InsufficientEscrow = 42,

    // Not found (50-59)
    GroupNotFound = 50,
    MemberNotFound = 51,
    RoundNotFound = 52,
    EntryNotFound = 53,

    // Frozen (60)
    GroupFrozen = 60,

    // Ledger integrity (70-79), fatal
    LedgerIntegrity = 70,
    ArithmeticOverflow = 71,
}

/// Taxonomy class of a [`ContractError`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Setup,
    Unauthorized,
    Validation,
    Conflict,
    InsufficientFunds,
    NotFound,
    Frozen,
    LedgerIntegrity,
}

impl ContractError {
    pub fn kind(&self) -> ErrorKind {
        match *self as u32 {
            3 => ErrorKind::Unauthorized,
            1..=9 => ErrorKind::Setup,
            10..=19 => ErrorKind::Validation,
            20..=39 => ErrorKind::Conflict,
            40..=49 => ErrorKind::InsufficientFunds,
            50..=59 => ErrorKind::NotFound,
            60..=69 => ErrorKind::Frozen,
            _ => ErrorKind::LedgerIntegrity,
        }
    }

    /// Integrity failures abort the invocation and are never retried.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::LedgerIntegrity
    }

    /// Stable human-readable message. Admin clients match on the
    /// "not fully funded" text to offer a forced payout.
    pub fn message(&self) -> &'static str {
        match self {
            ContractError::NotInitialized => "contract not initialized",
            ContractError::AlreadyInitialized => "contract already initialized",
            ContractError::Unauthorized => "caller is not authorized for this group",
            ContractError::MissingReason => "a non-empty reason is required",
            ContractError::InvalidAmount => "amount must be positive",
            ContractError::ExceedsContribution => {
                "amount exceeds the contribution due for this round"
            }
            ContractError::InvalidGroupParams => "group parameters are out of range",
            ContractError::InvalidJoinCode => "join code is empty or unknown",
            ContractError::InvalidConfig => "protocol configuration is out of range",
            ContractError::GroupNotOpen => "group is not accepting members",
            ContractError::GroupNotActive => "group is not active",
            ContractError::AlreadyFrozen => "group is already frozen",
            ContractError::NotFrozen => "group is not frozen",
            ContractError::GroupFull => "group is full",
            ContractError::AlreadyMember => "address is already a member",
            ContractError::MemberNotActive => "member is not active",
            ContractError::MemberAlreadyRemoved => "member is already removed",
            ContractError::MemberAlreadyActive => "member is already active",
            ContractError::RoundClosed => "round is already closed",
            ContractError::RoundNotCurrent => "round is not the current round",
            ContractError::NoEligibleRecipient => "no active member is eligible for payout",
            ContractError::InsufficientMembers => "not enough members to lock the group",
            ContractError::DuplicateJoinCode => "join code is already in use",
            ContractError::GroupClosed => "group has completed or failed",
            ContractError::RoundNotFullyFunded => "round is not fully funded",
            ContractError::NothingToPay => "round has no funds to pay out",
            ContractError::InsufficientEscrow => "escrow balance is insufficient",
            ContractError::GroupNotFound => "group not found",
            ContractError::MemberNotFound => "member not found",
            ContractError::RoundNotFound => "round not found",
            ContractError::EntryNotFound => "ledger entry not found",
            ContractError::GroupFrozen => "group is frozen",
            ContractError::LedgerIntegrity => "ledger integrity violation",
            ContractError::ArithmeticOverflow => "ledger arithmetic overflow",
        }
    }
}
