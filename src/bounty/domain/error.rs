//! Error types for bounty domain validation and parsing.

use super::{ActorRole, BoardAddress, Identity, Lamports, TaskAddress, TaskStatus};
use thiserror::Error;

/// Errors returned when an intent violates the board or task rules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BountyDomainError {
    /// A board already exists for the authority.
    #[error("board {0} is already initialized")]
    AlreadyInitialized(BoardAddress),

    /// The task title is empty.
    #[error("task title must not be empty")]
    TitleEmpty,

    /// The task title exceeds the configured limit.
    #[error("task title is {actual} characters, limit is {max}")]
    TitleTooLong {
        /// Maximum permitted characters.
        max: usize,
        /// Submitted characters.
        actual: usize,
    },

    /// The task description is empty.
    #[error("task description must not be empty")]
    DescriptionEmpty,

    /// The task description exceeds the configured limit.
    #[error("task description is {actual} characters, limit is {max}")]
    DescriptionTooLong {
        /// Maximum permitted characters.
        max: usize,
        /// Submitted characters.
        actual: usize,
    },

    /// The completion proof is empty.
    #[error("completion proof must not be empty")]
    ProofEmpty,

    /// The completion proof exceeds the configured limit.
    #[error("completion proof is {actual} characters, limit is {max}")]
    ProofTooLong {
        /// Maximum permitted characters.
        max: usize,
        /// Submitted characters.
        actual: usize,
    },

    /// The bounty amount is zero.
    #[error("bounty amount must be greater than 0")]
    InvalidBountyAmount,

    /// The paying account cannot cover the required amount.
    #[error("account {account} holds {available}, {required} required")]
    InsufficientFunds {
        /// Paying account.
        account: Identity,
        /// Amount the operation needs.
        required: Lamports,
        /// Amount currently spendable.
        available: Lamports,
    },

    /// The task is not in the status the transition requires.
    #[error("task {task} is {actual}, expected {expected}")]
    InvalidTaskStatus {
        /// Task address.
        task: TaskAddress,
        /// Status the transition requires.
        expected: TaskStatus,
        /// Status the task is in.
        actual: TaskStatus,
    },

    /// The invoking identity does not hold the role the intent requires.
    #[error("{actor} is not authorized, {required} required")]
    Unauthorized {
        /// Invoking identity.
        actor: Identity,
        /// Role the intent requires.
        required: ActorRole,
    },

    /// Checked arithmetic on a counter or balance overflowed.
    #[error("arithmetic overflow")]
    Overflow,

    /// The caller-precomputed task address differs from the derived one.
    #[error("expected task address {expected}, next task address is {derived}")]
    TaskAddressMismatch {
        /// Address supplied by the caller.
        expected: TaskAddress,
        /// Address derived from the board's current counter.
        derived: TaskAddress,
    },

    /// Escrow balance and released amount do not add up to the bounty.
    #[error("escrow of task {task} does not balance against its bounty {bounty}")]
    EscrowImbalance {
        /// Task address.
        task: TaskAddress,
        /// Original bounty amount.
        bounty: Lamports,
    },
}

impl BountyDomainError {
    /// Returns the stable error code surfaced to callers.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::AlreadyInitialized(_) => "AlreadyInitialized",
            Self::TitleEmpty => "TitleEmpty",
            Self::TitleTooLong { .. } => "TitleTooLong",
            Self::DescriptionEmpty => "DescriptionEmpty",
            Self::DescriptionTooLong { .. } => "DescriptionTooLong",
            Self::ProofEmpty => "ProofEmpty",
            Self::ProofTooLong { .. } => "ProofTooLong",
            Self::InvalidBountyAmount => "InvalidBountyAmount",
            Self::InsufficientFunds { .. } => "InsufficientFunds",
            Self::InvalidTaskStatus {
                expected: TaskStatus::Created,
                ..
            } => "TaskAlreadyClaimed",
            Self::InvalidTaskStatus { .. } => "InvalidTaskStatus",
            Self::Unauthorized { .. } => "Unauthorized",
            Self::Overflow => "Overflow",
            Self::TaskAddressMismatch { .. } => "TaskAddressMismatch",
            Self::EscrowImbalance { .. } => "EscrowImbalance",
        }
    }
}

/// Error returned while parsing identities and addresses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseIdentityError {
    /// The value is not valid hex.
    #[error("invalid hex key: {0}")]
    InvalidHex(String),

    /// The decoded key has the wrong length.
    #[error("invalid key length {0}, expected 32 bytes")]
    InvalidLength(usize),
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing escrow release kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown escrow release kind: {0}")]
pub struct ParseReleaseKindError(pub String);
