//! Ledger port: durable, single-writer-per-record storage of boards, tasks
//! and account balances.

use crate::bounty::domain::{
    Board, BoardAddress, Identity, Lamports, Task, TaskAddress, TaskStatus,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for ledger operations.
pub type BountyLedgerResult<T> = Result<T, BountyLedgerError>;

/// Ledger contract.
///
/// Every mutating operation is atomic: it either applies all of its record
/// and balance changes or none of them. Mutations against the same record
/// are serialized, so of two racing mutations built from the same snapshot
/// at most one commits.
#[async_trait]
pub trait BountyLedger: Send + Sync {
    /// Returns the spendable balance of `account`.
    ///
    /// Unknown accounts hold zero.
    async fn balance_of(&self, account: Identity) -> BountyLedgerResult<Lamports>;

    /// Credits `amount` to `account` and returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`BountyLedgerError::Overflow`] when the balance would
    /// overflow.
    async fn deposit(&self, account: Identity, amount: Lamports) -> BountyLedgerResult<Lamports>;

    /// Finds a board by address.
    async fn find_board(&self, address: BoardAddress) -> BountyLedgerResult<Option<Board>>;

    /// Finds a task by address.
    async fn find_task(&self, address: TaskAddress) -> BountyLedgerResult<Option<Task>>;

    /// Returns every task under `board`, ordered by index.
    async fn find_tasks_by_board(&self, board: BoardAddress) -> BountyLedgerResult<Vec<Task>>;

    /// Stores a new board and debits its reservation from the authority.
    ///
    /// # Errors
    ///
    /// Returns [`BountyLedgerError::DuplicateBoard`] when the address is
    /// occupied and [`BountyLedgerError::InsufficientFunds`] when the
    /// authority cannot cover the reservation.
    async fn insert_board(&self, board: &Board) -> BountyLedgerResult<()>;

    /// Stores a newly created task together with its advanced board.
    ///
    /// Debits the bounty and the task reservation from the creator.
    ///
    /// # Errors
    ///
    /// Returns [`BountyLedgerError::BoardNotFound`] when the board is
    /// missing, [`BountyLedgerError::TaskCounterConflict`] when the stored
    /// counter no longer equals the task's index,
    /// [`BountyLedgerError::DuplicateTask`] when the address is occupied and
    /// [`BountyLedgerError::InsufficientFunds`] when the creator cannot pay.
    async fn insert_task(&self, board: &Board, task: &Task) -> BountyLedgerResult<()>;

    /// Persists a transitioned task if its stored status is still
    /// `expected_status`.
    ///
    /// When the task carries an escrow release the stored record does not,
    /// the release recipient is credited in the same step.
    ///
    /// # Errors
    ///
    /// Returns [`BountyLedgerError::TaskNotFound`] when the task is missing
    /// and [`BountyLedgerError::StatusConflict`] when the stored status
    /// differs from `expected_status`.
    async fn update_task(&self, task: &Task, expected_status: TaskStatus) -> BountyLedgerResult<()>;
}

/// Errors returned by ledger implementations.
#[derive(Debug, Clone, Error)]
pub enum BountyLedgerError {
    /// A board already occupies the address.
    #[error("duplicate board: {0}")]
    DuplicateBoard(BoardAddress),

    /// A task already occupies the address.
    #[error("duplicate task: {0}")]
    DuplicateTask(TaskAddress),

    /// The board was not found.
    #[error("board not found: {0}")]
    BoardNotFound(BoardAddress),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskAddress),

    /// The board's counter moved since the task was built.
    #[error("board {board} task counter is {actual}, task was built for {expected}")]
    TaskCounterConflict {
        /// Board address.
        board: BoardAddress,
        /// Counter value the task was built against.
        expected: u64,
        /// Stored counter value.
        actual: u64,
    },

    /// The task's status moved since the transition was validated.
    #[error("task {task} is {actual}, transition expected {expected}")]
    StatusConflict {
        /// Task address.
        task: TaskAddress,
        /// Status the transition was validated against.
        expected: TaskStatus,
        /// Stored status.
        actual: TaskStatus,
    },

    /// The paying account cannot cover the debit.
    #[error("account {account} holds {available}, {required} required")]
    InsufficientFunds {
        /// Paying account.
        account: Identity,
        /// Amount to debit.
        required: Lamports,
        /// Stored balance.
        available: Lamports,
    },

    /// A balance would overflow.
    #[error("balance overflow on account {0}")]
    Overflow(Identity),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl BountyLedgerError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
