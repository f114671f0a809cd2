//! Service layer for board initialization and the task lifecycle.

use crate::bounty::{
    domain::{
        Board, BoardAddress, BountyDomainError, CompletionProof, Identity, Lamports, Task,
        TaskAddress, TaskDescription, TaskStatus, TaskTerms, TaskTitle, TaskTransition,
    },
    ports::{BountyLedger, BountyLedgerError},
};
use crate::config::BountyBoardConfig;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request payload for creating a funded task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    board: BoardAddress,
    title: String,
    description: String,
    bounty_amount: Lamports,
    expected_address: Option<TaskAddress>,
}

impl CreateTaskRequest {
    /// Creates a request for a task under `board`.
    #[must_use]
    pub fn new(
        board: BoardAddress,
        title: impl Into<String>,
        description: impl Into<String>,
        bounty_amount: impl Into<Lamports>,
    ) -> Self {
        Self {
            board,
            title: title.into(),
            description: description.into(),
            bounty_amount: bounty_amount.into(),
            expected_address: None,
        }
    }

    /// Pins the address the caller precomputed for the new task.
    ///
    /// Creation fails when the board's next task address differs.
    #[must_use]
    pub const fn with_expected_address(mut self, address: TaskAddress) -> Self {
        self.expected_address = Some(address);
        self
    }
}

/// Request payload for submitting completion proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitCompletionRequest {
    task: TaskAddress,
    proof: String,
}

impl SubmitCompletionRequest {
    /// Creates a request carrying `proof` for `task`.
    #[must_use]
    pub fn new(task: TaskAddress, proof: impl Into<String>) -> Self {
        Self {
            task,
            proof: proof.into(),
        }
    }
}

/// Selection applied when listing a board's tasks.
///
/// An empty filter selects every task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    status: Option<TaskStatus>,
    participant: Option<Identity>,
}

impl TaskFilter {
    /// Creates a filter that selects every task.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts the selection to tasks in `status`.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts the selection to tasks created or claimed by `identity`.
    #[must_use]
    pub const fn with_participant(mut self, identity: Identity) -> Self {
        self.participant = Some(identity);
        self
    }

    /// Returns whether `task` is selected.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        let status_matches = self.status.is_none_or(|status| task.status() == status);
        let participant_matches = self
            .participant
            .is_none_or(|identity| task.involves(identity));
        status_matches && participant_matches
    }
}

/// Service-level errors for bounty board operations.
#[derive(Debug, Error)]
pub enum BountyBoardError {
    /// The intent violates a board or task rule.
    #[error(transparent)]
    Domain(#[from] BountyDomainError),

    /// The ledger failed for a reason the domain does not model.
    #[error(transparent)]
    Ledger(BountyLedgerError),

    /// No board exists at the address.
    #[error("board not found: {0}")]
    BoardNotFound(BoardAddress),

    /// No task exists at the address.
    #[error("task not found: {0}")]
    TaskNotFound(TaskAddress),
}

impl BountyBoardError {
    /// Returns the domain error, if the failure is a rule violation.
    #[must_use]
    pub const fn as_domain(&self) -> Option<&BountyDomainError> {
        match self {
            Self::Domain(err) => Some(err),
            Self::Ledger(_) | Self::BoardNotFound(_) | Self::TaskNotFound(_) => None,
        }
    }
}

impl From<BountyLedgerError> for BountyBoardError {
    fn from(err: BountyLedgerError) -> Self {
        match err {
            BountyLedgerError::DuplicateBoard(address) => {
                Self::Domain(BountyDomainError::AlreadyInitialized(address))
            }
            BountyLedgerError::StatusConflict {
                task,
                expected,
                actual,
            } => Self::Domain(BountyDomainError::InvalidTaskStatus {
                task,
                expected,
                actual,
            }),
            BountyLedgerError::InsufficientFunds {
                account,
                required,
                available,
            } => Self::Domain(BountyDomainError::InsufficientFunds {
                account,
                required,
                available,
            }),
            BountyLedgerError::Overflow(_) => Self::Domain(BountyDomainError::Overflow),
            BountyLedgerError::BoardNotFound(address) => Self::BoardNotFound(address),
            BountyLedgerError::TaskNotFound(address) => Self::TaskNotFound(address),
            other @ (BountyLedgerError::DuplicateTask(_)
            | BountyLedgerError::TaskCounterConflict { .. }
            | BountyLedgerError::Persistence(_)) => Self::Ledger(other),
        }
    }
}

/// Result type for bounty board service operations.
pub type BountyBoardResult<T> = Result<T, BountyBoardError>;

/// Bounty board orchestration service.
///
/// Validates every intent against a ledger snapshot in the domain, then
/// commits the resulting records and fund movements through the ledger in
/// one atomic step.
pub struct BountyBoardService<L, C>
where
    L: BountyLedger,
    C: Clock + Send + Sync,
{
    ledger: Arc<L>,
    clock: Arc<C>,
    config: BountyBoardConfig,
}

impl<L, C> Clone for BountyBoardService<L, C>
where
    L: BountyLedger,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            clock: Arc::clone(&self.clock),
            config: self.config,
        }
    }
}

impl<L, C> BountyBoardService<L, C>
where
    L: BountyLedger,
    C: Clock + Send + Sync,
{
    /// Creates a service with the default reservation configuration.
    #[must_use]
    pub fn new(ledger: Arc<L>, clock: Arc<C>) -> Self {
        Self::with_config(ledger, clock, BountyBoardConfig::default())
    }

    /// Creates a service with an explicit configuration.
    #[must_use]
    pub const fn with_config(ledger: Arc<L>, clock: Arc<C>, config: BountyBoardConfig) -> Self {
        Self {
            ledger,
            clock,
            config,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &BountyBoardConfig {
        &self.config
    }

    /// Creates the board owned by `authority`.
    ///
    /// # Errors
    ///
    /// Returns [`BountyDomainError::AlreadyInitialized`] when the authority
    /// already owns a board, [`BountyDomainError::InsufficientFunds`] when
    /// the authority cannot pay the board reservation and
    /// [`BountyBoardError::Ledger`] when persistence fails.
    pub async fn initialize_board(&self, authority: Identity) -> BountyBoardResult<Board> {
        let intent = "initialize_board";
        let address = BoardAddress::derive(authority);
        if self.ledger.find_board(address).await?.is_some() {
            return Err(rejected(
                intent,
                authority,
                BountyDomainError::AlreadyInitialized(address).into(),
            ));
        }

        let board = Board::new(authority, self.config.board_reservation, &*self.clock);
        self.ensure_funds(intent, authority, board.reservation())
            .await?;
        self.ledger
            .insert_board(&board)
            .await
            .map_err(|err| commit_failed(intent, authority, err))?;

        info!(
            board = %board.address(),
            actor = %authority,
            amount = board.reservation().value(),
            "board initialized"
        );
        Ok(board)
    }

    /// Creates a funded task at the board's next index.
    ///
    /// # Errors
    ///
    /// Returns [`BountyBoardError::BoardNotFound`] for an unknown board,
    /// text and amount validation errors, [`BountyDomainError::Unauthorized`]
    /// when `actor` is not the board authority,
    /// [`BountyDomainError::TaskAddressMismatch`] when a pinned address is
    /// stale and [`BountyDomainError::InsufficientFunds`] when the creator
    /// cannot pay the bounty and reservation. Nothing is stored on failure.
    pub async fn create_task(
        &self,
        actor: Identity,
        request: CreateTaskRequest,
    ) -> BountyBoardResult<Task> {
        let intent = "create_task";
        let mut board = self.require_board(request.board).await?;

        let terms = TaskTerms {
            title: TaskTitle::new(request.title)
                .map_err(|err| rejected(intent, actor, err.into()))?,
            description: TaskDescription::new(request.description)
                .map_err(|err| rejected(intent, actor, err.into()))?,
            bounty_amount: request.bounty_amount,
            reservation: self.config.task_reservation,
        };

        if let Some(expected) = request.expected_address {
            let derived = board.next_task_address();
            if expected != derived {
                return Err(rejected(
                    intent,
                    actor,
                    BountyDomainError::TaskAddressMismatch { expected, derived }.into(),
                ));
            }
        }

        let task = Task::create(&mut board, actor, terms, &*self.clock)
            .map_err(|err| rejected(intent, actor, err.into()))?;
        let required = task
            .bounty_amount()
            .checked_add(task.reservation())
            .map_err(|err| rejected(intent, actor, err.into()))?;
        self.ensure_funds(intent, actor, required).await?;
        self.ledger
            .insert_task(&board, &task)
            .await
            .map_err(|err| commit_failed(intent, actor, err))?;

        info!(
            board = %board.address(),
            task = %task.address(),
            actor = %actor,
            amount = task.bounty_amount().value(),
            index = task.index(),
            "task created"
        );
        Ok(task)
    }

    /// Claims a created task for `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`BountyDomainError::Unauthorized`] when `actor` created the
    /// task and [`BountyDomainError::InvalidTaskStatus`] when it was already
    /// claimed.
    pub async fn claim_task(
        &self,
        actor: Identity,
        task_address: TaskAddress,
    ) -> BountyBoardResult<Task> {
        self.transition(TaskTransition::Claim, actor, task_address, |task, clock| {
            task.claim(actor, clock)
        })
        .await
    }

    /// Records completion proof from the claimer.
    ///
    /// # Errors
    ///
    /// Returns proof validation errors,
    /// [`BountyDomainError::Unauthorized`] when `actor` is not the claimer
    /// and [`BountyDomainError::InvalidTaskStatus`] unless the task is
    /// claimed.
    pub async fn submit_completion(
        &self,
        actor: Identity,
        request: SubmitCompletionRequest,
    ) -> BountyBoardResult<Task> {
        let transition = TaskTransition::SubmitCompletion;
        let proof = CompletionProof::new(request.proof)
            .map_err(|err| rejected(transition.as_str(), actor, err.into()))?;
        self.transition(transition, actor, request.task, |task, clock| {
            task.submit_completion(actor, proof, clock)
        })
        .await
    }

    /// Approves completed work and pays the escrow to the claimer.
    ///
    /// # Errors
    ///
    /// Returns [`BountyDomainError::Unauthorized`] when `actor` is not the
    /// creator and [`BountyDomainError::InvalidTaskStatus`] unless the task
    /// is completed.
    pub async fn approve_completion(
        &self,
        actor: Identity,
        task_address: TaskAddress,
    ) -> BountyBoardResult<Task> {
        self.transition(TaskTransition::Approve, actor, task_address, |task, clock| {
            task.approve(actor, clock).map(|_release| ())
        })
        .await
    }

    /// Rejects completed work and refunds the escrow to the creator.
    ///
    /// # Errors
    ///
    /// Returns [`BountyDomainError::Unauthorized`] when `actor` is not the
    /// creator and [`BountyDomainError::InvalidTaskStatus`] unless the task
    /// is completed.
    pub async fn reject_completion(
        &self,
        actor: Identity,
        task_address: TaskAddress,
    ) -> BountyBoardResult<Task> {
        self.transition(TaskTransition::Reject, actor, task_address, |task, clock| {
            task.reject(actor, clock).map(|_release| ())
        })
        .await
    }

    /// Retrieves the board owned by `authority`.
    ///
    /// # Errors
    ///
    /// Returns [`BountyBoardError::Ledger`] when the lookup fails.
    pub async fn find_board(&self, authority: Identity) -> BountyBoardResult<Option<Board>> {
        Ok(self
            .ledger
            .find_board(BoardAddress::derive(authority))
            .await?)
    }

    /// Retrieves the task at `index` under `board`.
    ///
    /// # Errors
    ///
    /// Returns [`BountyBoardError::Ledger`] when the lookup fails.
    pub async fn find_task(
        &self,
        board: BoardAddress,
        index: u64,
    ) -> BountyBoardResult<Option<Task>> {
        Ok(self
            .ledger
            .find_task(TaskAddress::derive(board, index))
            .await?)
    }

    /// Lists the tasks under `board` selected by `filter`, ordered by index.
    ///
    /// # Errors
    ///
    /// Returns [`BountyBoardError::Ledger`] when the lookup fails.
    pub async fn list_tasks(
        &self,
        board: BoardAddress,
        filter: TaskFilter,
    ) -> BountyBoardResult<Vec<Task>> {
        let tasks = self.ledger.find_tasks_by_board(board).await?;
        Ok(tasks.into_iter().filter(|task| filter.matches(task)).collect())
    }

    /// Returns the spendable balance of `account`.
    ///
    /// # Errors
    ///
    /// Returns [`BountyBoardError::Ledger`] when the lookup fails.
    pub async fn balance_of(&self, account: Identity) -> BountyBoardResult<Lamports> {
        Ok(self.ledger.balance_of(account).await?)
    }

    async fn require_board(&self, address: BoardAddress) -> BountyBoardResult<Board> {
        self.ledger
            .find_board(address)
            .await?
            .ok_or(BountyBoardError::BoardNotFound(address))
    }

    async fn require_task(&self, address: TaskAddress) -> BountyBoardResult<Task> {
        self.ledger
            .find_task(address)
            .await?
            .ok_or(BountyBoardError::TaskNotFound(address))
    }

    async fn ensure_funds(
        &self,
        intent: &'static str,
        account: Identity,
        required: Lamports,
    ) -> BountyBoardResult<()> {
        let available = self.ledger.balance_of(account).await?;
        if available < required {
            return Err(rejected(
                intent,
                account,
                BountyDomainError::InsufficientFunds {
                    account,
                    required,
                    available,
                }
                .into(),
            ));
        }
        Ok(())
    }

    /// Applies one lifecycle transition to a stored task and commits it
    /// against the status it was validated in.
    async fn transition<F>(
        &self,
        transition: TaskTransition,
        actor: Identity,
        task_address: TaskAddress,
        apply: F,
    ) -> BountyBoardResult<Task>
    where
        F: FnOnce(&mut Task, &C) -> Result<(), BountyDomainError> + Send,
    {
        let intent = transition.as_str();
        let mut task = self.require_task(task_address).await?;
        let expected_status = task.status();
        apply(&mut task, &*self.clock).map_err(|err| rejected(intent, actor, err.into()))?;
        self.ledger
            .update_task(&task, expected_status)
            .await
            .map_err(|err| commit_failed(intent, actor, err))?;

        let amount = task
            .escrow()
            .release()
            .map_or(0, |release| release.amount().value());
        info!(
            board = %task.board(),
            task = %task.address(),
            actor = %actor,
            amount,
            status = %task.status(),
            "{intent} committed"
        );
        Ok(task)
    }
}

fn rejected(intent: &'static str, actor: Identity, err: BountyBoardError) -> BountyBoardError {
    debug!(actor = %actor, error = %err, "{intent} rejected");
    err
}

fn commit_failed(intent: &'static str, actor: Identity, err: BountyLedgerError) -> BountyBoardError {
    warn!(actor = %actor, error = %err, "{intent} was not committed");
    BountyBoardError::from(err)
}
