//! In-memory ledger for tests and single-process embedding.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::bounty::{
    domain::{Board, BoardAddress, Identity, Lamports, Task, TaskAddress, TaskStatus},
    ports::{BountyLedger, BountyLedgerError, BountyLedgerResult},
};

/// Thread-safe in-memory ledger.
///
/// All records sit behind one lock, so every mutation is applied under a
/// single write guard.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBountyLedger {
    state: Arc<RwLock<InMemoryLedgerState>>,
}

#[derive(Debug, Default)]
struct InMemoryLedgerState {
    balances: HashMap<Identity, Lamports>,
    boards: HashMap<BoardAddress, Board>,
    tasks: HashMap<TaskAddress, Task>,
    board_index: HashMap<BoardAddress, BTreeMap<u64, TaskAddress>>,
}

impl InMemoryBountyLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl InMemoryLedgerState {
    fn balance(&self, account: Identity) -> Lamports {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    /// Computes the balance after a debit without applying it.
    fn debited(&self, account: Identity, amount: Lamports) -> BountyLedgerResult<Lamports> {
        let available = self.balance(account);
        available
            .checked_sub(amount)
            .map_err(|_| BountyLedgerError::InsufficientFunds {
                account,
                required: amount,
                available,
            })
    }

    /// Computes the balance after a credit without applying it.
    fn credited(&self, account: Identity, amount: Lamports) -> BountyLedgerResult<Lamports> {
        self.balance(account)
            .checked_add(amount)
            .map_err(|_| BountyLedgerError::Overflow(account))
    }
}

fn lock_error(err: impl std::fmt::Display) -> BountyLedgerError {
    BountyLedgerError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl BountyLedger for InMemoryBountyLedger {
    async fn balance_of(&self, account: Identity) -> BountyLedgerResult<Lamports> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.balance(account))
    }

    async fn deposit(&self, account: Identity, amount: Lamports) -> BountyLedgerResult<Lamports> {
        let mut state = self.state.write().map_err(lock_error)?;
        let balance = state.credited(account, amount)?;
        state.balances.insert(account, balance);
        Ok(balance)
    }

    async fn find_board(&self, address: BoardAddress) -> BountyLedgerResult<Option<Board>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.boards.get(&address).cloned())
    }

    async fn find_task(&self, address: TaskAddress) -> BountyLedgerResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.tasks.get(&address).cloned())
    }

    async fn find_tasks_by_board(&self, board: BoardAddress) -> BountyLedgerResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        let tasks = state
            .board_index
            .get(&board)
            .map(|index| {
                index
                    .values()
                    .filter_map(|address| state.tasks.get(address).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(tasks)
    }

    async fn insert_board(&self, board: &Board) -> BountyLedgerResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.boards.contains_key(&board.address()) {
            return Err(BountyLedgerError::DuplicateBoard(board.address()));
        }
        let balance = state.debited(board.authority(), board.reservation())?;

        state.balances.insert(board.authority(), balance);
        state.boards.insert(board.address(), board.clone());
        Ok(())
    }

    async fn insert_task(&self, board: &Board, task: &Task) -> BountyLedgerResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored_count = state
            .boards
            .get(&board.address())
            .ok_or(BountyLedgerError::BoardNotFound(board.address()))?
            .task_count();
        if stored_count != task.index() {
            return Err(BountyLedgerError::TaskCounterConflict {
                board: board.address(),
                expected: task.index(),
                actual: stored_count,
            });
        }
        if state.tasks.contains_key(&task.address()) {
            return Err(BountyLedgerError::DuplicateTask(task.address()));
        }

        let required = task
            .bounty_amount()
            .checked_add(task.reservation())
            .map_err(|_| BountyLedgerError::Overflow(task.creator()))?;
        let balance = state.debited(task.creator(), required)?;

        state.balances.insert(task.creator(), balance);
        state.boards.insert(board.address(), board.clone());
        state.tasks.insert(task.address(), task.clone());
        state
            .board_index
            .entry(board.address())
            .or_default()
            .insert(task.index(), task.address());
        Ok(())
    }

    async fn update_task(&self, task: &Task, expected_status: TaskStatus) -> BountyLedgerResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .tasks
            .get(&task.address())
            .ok_or(BountyLedgerError::TaskNotFound(task.address()))?;
        if stored.status() != expected_status {
            return Err(BountyLedgerError::StatusConflict {
                task: task.address(),
                expected: expected_status,
                actual: stored.status(),
            });
        }

        let payout = match (stored.escrow().release(), task.escrow().release()) {
            (None, Some(release)) => {
                let balance = state.credited(release.recipient(), release.amount())?;
                Some((release.recipient(), balance))
            }
            _ => None,
        };

        if let Some((recipient, balance)) = payout {
            state.balances.insert(recipient, balance);
        }
        state.tasks.insert(task.address(), task.clone());
        Ok(())
    }
}
