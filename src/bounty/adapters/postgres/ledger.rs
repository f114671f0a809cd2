//! `PostgreSQL` ledger implementation.
//!
//! Every mutation runs in one database transaction. Rows touched by a
//! mutation are locked with `SELECT ... FOR UPDATE` before they are checked,
//! which gives the single-writer-per-record behaviour the ledger port
//! requires.

use super::{
    PostgresLedgerConfig,
    models::{AccountRow, BoardCounterChangeset, BoardRow, TaskRow, TaskTransitionChangeset},
    schema::{boards, ledger_accounts, tasks},
};
use crate::bounty::{
    domain::{
        Board, BoardAddress, CompletionProof, Escrow, EscrowRelease, Identity, Lamports,
        PersistedBoardData, PersistedTaskData, ReleaseKind, Task, TaskAddress, TaskDescription,
        TaskStatus, TaskTitle,
    },
    ports::{BountyLedger, BountyLedgerError, BountyLedgerResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by the ledger.
pub type LedgerPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed ledger.
#[derive(Debug, Clone)]
pub struct PostgresBountyLedger {
    pool: LedgerPgPool,
}

/// Failure inside a ledger transaction.
#[derive(Debug)]
enum TxError {
    Ledger(BountyLedgerError),
    Database(DieselError),
}

impl From<DieselError> for TxError {
    fn from(err: DieselError) -> Self {
        Self::Database(err)
    }
}

impl From<BountyLedgerError> for TxError {
    fn from(err: BountyLedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl From<TxError> for BountyLedgerError {
    fn from(err: TxError) -> Self {
        match err {
            TxError::Ledger(ledger_err) => ledger_err,
            TxError::Database(db_err) => Self::persistence(db_err),
        }
    }
}

type TxResult<T> = Result<T, TxError>;

impl PostgresBountyLedger {
    /// Creates a ledger from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: LedgerPgPool) -> Self {
        Self { pool }
    }

    /// Builds a connection pool from `config` and wraps it in a ledger.
    ///
    /// # Errors
    ///
    /// Returns [`BountyLedgerError::Persistence`] when the pool cannot be
    /// built.
    pub fn connect(config: &PostgresLedgerConfig) -> BountyLedgerResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(config.database_url.clone());
        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .build(manager)
            .map_err(BountyLedgerError::persistence)?;
        Ok(Self::new(pool))
    }

    async fn run_blocking<F, T>(&self, f: F) -> BountyLedgerResult<T>
    where
        F: FnOnce(&mut PgConnection) -> BountyLedgerResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(BountyLedgerError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(BountyLedgerError::persistence)?
    }

    async fn run_transaction<F, T>(&self, f: F) -> BountyLedgerResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TxResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run_blocking(move |connection| {
            connection
                .transaction::<T, TxError, _>(f)
                .map_err(BountyLedgerError::from)
        })
        .await
    }
}

#[async_trait]
impl BountyLedger for PostgresBountyLedger {
    async fn balance_of(&self, account: Identity) -> BountyLedgerResult<Lamports> {
        self.run_blocking(move |connection| {
            let owner = account.to_bytes();
            let balance = ledger_accounts::table
                .filter(ledger_accounts::owner.eq(owner.as_slice()))
                .select(ledger_accounts::balance)
                .first::<i64>(connection)
                .optional()
                .map_err(BountyLedgerError::persistence)?;
            balance.map_or(Ok(Lamports::ZERO), to_lamports)
        })
        .await
    }

    async fn deposit(&self, account: Identity, amount: Lamports) -> BountyLedgerResult<Lamports> {
        self.run_transaction(move |connection| {
            let current = lock_balance(connection, account)?;
            let next = current
                .checked_add(amount)
                .map_err(|_| BountyLedgerError::Overflow(account))?;
            store_balance(connection, account, next)?;
            Ok(next)
        })
        .await
    }

    async fn find_board(&self, address: BoardAddress) -> BountyLedgerResult<Option<Board>> {
        self.run_blocking(move |connection| {
            let key = address.to_bytes();
            let row = boards::table
                .filter(boards::address.eq(key.as_slice()))
                .select(BoardRow::as_select())
                .first::<BoardRow>(connection)
                .optional()
                .map_err(BountyLedgerError::persistence)?;
            row.as_ref().map(row_to_board).transpose()
        })
        .await
    }

    async fn find_task(&self, address: TaskAddress) -> BountyLedgerResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let key = address.to_bytes();
            let row = tasks::table
                .filter(tasks::address.eq(key.as_slice()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(BountyLedgerError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_tasks_by_board(&self, board: BoardAddress) -> BountyLedgerResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let key = board.to_bytes();
            let rows = tasks::table
                .filter(tasks::board.eq(key.as_slice()))
                .order(tasks::task_index.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(BountyLedgerError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn insert_board(&self, board: &Board) -> BountyLedgerResult<()> {
        let address = board.address();
        let authority = board.authority();
        let reservation = board.reservation();
        let new_row = to_board_row(board)?;

        self.run_transaction(move |connection| {
            if lock_board(connection, address)?.is_some() {
                return Err(BountyLedgerError::DuplicateBoard(address).into());
            }
            let available = lock_balance(connection, authority)?;
            let remaining = debit(authority, available, reservation)?;
            store_balance(connection, authority, remaining)?;

            diesel::insert_into(boards::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TxError::Ledger(BountyLedgerError::DuplicateBoard(address))
                    }
                    other => TxError::Database(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn insert_task(&self, board: &Board, task: &Task) -> BountyLedgerResult<()> {
        let board_address = board.address();
        let task_address = task.address();
        let task_index = task.index();
        let creator = task.creator();
        let required = task
            .bounty_amount()
            .checked_add(task.reservation())
            .map_err(|_| BountyLedgerError::Overflow(creator))?;
        let counters = BoardCounterChangeset {
            task_count: to_column(board.task_count(), creator)?,
            total_bounties: to_column(board.total_bounties().value(), creator)?,
            updated_at: board.updated_at(),
        };
        let new_row = to_task_row(task)?;

        self.run_transaction(move |connection| {
            let stored_board = lock_board(connection, board_address)?
                .ok_or(BountyLedgerError::BoardNotFound(board_address))?;
            let stored_count = to_u64(stored_board.task_count)?;
            if stored_count != task_index {
                return Err(BountyLedgerError::TaskCounterConflict {
                    board: board_address,
                    expected: task_index,
                    actual: stored_count,
                }
                .into());
            }
            if lock_task(connection, task_address)?.is_some() {
                return Err(BountyLedgerError::DuplicateTask(task_address).into());
            }

            let available = lock_balance(connection, creator)?;
            let remaining = debit(creator, available, required)?;
            store_balance(connection, creator, remaining)?;

            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)?;
            let board_key = board_address.to_bytes();
            diesel::update(boards::table.filter(boards::address.eq(board_key.as_slice())))
                .set(&counters)
                .execute(connection)?;
            Ok(())
        })
        .await
    }

    async fn update_task(&self, task: &Task, expected_status: TaskStatus) -> BountyLedgerResult<()> {
        let task_address = task.address();
        let release = task.escrow().release().copied();
        let changes = to_transition_changeset(task)?;

        self.run_transaction(move |connection| {
            let stored = lock_task(connection, task_address)?
                .ok_or(BountyLedgerError::TaskNotFound(task_address))?;
            let stored_status = parse_status(&stored.status)?;
            if stored_status != expected_status {
                return Err(BountyLedgerError::StatusConflict {
                    task: task_address,
                    expected: expected_status,
                    actual: stored_status,
                }
                .into());
            }

            if let Some(payout) = release
                && stored.release_recipient.is_none()
            {
                let recipient = payout.recipient();
                let current = lock_balance(connection, recipient)?;
                let next = current
                    .checked_add(payout.amount())
                    .map_err(|_| BountyLedgerError::Overflow(recipient))?;
                store_balance(connection, recipient, next)?;
            }

            let key = task_address.to_bytes();
            diesel::update(tasks::table.filter(tasks::address.eq(key.as_slice())))
                .set(&changes)
                .execute(connection)?;
            Ok(())
        })
        .await
    }
}

/// Ensures an account row exists, locks it and returns its balance.
fn lock_balance(connection: &mut PgConnection, account: Identity) -> TxResult<Lamports> {
    let owner = account.to_bytes();
    diesel::insert_into(ledger_accounts::table)
        .values(&AccountRow {
            owner: owner.to_vec(),
            balance: 0,
        })
        .on_conflict_do_nothing()
        .execute(connection)?;
    let balance = ledger_accounts::table
        .filter(ledger_accounts::owner.eq(owner.as_slice()))
        .select(ledger_accounts::balance)
        .for_update()
        .get_result::<i64>(connection)?;
    Ok(to_lamports(balance)?)
}

fn store_balance(connection: &mut PgConnection, account: Identity, balance: Lamports) -> TxResult<()> {
    let owner = account.to_bytes();
    diesel::update(ledger_accounts::table.filter(ledger_accounts::owner.eq(owner.as_slice())))
        .set(ledger_accounts::balance.eq(to_column(balance.value(), account)?))
        .execute(connection)?;
    Ok(())
}

fn lock_board(connection: &mut PgConnection, address: BoardAddress) -> TxResult<Option<BoardRow>> {
    let key = address.to_bytes();
    Ok(boards::table
        .filter(boards::address.eq(key.as_slice()))
        .select(BoardRow::as_select())
        .for_update()
        .get_result::<BoardRow>(connection)
        .optional()?)
}

fn lock_task(connection: &mut PgConnection, address: TaskAddress) -> TxResult<Option<TaskRow>> {
    let key = address.to_bytes();
    Ok(tasks::table
        .filter(tasks::address.eq(key.as_slice()))
        .select(TaskRow::as_select())
        .for_update()
        .get_result::<TaskRow>(connection)
        .optional()?)
}

fn debit(account: Identity, available: Lamports, required: Lamports) -> TxResult<Lamports> {
    available.checked_sub(required).map_err(|_| {
        TxError::Ledger(BountyLedgerError::InsufficientFunds {
            account,
            required,
            available,
        })
    })
}

/// Converts an amount or counter to a `BIGINT` column value.
///
/// Values above `i64::MAX` cannot be stored and fail as an overflow charged
/// to `account`.
fn to_column(value: u64, account: Identity) -> BountyLedgerResult<i64> {
    i64::try_from(value).map_err(|_| BountyLedgerError::Overflow(account))
}

fn to_u64(value: i64) -> BountyLedgerResult<u64> {
    u64::try_from(value).map_err(BountyLedgerError::persistence)
}

fn to_lamports(value: i64) -> BountyLedgerResult<Lamports> {
    to_u64(value).map(Lamports::new)
}

fn parse_status(value: &str) -> BountyLedgerResult<TaskStatus> {
    TaskStatus::try_from(value).map_err(BountyLedgerError::persistence)
}

fn identity_from(bytes: &[u8]) -> BountyLedgerResult<Identity> {
    Identity::try_from_slice(bytes).map_err(BountyLedgerError::persistence)
}

fn to_board_row(board: &Board) -> BountyLedgerResult<BoardRow> {
    let authority = board.authority();
    Ok(BoardRow {
        address: board.address().to_bytes().to_vec(),
        authority: authority.to_bytes().to_vec(),
        task_count: to_column(board.task_count(), authority)?,
        total_bounties: to_column(board.total_bounties().value(), authority)?,
        reservation: to_column(board.reservation().value(), authority)?,
        created_at: board.created_at(),
        updated_at: board.updated_at(),
    })
}

fn row_to_board(row: &BoardRow) -> BountyLedgerResult<Board> {
    Ok(Board::from_persisted(PersistedBoardData {
        authority: identity_from(&row.authority)?,
        task_count: to_u64(row.task_count)?,
        total_bounties: to_lamports(row.total_bounties)?,
        reservation: to_lamports(row.reservation)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

/// Column values describing an escrow release.
type ReleaseColumns = (Option<Vec<u8>>, Option<i64>, Option<String>);

fn release_columns(release: Option<&EscrowRelease>) -> BountyLedgerResult<ReleaseColumns> {
    let Some(release) = release else {
        return Ok((None, None, None));
    };
    Ok((
        Some(release.recipient().to_bytes().to_vec()),
        Some(to_column(release.amount().value(), release.recipient())?),
        Some(release.kind().as_str().to_owned()),
    ))
}

fn to_task_row(task: &Task) -> BountyLedgerResult<TaskRow> {
    let (release_recipient, release_amount, release_kind) =
        release_columns(task.escrow().release())?;
    let creator = task.creator();
    Ok(TaskRow {
        address: task.address().to_bytes().to_vec(),
        board: task.board().to_bytes().to_vec(),
        task_index: to_column(task.index(), creator)?,
        creator: creator.to_bytes().to_vec(),
        claimer: task.claimer().map(|claimer| claimer.to_bytes().to_vec()),
        title: task.title().as_str().to_owned(),
        description: task.description().as_str().to_owned(),
        bounty_amount: to_column(task.bounty_amount().value(), creator)?,
        proof: task.proof().map(|proof| proof.as_str().to_owned()),
        status: task.status().as_str().to_owned(),
        escrow_balance: to_column(task.escrow().balance().value(), creator)?,
        release_recipient,
        release_amount,
        release_kind,
        reservation: to_column(task.reservation().value(), creator)?,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn to_transition_changeset(task: &Task) -> BountyLedgerResult<TaskTransitionChangeset> {
    let (release_recipient, release_amount, release_kind) =
        release_columns(task.escrow().release())?;
    Ok(TaskTransitionChangeset {
        claimer: task.claimer().map(|claimer| claimer.to_bytes().to_vec()),
        proof: task.proof().map(|proof| proof.as_str().to_owned()),
        status: task.status().as_str().to_owned(),
        escrow_balance: to_column(task.escrow().balance().value(), task.creator())?,
        release_recipient,
        release_amount,
        release_kind,
        updated_at: task.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> BountyLedgerResult<Task> {
    let TaskRow {
        address: _,
        board,
        task_index,
        creator,
        claimer,
        title,
        description,
        bounty_amount,
        proof,
        status,
        escrow_balance,
        release_recipient,
        release_amount,
        release_kind,
        reservation,
        created_at,
        updated_at,
    } = row;

    let release = match (release_recipient, release_amount, release_kind) {
        (Some(recipient), Some(amount), Some(kind)) => Some(EscrowRelease::new(
            identity_from(&recipient)?,
            to_lamports(amount)?,
            ReleaseKind::try_from(kind.as_str()).map_err(BountyLedgerError::persistence)?,
        )),
        (None, None, None) => None,
        _ => {
            return Err(BountyLedgerError::persistence(std::io::Error::other(
                "escrow release columns are partially set",
            )));
        }
    };

    let data = PersistedTaskData {
        board: BoardAddress::try_from_slice(&board).map_err(BountyLedgerError::persistence)?,
        index: to_u64(task_index)?,
        creator: identity_from(&creator)?,
        claimer: claimer.as_deref().map(identity_from).transpose()?,
        title: TaskTitle::new(title).map_err(BountyLedgerError::persistence)?,
        description: TaskDescription::new(description).map_err(BountyLedgerError::persistence)?,
        bounty_amount: to_lamports(bounty_amount)?,
        proof: proof
            .map(CompletionProof::new)
            .transpose()
            .map_err(BountyLedgerError::persistence)?,
        status: parse_status(&status)?,
        escrow: Escrow::from_persisted(to_lamports(escrow_balance)?, release),
        reservation: to_lamports(reservation)?,
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}
