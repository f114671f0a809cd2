//! Diesel row models for ledger persistence.

use super::schema::{boards, ledger_accounts, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Account balance row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = ledger_accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AccountRow {
    /// Account identity bytes.
    pub owner: Vec<u8>,
    /// Spendable balance.
    pub balance: i64,
}

/// Board row, used for both queries and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = boards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BoardRow {
    /// Derived board address.
    pub address: Vec<u8>,
    /// Owning authority.
    pub authority: Vec<u8>,
    /// Number of tasks ever created.
    pub task_count: i64,
    /// Sum of every escrowed bounty.
    pub total_bounties: i64,
    /// Lamports locked into the record.
    pub reservation: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Board columns advanced by task creation.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = boards)]
pub struct BoardCounterChangeset {
    /// Number of tasks ever created.
    pub task_count: i64,
    /// Sum of every escrowed bounty.
    pub total_bounties: i64,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Task row, used for both queries and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Derived task address.
    pub address: Vec<u8>,
    /// Owning board address.
    pub board: Vec<u8>,
    /// Index under the board.
    pub task_index: i64,
    /// Creator identity.
    pub creator: Vec<u8>,
    /// Claimer identity.
    pub claimer: Option<Vec<u8>>,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Original bounty.
    pub bounty_amount: i64,
    /// Completion proof.
    pub proof: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Escrow balance still held.
    pub escrow_balance: i64,
    /// Identity credited by the escrow release.
    pub release_recipient: Option<Vec<u8>>,
    /// Amount disbursed by the escrow release.
    pub release_amount: Option<i64>,
    /// Escrow release direction.
    pub release_kind: Option<String>,
    /// Lamports locked into the record.
    pub reservation: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Task columns a lifecycle transition may change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskTransitionChangeset {
    /// Claimer identity.
    pub claimer: Option<Vec<u8>>,
    /// Completion proof.
    pub proof: Option<String>,
    /// Lifecycle status.
    pub status: String,
    /// Escrow balance still held.
    pub escrow_balance: i64,
    /// Identity credited by the escrow release.
    pub release_recipient: Option<Vec<u8>>,
    /// Amount disbursed by the escrow release.
    pub release_amount: Option<i64>,
    /// Escrow release direction.
    pub release_kind: Option<String>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
