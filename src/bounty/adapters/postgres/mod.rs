//! `PostgreSQL` adapters for the bounty ledger.

mod config;
mod ledger;
mod models;
mod schema;

pub use config::{DATABASE_URL_ENV, PostgresLedgerConfig};
pub use ledger::{LedgerPgPool, PostgresBountyLedger};
