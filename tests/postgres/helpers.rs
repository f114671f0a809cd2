//! Shared test helpers for `PostgreSQL` ledger integration tests.
//!
//! Every test runs against its own temporary database created on the server
//! named by [`TEST_DATABASE_URL_ENV`]. The tests are ignored by default and
//! run with `cargo test --test postgres -- --ignored`.

use bounty_board::bounty::adapters::postgres::{PostgresBountyLedger, PostgresLedgerConfig};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use uuid::Uuid;

/// Boxed error type used by the helpers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Environment variable holding an administrative connection URL.
pub const TEST_DATABASE_URL_ENV: &str = "BOUNTY_BOARD_TEST_DATABASE_URL";

/// SQL that creates the ledger schema.
pub const CREATE_LEDGER_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_bounty_ledger/up.sql");

/// Database created for one test and dropped afterwards.
pub struct TemporaryDatabase {
    admin_url: String,
    name: String,
    url: String,
}

impl TemporaryDatabase {
    /// Returns the connection URL of the temporary database.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for TemporaryDatabase {
    fn drop(&mut self) {
        let statement = format!("DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)", self.name);
        if let Ok(mut conn) = PgConnection::establish(&self.admin_url)
            && let Err(err) = conn.batch_execute(&statement)
        {
            tracing::warn!(database = %self.name, error = %err, "failed to drop test database");
        }
    }
}

/// Ledger backed by a migrated temporary database.
pub struct PreparedLedger {
    /// Temporary database, dropped with the fixture.
    pub temp_db: TemporaryDatabase,
    /// Ledger under test.
    pub ledger: PostgresBountyLedger,
}

/// Replaces the database name in a `PostgreSQL` URL.
fn with_database(url: &str, database: &str) -> Result<String, BoxError> {
    let (base, query) = url.split_once('?').map_or((url, None), |(base, query)| (base, Some(query)));
    let (server, _) = base
        .rsplit_once('/')
        .ok_or_else(|| format!("database URL has no path: {url}"))?;
    Ok(query.map_or_else(
        || format!("{server}/{database}"),
        |params| format!("{server}/{database}?{params}"),
    ))
}

fn create_database(admin_url: &str) -> Result<TemporaryDatabase, BoxError> {
    let name = format!("bounty_test_{}", Uuid::new_v4().simple());
    let mut admin = PgConnection::establish(admin_url)?;
    admin.batch_execute(&format!("CREATE DATABASE \"{name}\""))?;

    let url = with_database(admin_url, &name)?;
    let temp_db = TemporaryDatabase {
        admin_url: admin_url.to_owned(),
        name,
        url,
    };
    let mut conn = PgConnection::establish(temp_db.url())?;
    conn.batch_execute(CREATE_LEDGER_SQL)?;
    Ok(temp_db)
}

/// Creates a migrated temporary database and a ledger over it.
///
/// # Errors
///
/// Returns an error if [`TEST_DATABASE_URL_ENV`] is unset, or if the database
/// cannot be created, migrated or pooled.
pub async fn prepared_ledger() -> Result<PreparedLedger, BoxError> {
    let admin_url = std::env::var(TEST_DATABASE_URL_ENV)
        .ok()
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| format!("{TEST_DATABASE_URL_ENV} must name a PostgreSQL server"))?;

    let temp_db = tokio::task::spawn_blocking(move || create_database(&admin_url)).await??;
    let config = PostgresLedgerConfig::new(temp_db.url()).with_max_pool_size(4);
    let ledger = PostgresBountyLedger::connect(&config)?;
    Ok(PreparedLedger { temp_db, ledger })
}
