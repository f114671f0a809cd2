//! Connection settings for the `PostgreSQL` ledger.

use serde::Deserialize;

/// Environment variable read by [`PostgresLedgerConfig::from_env`].
pub const DATABASE_URL_ENV: &str = "BOUNTY_BOARD_DATABASE_URL";

/// Connection settings for [`super::PostgresBountyLedger`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostgresLedgerConfig {
    /// `PostgreSQL` connection URL.
    pub database_url: String,
    /// Maximum pooled connections.
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
}

const fn default_max_pool_size() -> u32 {
    8
}

impl PostgresLedgerConfig {
    /// Creates settings for `database_url` with the default pool size.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_pool_size: default_max_pool_size(),
        }
    }

    /// Sets the maximum pool size.
    #[must_use]
    pub const fn with_max_pool_size(mut self, max_pool_size: u32) -> Self {
        self.max_pool_size = max_pool_size;
        self
    }

    /// Reads the connection URL from [`DATABASE_URL_ENV`].
    ///
    /// Returns `None` when the variable is unset or empty.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        std::env::var(DATABASE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(Self::new)
    }
}
