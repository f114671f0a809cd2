//! Shared world state for bounty lifecycle BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use bounty_board::bounty::{
    adapters::memory::InMemoryBountyLedger,
    domain::{BoardAddress, Identity, Task, TaskAddress},
    services::{BountyBoardError, BountyBoardService},
};
use bounty_board::config::BountyBoardConfig;
use mockable::DefaultClock;
use rstest::fixture;
use sha2::{Digest, Sha256};

/// Service type used by the BDD world.
pub type TestBountyService = BountyBoardService<InMemoryBountyLedger, DefaultClock>;

/// Scenario world for bounty lifecycle behaviour tests.
pub struct BountyWorld {
    pub ledger: Arc<InMemoryBountyLedger>,
    pub service: TestBountyService,
    pub actors: HashMap<String, Identity>,
    pub board: Option<BoardAddress>,
    pub task: Option<TaskAddress>,
    pub last_result: Option<Result<Task, BountyBoardError>>,
}

impl BountyWorld {
    /// Creates a world over an empty ledger that charges no reservations.
    #[must_use]
    pub fn new() -> Self {
        let ledger = Arc::new(InMemoryBountyLedger::new());
        let service = BountyBoardService::with_config(
            Arc::clone(&ledger),
            Arc::new(DefaultClock),
            BountyBoardConfig::without_reservations(),
        );
        Self {
            ledger,
            service,
            actors: HashMap::new(),
            board: None,
            task: None,
            last_result: None,
        }
    }

    /// Returns the identity registered for `name`, deriving it on first use.
    pub fn actor(&mut self, name: &str) -> Identity {
        *self
            .actors
            .entry(name.to_owned())
            .or_insert_with(|| Identity::from_bytes(Sha256::digest(name.as_bytes()).into()))
    }

    /// Returns the board created by the scenario.
    pub fn board(&self) -> Result<BoardAddress, eyre::Report> {
        self.board
            .ok_or_else(|| eyre::eyre!("missing board in scenario world"))
    }

    /// Returns the task created by the scenario.
    pub fn task(&self) -> Result<TaskAddress, eyre::Report> {
        self.task
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }
}

impl Default for BountyWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BountyWorld {
    BountyWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
