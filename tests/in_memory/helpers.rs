//! Shared helpers for in-memory bounty board integration tests.

use std::sync::Arc;

use bounty_board::bounty::{
    adapters::memory::InMemoryBountyLedger,
    domain::{Board, Identity, Lamports, Task},
    ports::BountyLedger,
    services::{BountyBoardService, CreateTaskRequest},
};
use bounty_board::config::BountyBoardConfig;
use mockable::DefaultClock;
use rstest::fixture;
use tracing_subscriber::EnvFilter;

/// Service type used by in-memory integration tests.
pub type TestService = BountyBoardService<InMemoryBountyLedger, DefaultClock>;

/// Board authority and task creator.
pub const ALICE: Identity = Identity::from_bytes([0xa1; 32]);
/// Claimer.
pub const BOB: Identity = Identity::from_bytes([0xb0; 32]);
/// Uninvolved third party.
pub const CAROL: Identity = Identity::from_bytes([0xc4; 32]);

/// Starting balance of every funded identity.
pub const STARTING_FUNDS: u64 = 10_000_000_000;

/// Bounty used by the lifecycle scenarios.
pub const BOUNTY: u64 = 1_000_000_000;

/// Installs a test subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    let _installed = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .is_ok();
}

/// Ledger and service pair sharing one in-memory store.
pub struct Harness {
    pub ledger: Arc<InMemoryBountyLedger>,
    pub service: TestService,
}

/// Provides a harness whose service charges no reservations.
#[fixture]
pub fn harness() -> Harness {
    init_tracing();
    let ledger = Arc::new(InMemoryBountyLedger::new());
    let service = BountyBoardService::with_config(
        Arc::clone(&ledger),
        Arc::new(DefaultClock),
        BountyBoardConfig::without_reservations(),
    );
    Harness { ledger, service }
}

impl Harness {
    /// Funds every scenario identity with [`STARTING_FUNDS`].
    pub async fn fund_everyone(&self) -> eyre::Result<()> {
        for identity in [ALICE, BOB, CAROL] {
            self.ledger
                .deposit(identity, Lamports::new(STARTING_FUNDS))
                .await?;
        }
        Ok(())
    }

    /// Funds everyone, opens Alice's board and posts one task.
    pub async fn board_with_task(&self) -> eyre::Result<(Board, Task)> {
        self.fund_everyone().await?;
        let board = self.service.initialize_board(ALICE).await?;
        let task = self
            .service
            .create_task(
                ALICE,
                CreateTaskRequest::new(board.address(), "Build a website", "...", BOUNTY),
            )
            .await?;
        Ok((board, task))
    }

    /// Returns the current balance of `identity`.
    pub async fn balance(&self, identity: Identity) -> eyre::Result<u64> {
        Ok(self.service.balance_of(identity).await?.value())
    }
}
