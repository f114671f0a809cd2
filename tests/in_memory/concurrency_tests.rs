//! Racing intents against one in-memory ledger.

use std::sync::Arc;

use super::helpers::{ALICE, BOB, CAROL, Harness, TestService, harness};
use bounty_board::bounty::{
    domain::{BountyDomainError, Identity, Task, TaskAddress, TaskStatus},
    ports::{BountyLedger, BountyLedgerError},
    services::{BountyBoardError, CreateTaskRequest},
};
use eyre::{ensure, eyre};
use rstest::rstest;
use tokio::sync::Barrier;

/// Second competing claimer.
const DAVE: Identity = Identity::from_bytes([0xd5; 32]);

/// Claims `task` from every identity at once, released together by a barrier.
async fn race_claims(
    service: &TestService,
    task: TaskAddress,
    claimers: &[Identity],
) -> eyre::Result<Vec<Result<Task, BountyBoardError>>> {
    let start = Arc::new(Barrier::new(claimers.len()));
    let handles: Vec<_> = claimers
        .iter()
        .map(|&claimer| {
            let claim_service = service.clone();
            let gate = Arc::clone(&start);
            tokio::spawn(async move {
                gate.wait().await;
                claim_service.claim_task(claimer, task).await
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await?);
    }
    Ok(results)
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_claims_commit_exactly_once(harness: Harness) -> eyre::Result<()> {
    let (board, first) = harness.board_with_task().await?;
    let mut tasks = vec![first.address()];
    for round in 1..8 {
        let task = harness
            .service
            .create_task(
                ALICE,
                CreateTaskRequest::new(board.address(), format!("Race {round}"), "...", 1_u64),
            )
            .await?;
        tasks.push(task.address());
    }

    for task in tasks {
        let results = race_claims(&harness.service, task, &[BOB, CAROL, DAVE]).await?;

        let winners: Vec<_> = results.iter().filter_map(|result| result.as_ref().ok()).collect();
        ensure!(winners.len() == 1, "expected one successful claim, got {}", winners.len());
        for loser in results.iter().filter(|result| result.is_err()) {
            ensure!(
                matches!(
                    loser,
                    Err(BountyBoardError::Domain(BountyDomainError::InvalidTaskStatus {
                        expected: TaskStatus::Created,
                        actual: TaskStatus::Claimed,
                        ..
                    }))
                ),
                "unexpected losing claim: {loser:?}"
            );
        }
        let stored = harness
            .ledger
            .find_task(task)
            .await?
            .ok_or_else(|| eyre!("task is missing"))?;
        ensure!(stored.status() == TaskStatus::Claimed);
        ensure!(stored.claimer() == winners.first().and_then(|winner| winner.claimer()));
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creations_get_distinct_indexes(harness: Harness) -> eyre::Result<()> {
    let (board, _) = harness.board_with_task().await?;
    let service = harness.service.clone();
    let address = board.address();

    let handles: Vec<_> = (0..4)
        .map(|n| {
            let task_service = service.clone();
            tokio::spawn(async move {
                task_service
                    .create_task(
                        ALICE,
                        CreateTaskRequest::new(address, format!("Task {n}"), "...", 1_u64),
                    )
                    .await
            })
        })
        .collect();

    let mut created = Vec::new();
    for handle in handles {
        match handle.await? {
            Ok(task) => created.push(task.index()),
            Err(BountyBoardError::Ledger(BountyLedgerError::TaskCounterConflict {
                board: conflicted,
                ..
            })) if conflicted == address => {}
            Err(other) => return Err(eyre!("unexpected creation failure: {other}")),
        }
    }
    let stored = service
        .find_board(ALICE)
        .await?
        .ok_or_else(|| eyre!("board is missing"))?;

    let committed = created.len();
    created.sort_unstable();
    created.dedup();
    ensure!(created.len() == committed, "two tasks share an index");
    ensure!(committed > 0);
    ensure!(stored.task_count() == 1 + u64::try_from(committed)?);
    Ok(())
}
