//! In-memory integration tests for the bounty task lifecycle.

use super::helpers::{ALICE, BOB, BOUNTY, CAROL, Harness, STARTING_FUNDS, harness};
use bounty_board::bounty::{
    domain::{BountyDomainError, Lamports, ReleaseKind, TaskStatus},
    services::{BountyBoardError, CreateTaskRequest, SubmitCompletionRequest, TaskFilter},
};
use eyre::{ensure, eyre};
use rstest::rstest;

fn domain_code<T: std::fmt::Debug>(result: Result<T, BountyBoardError>) -> eyre::Result<&'static str> {
    match result {
        Err(BountyBoardError::Domain(err)) => Ok(err.code()),
        other => Err(eyre!("expected a domain error, got {other:?}")),
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_task_starts_at_index_zero(harness: Harness) -> eyre::Result<()> {
    let (board, task) = harness.board_with_task().await?;

    let stored_board = harness
        .service
        .find_board(ALICE)
        .await?
        .ok_or_else(|| eyre!("board is missing"))?;
    ensure!(task.status() == TaskStatus::Created);
    ensure!(task.index() == 0);
    ensure!(stored_board.task_count() == 1);
    ensure!(task.escrow().balance() == Lamports::new(BOUNTY));
    ensure!(harness.balance(ALICE).await? == STARTING_FUNDS - BOUNTY);
    let found = harness.service.find_task(board.address(), 0).await?;
    ensure!(found.as_ref() == Some(&task));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_claim_fails_and_keeps_first_claimer(harness: Harness) -> eyre::Result<()> {
    let (_, task) = harness.board_with_task().await?;

    let claimed = harness.service.claim_task(BOB, task.address()).await?;
    let code = domain_code(harness.service.claim_task(CAROL, task.address()).await)?;

    ensure!(claimed.status() == TaskStatus::Claimed);
    ensure!(claimed.claimer() == Some(BOB));
    ensure!(code == "TaskAlreadyClaimed");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn approval_pays_the_claimer_and_empties_escrow(harness: Harness) -> eyre::Result<()> {
    let (_, task) = harness.board_with_task().await?;
    harness.service.claim_task(BOB, task.address()).await?;
    let completed = harness
        .service
        .submit_completion(BOB, SubmitCompletionRequest::new(task.address(), "proof-url"))
        .await?;
    let outsider_code = domain_code(
        harness
            .service
            .submit_completion(CAROL, SubmitCompletionRequest::new(task.address(), "proof-url"))
            .await,
    )?;

    let approved = harness.service.approve_completion(ALICE, task.address()).await?;

    ensure!(completed.status() == TaskStatus::Completed);
    ensure!(outsider_code == "Unauthorized");
    ensure!(approved.status() == TaskStatus::Approved);
    ensure!(approved.escrow().balance() == Lamports::ZERO);
    ensure!(
        approved.escrow().release().map(|release| release.kind()) == Some(ReleaseKind::Payout)
    );
    ensure!(harness.balance(BOB).await? == STARTING_FUNDS + BOUNTY);
    ensure!(harness.balance(ALICE).await? == STARTING_FUNDS - BOUNTY);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejection_refunds_the_creator_only(harness: Harness) -> eyre::Result<()> {
    let (_, task) = harness.board_with_task().await?;
    harness.service.claim_task(BOB, task.address()).await?;
    harness
        .service
        .submit_completion(BOB, SubmitCompletionRequest::new(task.address(), "proof-url"))
        .await?;

    let rejected = harness.service.reject_completion(ALICE, task.address()).await?;

    ensure!(rejected.status() == TaskStatus::Rejected);
    ensure!(rejected.escrow().balance() == Lamports::ZERO);
    ensure!(harness.balance(ALICE).await? == STARTING_FUNDS);
    ensure!(harness.balance(BOB).await? == STARTING_FUNDS);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn terminal_task_rejects_further_intents(harness: Harness) -> eyre::Result<()> {
    let (_, task) = harness.board_with_task().await?;
    harness.service.claim_task(BOB, task.address()).await?;
    harness
        .service
        .submit_completion(BOB, SubmitCompletionRequest::new(task.address(), "proof-url"))
        .await?;
    harness.service.approve_completion(ALICE, task.address()).await?;

    let second_approval = domain_code(harness.service.approve_completion(ALICE, task.address()).await)?;
    let late_rejection = domain_code(harness.service.reject_completion(ALICE, task.address()).await)?;

    ensure!(second_approval == "InvalidTaskStatus");
    ensure!(late_rejection == "InvalidTaskStatus");
    ensure!(harness.balance(BOB).await? == STARTING_FUNDS + BOUNTY);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn overlong_title_creates_no_record(harness: Harness) -> eyre::Result<()> {
    let (board, _) = harness.board_with_task().await?;

    let result = harness
        .service
        .create_task(
            ALICE,
            CreateTaskRequest::new(board.address(), "x".repeat(101), "...", BOUNTY),
        )
        .await;

    ensure!(matches!(
        result,
        Err(BountyBoardError::Domain(BountyDomainError::TitleTooLong {
            max: 100,
            actual: 101,
        }))
    ));
    let stored_board = harness
        .service
        .find_board(ALICE)
        .await?
        .ok_or_else(|| eyre!("board is missing"))?;
    ensure!(stored_board.task_count() == 1);
    ensure!(harness.service.find_task(board.address(), 1).await?.is_none());
    ensure!(harness.balance(ALICE).await? == STARTING_FUNDS - BOUNTY);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bounty_larger_than_balance_is_rejected(harness: Harness) -> eyre::Result<()> {
    let (board, _) = harness.board_with_task().await?;

    let code = domain_code(
        harness
            .service
            .create_task(
                ALICE,
                CreateTaskRequest::new(board.address(), "Too rich", "...", STARTING_FUNDS),
            )
            .await,
    )?;
    let zero = domain_code(
        harness
            .service
            .create_task(
                ALICE,
                CreateTaskRequest::new(board.address(), "Free", "...", 0_u64),
            )
            .await,
    )?;

    ensure!(code == "InsufficientFunds");
    ensure!(zero == "InvalidBountyAmount");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn participant_filter_lists_claimed_work(harness: Harness) -> eyre::Result<()> {
    let (board, first) = harness.board_with_task().await?;
    let second = harness
        .service
        .create_task(
            ALICE,
            CreateTaskRequest::new(board.address(), "Write docs", "...", 7_u64),
        )
        .await?;
    harness.service.claim_task(CAROL, second.address()).await?;

    let created_by_alice = harness
        .service
        .list_tasks(board.address(), TaskFilter::all().with_participant(ALICE))
        .await?;
    let involving_carol = harness
        .service
        .list_tasks(board.address(), TaskFilter::all().with_participant(CAROL))
        .await?;
    let open_for_carol = harness
        .service
        .list_tasks(
            board.address(),
            TaskFilter::all()
                .with_participant(CAROL)
                .with_status(TaskStatus::Created),
        )
        .await?;

    ensure!(created_by_alice.len() == 2);
    ensure!(involving_carol.iter().map(|task| task.address()).eq([second.address()]));
    ensure!(open_for_carol.is_empty());
    ensure!(first.claimer().is_none());
    Ok(())
}
