//! Given steps for bounty lifecycle BDD scenarios.

use super::world::{BountyWorld, run_async};
use bounty_board::bounty::{domain::Lamports, ports::BountyLedger, services::CreateTaskRequest};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#""{name}" holds {amount:u64} lamports"#)]
fn actor_holds_lamports(
    world: &mut BountyWorld,
    name: String,
    amount: u64,
) -> Result<(), eyre::Report> {
    let actor = world.actor(&name);
    run_async(world.ledger.deposit(actor, Lamports::new(amount)))
        .wrap_err("fund scenario actor")?;
    Ok(())
}

#[given(r#""{name}" has initialized a board"#)]
fn actor_initialized_board(world: &mut BountyWorld, name: String) -> Result<(), eyre::Report> {
    let authority = world.actor(&name);
    let board = run_async(world.service.initialize_board(authority))
        .wrap_err("initialize scenario board")?;
    world.board = Some(board.address());
    Ok(())
}

#[given(r#""{name}" has posted "{title}" with a bounty of {amount:u64} lamports"#)]
fn actor_posted_task(
    world: &mut BountyWorld,
    name: String,
    title: String,
    amount: u64,
) -> Result<(), eyre::Report> {
    let creator = world.actor(&name);
    let request = CreateTaskRequest::new(world.board()?, title, "Scenario task", amount);
    let task = run_async(world.service.create_task(creator, request))
        .wrap_err("create scenario task")?;
    world.task = Some(task.address());
    Ok(())
}

#[given(r#""{name}" has claimed the task"#)]
fn actor_claimed_task(world: &mut BountyWorld, name: String) -> Result<(), eyre::Report> {
    let claimer = world.actor(&name);
    let task = world.task()?;
    run_async(world.service.claim_task(claimer, task)).wrap_err("claim scenario task")?;
    Ok(())
}
