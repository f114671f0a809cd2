//! Unit tests for the bounty board context.


use crate::bounty::domain::{
    Board, Identity, Lamports, Task, TaskDescription, TaskTerms, TaskTitle,
};
use mockable::DefaultClock;

/// Identity whose key bytes are all `seed`.
pub(super) const fn identity(seed: u8) -> Identity {
    Identity::from_bytes([seed; 32])
}

/// Creates an unreserved board and one funded task under it.
pub(super) fn funded_task(
    authority: Identity,
    bounty: u64,
) -> Result<(Board, Task), crate::bounty::domain::BountyDomainError> {
    let clock = DefaultClock;
    let mut board = Board::new(authority, Lamports::ZERO, &clock);
    let terms = TaskTerms {
        title: TaskTitle::new("Build a website")?,
        description: TaskDescription::new("Landing page with a contact form")?,
        bounty_amount: Lamports::new(bounty),
        reservation: Lamports::ZERO,
    };
    let task = Task::create(&mut board, authority, terms, &clock)?;
    Ok((board, task))
}
