//! Domain model for bounty boards and escrowed tasks.
//!
//! The domain owns every rule about who may do what and when value moves:
//! the task transition table, authorization per transition, text and amount
//! validation, and the escrow conservation invariant. Persistence and fund
//! custody outside a task live behind the ledger port.

mod amount;
mod board;
mod error;
mod escrow;
mod identity;
mod status;
mod task;
mod text;

pub use amount::Lamports;
pub use board::{Board, PersistedBoardData};
pub use error::{
    BountyDomainError, ParseIdentityError, ParseReleaseKindError, ParseTaskStatusError,
};
pub use escrow::{Escrow, EscrowRelease, ReleaseKind};
pub use identity::{BOARD_SEED, BoardAddress, Identity, KEY_LENGTH, TASK_SEED, TaskAddress};
pub use status::{ActorRole, TaskStatus, TaskTransition};
pub use task::{PersistedTaskData, Task, TaskTerms};
pub use text::{
    CompletionProof, DESCRIPTION_MAX_CHARS, PROOF_MAX_CHARS, TITLE_MAX_CHARS, TaskDescription,
    TaskTitle,
};
