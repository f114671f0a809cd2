//! Task aggregate root and its lifecycle transitions.

use super::{
    ActorRole, Board, BoardAddress, BountyDomainError, CompletionProof, Escrow, EscrowRelease,
    Identity, Lamports, ReleaseKind, TaskAddress, TaskDescription, TaskStatus, TaskTitle,
    TaskTransition,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Validated inputs for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTerms {
    /// Task title.
    pub title: TaskTitle,
    /// Task description.
    pub description: TaskDescription,
    /// Amount placed into escrow.
    pub bounty_amount: Lamports,
    /// Lamports locked into the record, outside the escrow.
    pub reservation: Lamports,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    address: TaskAddress,
    board: BoardAddress,
    index: u64,
    creator: Identity,
    claimer: Option<Identity>,
    title: TaskTitle,
    description: TaskDescription,
    bounty_amount: Lamports,
    proof: Option<CompletionProof>,
    status: TaskStatus,
    escrow: Escrow,
    reservation: Lamports,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Owning board address.
    pub board: BoardAddress,
    /// Index under the board.
    pub index: u64,
    /// Creator identity.
    pub creator: Identity,
    /// Claimer identity, if claimed.
    pub claimer: Option<Identity>,
    /// Task title.
    pub title: TaskTitle,
    /// Task description.
    pub description: TaskDescription,
    /// Original bounty amount.
    pub bounty_amount: Lamports,
    /// Completion proof, if submitted.
    pub proof: Option<CompletionProof>,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Escrow state.
    pub escrow: Escrow,
    /// Lamports locked into the record.
    pub reservation: Lamports,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a funded task at the board's next index.
    ///
    /// Advances the board's counters on success. Neither the board nor any
    /// task is changed on failure.
    ///
    /// # Errors
    ///
    /// Returns [`BountyDomainError::Unauthorized`] when `creator` is not the
    /// board authority, [`BountyDomainError::InvalidBountyAmount`] for a zero
    /// bounty and [`BountyDomainError::Overflow`] when the board counters
    /// cannot advance.
    pub fn create(
        board: &mut Board,
        creator: Identity,
        terms: TaskTerms,
        clock: &impl Clock,
    ) -> Result<Self, BountyDomainError> {
        if !board.is_authority(creator) {
            return Err(BountyDomainError::Unauthorized {
                actor: creator,
                required: ActorRole::BoardAuthority,
            });
        }
        if terms.bounty_amount.is_zero() {
            return Err(BountyDomainError::InvalidBountyAmount);
        }

        let index = board.allocate_task(terms.bounty_amount, clock)?;
        let timestamp = clock.utc();
        Ok(Self {
            address: TaskAddress::derive(board.address(), index),
            board: board.address(),
            index,
            creator,
            claimer: None,
            title: terms.title,
            description: terms.description,
            bounty_amount: terms.bounty_amount,
            proof: None,
            status: TaskStatus::Created,
            escrow: Escrow::funded(terms.bounty_amount),
            reservation: terms.reservation,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    ///
    /// The address is re-derived from the board and index.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            address: TaskAddress::derive(data.board, data.index),
            board: data.board,
            index: data.index,
            creator: data.creator,
            claimer: data.claimer,
            title: data.title,
            description: data.description,
            bounty_amount: data.bounty_amount,
            proof: data.proof,
            status: data.status,
            escrow: data.escrow,
            reservation: data.reservation,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task address.
    #[must_use]
    pub const fn address(&self) -> TaskAddress {
        self.address
    }

    /// Returns the owning board address.
    #[must_use]
    pub const fn board(&self) -> BoardAddress {
        self.board
    }

    /// Returns the index under the owning board.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Returns the creator identity.
    #[must_use]
    pub const fn creator(&self) -> Identity {
        self.creator
    }

    /// Returns the claimer identity, if claimed.
    #[must_use]
    pub const fn claimer(&self) -> Option<Identity> {
        self.claimer
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub const fn description(&self) -> &TaskDescription {
        &self.description
    }

    /// Returns the original bounty amount.
    #[must_use]
    pub const fn bounty_amount(&self) -> Lamports {
        self.bounty_amount
    }

    /// Returns the completion proof, if submitted.
    #[must_use]
    pub const fn proof(&self) -> Option<&CompletionProof> {
        self.proof.as_ref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the escrow state.
    #[must_use]
    pub const fn escrow(&self) -> &Escrow {
        &self.escrow
    }

    /// Returns the lamports locked into the record.
    #[must_use]
    pub const fn reservation(&self) -> Lamports {
        self.reservation
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether `identity` created or claimed this task.
    #[must_use]
    pub fn involves(&self, identity: Identity) -> bool {
        self.creator == identity || self.claimer == Some(identity)
    }

    /// Claims the task for `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`BountyDomainError::Unauthorized`] when `actor` is the
    /// creator and [`BountyDomainError::InvalidTaskStatus`] unless the task
    /// is [`TaskStatus::Created`].
    pub fn claim(&mut self, actor: Identity, clock: &impl Clock) -> Result<(), BountyDomainError> {
        self.check(TaskTransition::Claim, actor)?;
        self.claimer = Some(actor);
        self.advance(TaskTransition::Claim, clock);
        Ok(())
    }

    /// Records completion proof from the claimer.
    ///
    /// # Errors
    ///
    /// Returns [`BountyDomainError::Unauthorized`] when `actor` is not the
    /// claimer and [`BountyDomainError::InvalidTaskStatus`] unless the task
    /// is [`TaskStatus::Claimed`].
    pub fn submit_completion(
        &mut self,
        actor: Identity,
        proof: CompletionProof,
        clock: &impl Clock,
    ) -> Result<(), BountyDomainError> {
        self.check(TaskTransition::SubmitCompletion, actor)?;
        self.proof = Some(proof);
        self.advance(TaskTransition::SubmitCompletion, clock);
        Ok(())
    }

    /// Approves the work and pays the escrow to the claimer.
    ///
    /// # Errors
    ///
    /// Returns [`BountyDomainError::Unauthorized`] when `actor` is not the
    /// creator, [`BountyDomainError::InvalidTaskStatus`] unless the task is
    /// [`TaskStatus::Completed`] and [`BountyDomainError::EscrowImbalance`]
    /// when the escrow does not balance after release.
    pub fn approve(
        &mut self,
        actor: Identity,
        clock: &impl Clock,
    ) -> Result<EscrowRelease, BountyDomainError> {
        self.check(TaskTransition::Approve, actor)?;
        let claimer = self.claimer.ok_or(BountyDomainError::Unauthorized {
            actor,
            required: ActorRole::Claimer,
        })?;
        self.release(TaskTransition::Approve, claimer, ReleaseKind::Payout, clock)
    }

    /// Rejects the work and returns the escrow to the creator.
    ///
    /// # Errors
    ///
    /// Returns [`BountyDomainError::Unauthorized`] when `actor` is not the
    /// creator, [`BountyDomainError::InvalidTaskStatus`] unless the task is
    /// [`TaskStatus::Completed`] and [`BountyDomainError::EscrowImbalance`]
    /// when the escrow does not balance after release.
    pub fn reject(
        &mut self,
        actor: Identity,
        clock: &impl Clock,
    ) -> Result<EscrowRelease, BountyDomainError> {
        self.check(TaskTransition::Reject, actor)?;
        self.release(TaskTransition::Reject, self.creator, ReleaseKind::Refund, clock)
    }

    /// Checks authorization first, then the required status.
    fn check(&self, transition: TaskTransition, actor: Identity) -> Result<(), BountyDomainError> {
        let required = transition.required_role();
        let authorized = match required {
            ActorRole::BoardAuthority | ActorRole::Creator => actor == self.creator,
            ActorRole::NonCreator => actor != self.creator,
            ActorRole::Claimer => self.claimer == Some(actor),
        };
        if !authorized {
            return Err(BountyDomainError::Unauthorized { actor, required });
        }

        let expected = transition.required_status();
        if self.status != expected {
            return Err(BountyDomainError::InvalidTaskStatus {
                task: self.address,
                expected,
                actual: self.status,
            });
        }
        Ok(())
    }

    fn release(
        &mut self,
        transition: TaskTransition,
        recipient: Identity,
        kind: ReleaseKind,
        clock: &impl Clock,
    ) -> Result<EscrowRelease, BountyDomainError> {
        let imbalance = BountyDomainError::EscrowImbalance {
            task: self.address,
            bounty: self.bounty_amount,
        };
        let escrow = self
            .escrow
            .released_to(recipient, kind)
            .ok_or_else(|| imbalance.clone())?;
        let release = escrow.release().copied().ok_or_else(|| imbalance.clone())?;
        if !escrow.is_balanced(self.bounty_amount) || release.amount() != self.bounty_amount {
            return Err(imbalance);
        }

        self.escrow = escrow;
        self.advance(transition, clock);
        Ok(release)
    }

    fn advance(&mut self, transition: TaskTransition, clock: &impl Clock) {
        debug_assert!(self.status.can_transition_to(transition.target_status()));
        self.status = transition.target_status();
        self.updated_at = clock.utc();
    }
}
