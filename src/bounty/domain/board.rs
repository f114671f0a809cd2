//! Board aggregate: an authority's namespace and its task counter.

use super::{BoardAddress, BountyDomainError, Identity, Lamports, TaskAddress};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Board aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    address: BoardAddress,
    authority: Identity,
    task_count: u64,
    total_bounties: Lamports,
    reservation: Lamports,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedBoardData {
    /// Board owner.
    pub authority: Identity,
    /// Number of tasks ever created.
    pub task_count: u64,
    /// Sum of every bounty escrowed under the board.
    pub total_bounties: Lamports,
    /// Lamports locked into the record.
    pub reservation: Lamports,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Board {
    /// Creates an empty board owned by `authority`.
    #[must_use]
    pub fn new(authority: Identity, reservation: Lamports, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            address: BoardAddress::derive(authority),
            authority,
            task_count: 0,
            total_bounties: Lamports::ZERO,
            reservation,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a board from persisted storage.
    ///
    /// The address is re-derived from the authority.
    #[must_use]
    pub fn from_persisted(data: PersistedBoardData) -> Self {
        Self {
            address: BoardAddress::derive(data.authority),
            authority: data.authority,
            task_count: data.task_count,
            total_bounties: data.total_bounties,
            reservation: data.reservation,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the board address.
    #[must_use]
    pub const fn address(&self) -> BoardAddress {
        self.address
    }

    /// Returns the owning authority.
    #[must_use]
    pub const fn authority(&self) -> Identity {
        self.authority
    }

    /// Returns the number of tasks ever created under this board.
    #[must_use]
    pub const fn task_count(&self) -> u64 {
        self.task_count
    }

    /// Returns the sum of every bounty escrowed under this board.
    #[must_use]
    pub const fn total_bounties(&self) -> Lamports {
        self.total_bounties
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

    /// Returns the address the next created task will occupy.
    #[must_use]
    pub fn next_task_address(&self) -> TaskAddress {
        TaskAddress::derive(self.address, self.task_count)
    }

    /// Returns whether `actor` owns this board.
    #[must_use]
    pub fn is_authority(&self, actor: Identity) -> bool {
        self.authority == actor
    }

    /// Allocates the next task index and accounts for its bounty.
    ///
    /// Returns the allocated index. Nothing changes when either counter
    /// would overflow.
    ///
    /// # Errors
    ///
    /// Returns [`BountyDomainError::Overflow`] when `task_count` or
    /// `total_bounties` cannot be advanced.
    pub fn allocate_task(
        &mut self,
        bounty: Lamports,
        clock: &impl Clock,
    ) -> Result<u64, BountyDomainError> {
        let index = self.task_count;
        let next_count = index.checked_add(1).ok_or(BountyDomainError::Overflow)?;
        let next_total = self.total_bounties.checked_add(bounty)?;

        self.task_count = next_count;
        self.total_bounties = next_total;
        self.updated_at = clock.utc();
        Ok(index)
    }
}
