//! Task status, actor roles, and the transition table.

use super::ParseTaskStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is funded and open for claiming.
    Created,
    /// A claimer has taken the task.
    Claimed,
    /// The claimer has submitted completion proof.
    Completed,
    /// The creator approved the work and the escrow was paid out.
    Approved,
    /// The creator rejected the work and the escrow was refunded.
    Rejected,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Claimed => "claimed",
            Self::Completed => "completed",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Returns whether no transition leaves this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Returns whether a single transition leads from this status to `target`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Created, Self::Claimed)
                | (Self::Claimed, Self::Completed)
                | (Self::Completed, Self::Approved | Self::Rejected)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "created" => Ok(Self::Created),
            "claimed" => Ok(Self::Claimed),
            "completed" => Ok(Self::Completed),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Role an actor must hold to invoke an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// The board's authority.
    BoardAuthority,
    /// The task's creator.
    Creator,
    /// Any identity other than the task's creator.
    NonCreator,
    /// The identity that claimed the task.
    Claimer,
}

impl ActorRole {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BoardAuthority => "board_authority",
            Self::Creator => "creator",
            Self::NonCreator => "non_creator",
            Self::Claimer => "claimer",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transitions defined on an existing task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskTransition {
    /// A non-creator takes the task.
    Claim,
    /// The claimer asserts the work is done.
    SubmitCompletion,
    /// The creator pays the escrow to the claimer.
    Approve,
    /// The creator returns the escrow to themselves.
    Reject,
}

impl TaskTransition {
    /// Every transition, in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Claim,
        Self::SubmitCompletion,
        Self::Approve,
        Self::Reject,
    ];

    /// Status the task must be in.
    #[must_use]
    pub const fn required_status(self) -> TaskStatus {
        match self {
            Self::Claim => TaskStatus::Created,
            Self::SubmitCompletion => TaskStatus::Claimed,
            Self::Approve | Self::Reject => TaskStatus::Completed,
        }
    }

    /// Status the task is in after the transition.
    #[must_use]
    pub const fn target_status(self) -> TaskStatus {
        match self {
            Self::Claim => TaskStatus::Claimed,
            Self::SubmitCompletion => TaskStatus::Completed,
            Self::Approve => TaskStatus::Approved,
            Self::Reject => TaskStatus::Rejected,
        }
    }

    /// Role the invoking actor must hold.
    #[must_use]
    pub const fn required_role(self) -> ActorRole {
        match self {
            Self::Claim => ActorRole::NonCreator,
            Self::SubmitCompletion => ActorRole::Claimer,
            Self::Approve | Self::Reject => ActorRole::Creator,
        }
    }

    /// Returns whether the transition releases the escrow.
    #[must_use]
    pub const fn releases_escrow(self) -> bool {
        matches!(self, Self::Approve | Self::Reject)
    }

    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Claim => "claim",
            Self::SubmitCompletion => "submit_completion",
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for TaskTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
