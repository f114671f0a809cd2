//! Value custody attached to a task record.

use super::{Identity, Lamports, ParseReleaseKindError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction in which an escrow was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseKind {
    /// Paid to the claimer on approval.
    Payout,
    /// Returned to the creator on rejection.
    Refund,
}

impl ReleaseKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Payout => "payout",
            Self::Refund => "refund",
        }
    }
}

impl fmt::Display for ReleaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ReleaseKind {
    type Error = ParseReleaseKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "payout" => Ok(Self::Payout),
            "refund" => Ok(Self::Refund),
            _ => Err(ParseReleaseKindError(value.to_owned())),
        }
    }
}

/// Record of the single disbursement made from an escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowRelease {
    recipient: Identity,
    amount: Lamports,
    kind: ReleaseKind,
}

impl EscrowRelease {
    /// Creates a release record.
    #[must_use]
    pub const fn new(recipient: Identity, amount: Lamports, kind: ReleaseKind) -> Self {
        Self {
            recipient,
            amount,
            kind,
        }
    }

    /// Returns the credited identity.
    #[must_use]
    pub const fn recipient(&self) -> Identity {
        self.recipient
    }

    /// Returns the disbursed amount.
    #[must_use]
    pub const fn amount(&self) -> Lamports {
        self.amount
    }

    /// Returns the release direction.
    #[must_use]
    pub const fn kind(&self) -> ReleaseKind {
        self.kind
    }
}

/// Escrowed balance held by a task.
///
/// The balance starts at the bounty amount and is released in full exactly
/// once. After the release the balance is zero and the release record holds
/// the disbursed amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escrow {
    balance: Lamports,
    release: Option<EscrowRelease>,
}

impl Escrow {
    /// Creates an escrow funded with `amount`.
    #[must_use]
    pub const fn funded(amount: Lamports) -> Self {
        Self {
            balance: amount,
            release: None,
        }
    }

    /// Reconstructs an escrow from persisted storage.
    #[must_use]
    pub const fn from_persisted(balance: Lamports, release: Option<EscrowRelease>) -> Self {
        Self { balance, release }
    }

    /// Returns the balance still held.
    #[must_use]
    pub const fn balance(&self) -> Lamports {
        self.balance
    }

    /// Returns the release record, if the escrow was disbursed.
    #[must_use]
    pub const fn release(&self) -> Option<&EscrowRelease> {
        self.release.as_ref()
    }

    /// Returns the total amount disbursed so far.
    #[must_use]
    pub fn disbursed(&self) -> Lamports {
        self.release.map_or(Lamports::ZERO, |release| release.amount)
    }

    /// Returns the escrow after debiting the full balance to `recipient`.
    ///
    /// Returns `None` when the escrow was already released.
    #[must_use]
    pub const fn released_to(&self, recipient: Identity, kind: ReleaseKind) -> Option<Self> {
        if self.release.is_some() {
            return None;
        }
        Some(Self {
            balance: Lamports::ZERO,
            release: Some(EscrowRelease::new(recipient, self.balance, kind)),
        })
    }

    /// Returns whether balance plus disbursed value equals `bounty`.
    #[must_use]
    pub fn is_balanced(&self, bounty: Lamports) -> bool {
        self.balance
            .checked_add(self.disbursed())
            .is_ok_and(|total| total == bounty)
    }
}
