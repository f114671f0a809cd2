//! Native value amounts with checked arithmetic.

use super::BountyDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount of native value in the ledger's smallest unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lamports(u64);

impl Lamports {
    /// Zero lamports.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw amount.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw amount.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns whether the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Adds two amounts.
    ///
    /// # Errors
    ///
    /// Returns [`BountyDomainError::Overflow`] when the sum does not fit.
    pub fn checked_add(self, other: Self) -> Result<Self, BountyDomainError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(BountyDomainError::Overflow)
    }

    /// Subtracts `other` from this amount.
    ///
    /// # Errors
    ///
    /// Returns [`BountyDomainError::Overflow`] when `other` is larger.
    pub fn checked_sub(self, other: Self) -> Result<Self, BountyDomainError> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(BountyDomainError::Overflow)
    }
}

impl From<u64> for Lamports {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Lamports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} lamports", self.0)
    }
}
