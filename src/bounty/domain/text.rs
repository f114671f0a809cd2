//! Length-validated text fields carried by tasks.

use super::BountyDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum task title length in characters.
pub const TITLE_MAX_CHARS: usize = 100;

/// Maximum task description length in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Maximum completion proof length in characters.
pub const PROOF_MAX_CHARS: usize = 500;

/// Checks a value against `[1, max]` characters.
fn check_length(
    value: &str,
    max: usize,
    empty: BountyDomainError,
    too_long: impl FnOnce(usize) -> BountyDomainError,
) -> Result<(), BountyDomainError> {
    let actual = value.chars().count();
    if actual == 0 {
        return Err(empty);
    }
    if actual > max {
        return Err(too_long(actual));
    }
    Ok(())
}

/// Task title of 1 to [`TITLE_MAX_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`BountyDomainError::TitleEmpty`] or
    /// [`BountyDomainError::TitleTooLong`].
    pub fn new(value: impl Into<String>) -> Result<Self, BountyDomainError> {
        let raw = value.into();
        check_length(&raw, TITLE_MAX_CHARS, BountyDomainError::TitleEmpty, |actual| {
            BountyDomainError::TitleTooLong {
                max: TITLE_MAX_CHARS,
                actual,
            }
        })?;
        Ok(Self(raw))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Task description of 1 to [`DESCRIPTION_MAX_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskDescription(String);

impl TaskDescription {
    /// Creates a validated description.
    ///
    /// # Errors
    ///
    /// Returns [`BountyDomainError::DescriptionEmpty`] or
    /// [`BountyDomainError::DescriptionTooLong`].
    pub fn new(value: impl Into<String>) -> Result<Self, BountyDomainError> {
        let raw = value.into();
        check_length(
            &raw,
            DESCRIPTION_MAX_CHARS,
            BountyDomainError::DescriptionEmpty,
            |actual| BountyDomainError::DescriptionTooLong {
                max: DESCRIPTION_MAX_CHARS,
                actual,
            },
        )?;
        Ok(Self(raw))
    }

    /// Returns the description as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Completion evidence submitted by the claimer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionProof(String);

impl CompletionProof {
    /// Creates a validated proof.
    ///
    /// # Errors
    ///
    /// Returns [`BountyDomainError::ProofEmpty`] or
    /// [`BountyDomainError::ProofTooLong`].
    pub fn new(value: impl Into<String>) -> Result<Self, BountyDomainError> {
        let raw = value.into();
        check_length(&raw, PROOF_MAX_CHARS, BountyDomainError::ProofEmpty, |actual| {
            BountyDomainError::ProofTooLong {
                max: PROOF_MAX_CHARS,
                actual,
            }
        })?;
        Ok(Self(raw))
    }

    /// Returns the proof as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
