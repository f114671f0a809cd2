//! Actor identities and deterministic record addresses.

use super::ParseIdentityError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Length in bytes of identities and record addresses.
pub const KEY_LENGTH: usize = 32;

/// Seed prefix for board address derivation.
pub const BOARD_SEED: &[u8] = b"bounty_board";

/// Seed prefix for task address derivation.
pub const TASK_SEED: &[u8] = b"task";

macro_rules! key_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; KEY_LENGTH]);

        impl $name {
            /// Wraps raw key bytes.
            #[must_use]
            pub const fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
                Self(bytes)
            }

            /// Returns the raw key bytes.
            #[must_use]
            pub const fn to_bytes(self) -> [u8; KEY_LENGTH] {
                self.0
            }

            /// Parses a key from a byte slice of exactly [`KEY_LENGTH`] bytes.
            ///
            /// # Errors
            ///
            /// Returns [`ParseIdentityError::InvalidLength`] for slices of any
            /// other length.
            pub fn try_from_slice(bytes: &[u8]) -> Result<Self, ParseIdentityError> {
                <[u8; KEY_LENGTH]>::try_from(bytes)
                    .map(Self)
                    .map_err(|_| ParseIdentityError::InvalidLength(bytes.len()))
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = ParseIdentityError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let bytes = hex::decode(value.trim())
                    .map_err(|err| ParseIdentityError::InvalidHex(err.to_string()))?;
                Self::try_from_slice(&bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

key_type! {
    /// Authenticated public identity of an actor.
    Identity
}

key_type! {
    /// Deterministic address of a board record.
    BoardAddress
}

key_type! {
    /// Deterministic address of a task record.
    TaskAddress
}

impl BoardAddress {
    /// Derives the board address owned by `authority`.
    #[must_use]
    pub fn derive(authority: Identity) -> Self {
        Self(hash_seeds(&[BOARD_SEED, authority.as_ref()]))
    }
}

impl TaskAddress {
    /// Derives the address of the task at `index` under `board`.
    #[must_use]
    #[expect(
        clippy::little_endian_bytes,
        reason = "task seeds encode the index as little-endian bytes"
    )]
    pub fn derive(board: BoardAddress, index: u64) -> Self {
        Self(hash_seeds(&[TASK_SEED, board.as_ref(), &index.to_le_bytes()]))
    }
}

fn hash_seeds(seeds: &[&[u8]]) -> [u8; KEY_LENGTH] {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.finalize().into()
}
