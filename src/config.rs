//! Reservation configuration for bounty boards.
//!
//! Every stored record locks a reservation: lamports paid by the record's
//! creator on top of any escrow, held for as long as the record exists. The
//! default reservation follows a rent-exemption rule: a fixed per-record
//! overhead plus the record's serialized size, priced per byte-year and held
//! for two years.

use crate::bounty::domain::{
    DESCRIPTION_MAX_CHARS, KEY_LENGTH, Lamports, PROOF_MAX_CHARS, TITLE_MAX_CHARS,
};
use serde::Deserialize;

/// Storage overhead charged for every record, in bytes.
pub const RECORD_OVERHEAD_BYTES: u64 = 128;

/// Lamports charged per byte per year of storage.
pub const LAMPORTS_PER_BYTE_YEAR: u64 = 3_480;

/// Years of storage a reservation prepays.
pub const RESERVATION_YEARS: u64 = 2;

const DISCRIMINATOR_BYTES: u64 = 8;
const KEY_BYTES: u64 = KEY_LENGTH as u64;
const U64_BYTES: u64 = 8;
const STRING_PREFIX_BYTES: u64 = 4;
const OPTION_TAG_BYTES: u64 = 1;
const ENUM_TAG_BYTES: u64 = 1;
const BUMP_BYTES: u64 = 1;

/// Serialized size of a board record.
///
/// Discriminator, authority, task counter, bounty total and address bump.
pub const BOARD_RECORD_BYTES: u64 =
    DISCRIMINATOR_BYTES + KEY_BYTES + U64_BYTES + U64_BYTES + BUMP_BYTES;

/// Serialized size of a task record at its maximum text lengths.
pub const TASK_RECORD_BYTES: u64 = DISCRIMINATOR_BYTES
    + KEY_BYTES // creator
    + OPTION_TAG_BYTES
    + KEY_BYTES // claimer
    + STRING_PREFIX_BYTES
    + TITLE_MAX_CHARS as u64
    + STRING_PREFIX_BYTES
    + DESCRIPTION_MAX_CHARS as u64
    + U64_BYTES // bounty
    + ENUM_TAG_BYTES // status
    + STRING_PREFIX_BYTES
    + PROOF_MAX_CHARS as u64
    + U64_BYTES // index
    + BUMP_BYTES;

/// Returns the reservation that keeps a record of `record_bytes` stored.
#[must_use]
pub const fn rent_exempt_minimum(record_bytes: u64) -> Lamports {
    let billed_bytes = RECORD_OVERHEAD_BYTES.saturating_add(record_bytes);
    Lamports::new(billed_bytes.saturating_mul(LAMPORTS_PER_BYTE_YEAR * RESERVATION_YEARS))
}

/// Reservation amounts charged when records are created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BountyBoardConfig {
    /// Lamports locked into every new board, paid by its authority.
    pub board_reservation: Lamports,
    /// Lamports locked into every new task, paid by its creator.
    pub task_reservation: Lamports,
}

impl Default for BountyBoardConfig {
    fn default() -> Self {
        Self {
            board_reservation: rent_exempt_minimum(BOARD_RECORD_BYTES),
            task_reservation: rent_exempt_minimum(TASK_RECORD_BYTES),
        }
    }
}

impl BountyBoardConfig {
    /// Creates a configuration with explicit reservations.
    #[must_use]
    pub const fn new(board_reservation: Lamports, task_reservation: Lamports) -> Self {
        Self {
            board_reservation,
            task_reservation,
        }
    }

    /// Creates a configuration that charges no reservations.
    ///
    /// Balances then move only by bounty amounts, which keeps fund
    /// accounting easy to follow in tests and simulations.
    #[must_use]
    pub const fn without_reservations() -> Self {
        Self::new(Lamports::ZERO, Lamports::ZERO)
    }
}
