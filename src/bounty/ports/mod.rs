//! Port contracts for bounty board persistence and fund custody.
//!
//! Ports define infrastructure-agnostic interfaces used by bounty services.

pub mod ledger;

pub use ledger::{BountyLedger, BountyLedgerError, BountyLedgerResult};
