//! In-memory adapters for bounty board ports.

mod ledger;

pub use ledger::InMemoryBountyLedger;
