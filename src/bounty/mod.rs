//! Bounty boards and escrowed tasks.
//!
//! An authority opens a board and posts tasks under it, each funded with an
//! escrowed bounty. Another identity claims a task and submits proof of
//! completion; the creator then pays the escrow to the claimer or takes it
//! back. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
