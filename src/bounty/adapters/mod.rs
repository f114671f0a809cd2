//! Adapter implementations for bounty board ports.

pub mod memory;
pub mod postgres;
