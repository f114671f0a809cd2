//! Bounty board: escrowed work orders with an enforced lifecycle.
//!
//! This crate records paid tasks posted on per-authority boards, holds each
//! task's bounty in escrow, and moves it to the claimer or back to the
//! creator once the work is judged.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`bounty`]: Boards, tasks, escrow and the lifecycle service
//! - [`config`]: Reservation configuration

pub mod bounty;
pub mod config;
