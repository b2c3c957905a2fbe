//! Task lifecycle and time tracking.
//!
//! Owners create tasks, move them between `todo`, `in-progress` and
//! `completed`, and track time with start/stop timers. At most one timer per
//! owner runs at any moment. The module follows hexagonal architecture:
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
