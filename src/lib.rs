//! Taskwright: task lifecycle and time-tracking backend.
//!
//! Users register with a password or a Google identity, organise their work
//! as tasks, move those tasks through `todo`, `in-progress` and `completed`,
//! and track time with start/stop timers. Administrators get aggregate
//! reports, login auditing and account moderation.
//!
//! # Architecture
//!
//! Taskwright follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`,
//!   credential hashing, token signing)
//!
//! # Modules
//!
//! - [`user`]: Accounts, credentials and authentication
//! - [`task`]: Task lifecycle and time tracking
//! - [`login_audit`]: Login attempt recording and statistics
//! - [`admin`]: Dashboard reports and account moderation
//! - [`config`], [`db`], [`telemetry`]: Runtime wiring

pub mod admin;
pub mod clock;
pub mod config;
pub mod db;
pub mod login_audit;
pub mod pagination;
pub mod rates;
pub mod task;
pub mod telemetry;
pub mod user;
