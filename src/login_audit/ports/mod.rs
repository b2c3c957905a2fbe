//! Port contracts for the login audit trail.

pub mod repository;

pub use repository::{
    LoginAttemptRepository, LoginAttemptRepositoryError, LoginAttemptRepositoryResult,
};
