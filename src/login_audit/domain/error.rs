//! Error types for login audit values.

use thiserror::Error;

/// Errors returned while constructing or reconstructing login attempts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoginAuditDomainError {
    /// The attempted identifier is blank.
    #[error("login attempt email is required")]
    EmptyEmail,

    /// A stored login method is not recognised.
    #[error("unknown login method: {0}")]
    UnknownLoginMethod(String),
}
