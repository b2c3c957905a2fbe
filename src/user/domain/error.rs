//! Error types for user domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing or reconstructing user values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserDomainError {
    /// Username length is outside the accepted range.
    #[error("username must be between {min} and {max} characters")]
    InvalidUsername {
        /// Minimum number of characters.
        min: usize,
        /// Maximum number of characters.
        max: usize,
    },

    /// Email address is malformed.
    #[error("please enter a valid email: {0}")]
    InvalidEmail(String),

    /// Password is shorter than the accepted minimum.
    #[error("password must be at least {min} characters long")]
    PasswordTooShort {
        /// Minimum number of characters.
        min: usize,
    },

    /// A Google subject identifier is blank.
    #[error("google subject must not be empty")]
    EmptyGoogleSubject,

    /// A persisted account lacks the credentials its provider requires.
    #[error("{provider} account is missing its {missing}")]
    MissingCredentials {
        /// Provider of the rejected account.
        provider: &'static str,
        /// Name of the missing credential.
        missing: &'static str,
    },
}

/// Error returned while parsing user roles.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

/// Error returned while parsing authentication providers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown auth provider: {0}")]
pub struct ParseAuthProviderError(pub String);
