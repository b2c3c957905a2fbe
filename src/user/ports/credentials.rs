//! Ports for password hashing, access tokens, and external identity proofs.

use crate::user::domain::{PasswordDigest, PlainPassword, UserId, VerifiedIdentity};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failure inside a credential hasher.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("credential hashing failed: {0}")]
pub struct CredentialHashError(pub String);

/// One-way password hashing.
pub trait CredentialHasher: Send + Sync {
    /// Hashes a password with a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialHashError`] when the hasher fails.
    fn hash(&self, password: &PlainPassword) -> Result<PasswordDigest, CredentialHashError>;

    /// Checks a candidate password against a stored digest.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialHashError`] when the digest cannot be parsed.
    fn verify(
        &self,
        digest: &PasswordDigest,
        candidate: &PlainPassword,
    ) -> Result<bool, CredentialHashError>;
}

/// Signed bearer token handed to a client after authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// Encoded token.
    pub token: String,
    /// Instant after which the token is rejected.
    pub expires_at: DateTime<Utc>,
}

/// Errors raised while issuing or checking access tokens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The token is past its expiry.
    #[error("token expired")]
    Expired,
    /// The token is malformed, tampered with, or signed with another key.
    #[error("invalid token: {0}")]
    Invalid(String),
    /// The token could not be produced.
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Issues and checks access tokens.
pub trait TokenIssuer: Send + Sync {
    /// Issues a token for `user` valid from `now`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] when encoding fails.
    fn issue(&self, user: UserId, now: DateTime<Utc>) -> Result<AccessToken, TokenError>;

    /// Checks `token` at `now` and returns the user it was issued for.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Expired`] or [`TokenError::Invalid`].
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError>;
}

/// Error returned when an ID token cannot be verified.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("identity token rejected: {0}")]
pub struct IdentityError(pub String);

/// Verifies Google or Firebase ID tokens.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verifies `id_token` and returns the identity it asserts.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] for any token that fails verification.
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, IdentityError>;
}
