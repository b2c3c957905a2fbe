//! Repository port for user account persistence.

use crate::pagination::{Page, PageRequest};
use crate::user::domain::{
    AuthProvider, EmailAddress, GoogleSubject, User, UserDomainError, UserId, Username,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user repository operations.
pub type UserRepositoryResult<T> = Result<T, UserRepositoryError>;

/// Filters for administrative user listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    /// Case-insensitive substring matched against username, email, or name.
    pub search: Option<String>,
    /// Only accounts of this provider.
    pub provider: Option<AuthProvider>,
    /// Only active or only inactive accounts.
    pub active: Option<bool>,
}

impl UserQuery {
    /// Returns `true` when `user` passes every filter.
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        let search_hit = self.search.as_deref().is_none_or(|needle| {
            let lowered = needle.to_lowercase();
            let contains = |hay: &str| hay.to_lowercase().contains(&lowered);
            user.username().is_some_and(|name| contains(name.as_str()))
                || contains(user.email().as_str())
                || user.name().is_some_and(contains)
        });
        search_hit
            && self.provider.is_none_or(|provider| user.provider() == provider)
            && self.active.is_none_or(|active| user.is_active() == active)
    }
}

/// Account totals for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserCounts {
    /// All accounts.
    pub total: u64,
    /// Accounts allowed to sign in.
    pub active: u64,
    /// Google accounts.
    pub google: u64,
    /// Password accounts.
    pub local: u64,
    /// Accounts created at or after the requested instant.
    pub recent_signups: u64,
}

/// User persistence contract.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user.
    ///
    /// # Errors
    ///
    /// Returns a `Duplicate*` variant when the email, username, or Google
    /// subject is already taken.
    async fn store(&self, user: &User) -> UserRepositoryResult<()>;

    /// Persists changes to an existing user.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::NotFound`] when the user does not exist
    /// or a `Duplicate*` variant when a unique field collides.
    async fn update(&self, user: &User) -> UserRepositoryResult<()>;

    /// Finds a user by identifier.
    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>>;

    /// Finds a user by normalised email.
    async fn find_by_email(&self, email: &EmailAddress) -> UserRepositoryResult<Option<User>>;

    /// Finds a user by exact username.
    async fn find_by_username(&self, username: &Username) -> UserRepositoryResult<Option<User>>;

    /// Finds a user whose email or username equals `identifier`.
    async fn find_by_identifier(&self, identifier: &str) -> UserRepositoryResult<Option<User>>;

    /// Finds a user by Google subject.
    async fn find_by_google_subject(
        &self,
        subject: &GoogleSubject,
    ) -> UserRepositoryResult<Option<User>>;

    /// Deletes a user.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::NotFound`] when the user does not exist.
    async fn delete(&self, id: UserId) -> UserRepositoryResult<()>;

    /// Lists users matching `query`, newest first.
    async fn list(&self, query: &UserQuery, page: PageRequest)
    -> UserRepositoryResult<Page<User>>;

    /// Counts accounts; `recent_since` bounds the recent sign-up tally.
    async fn counts(&self, recent_since: DateTime<Utc>) -> UserRepositoryResult<UserCounts>;
}

/// Errors returned by user repository implementations.
#[derive(Debug, Clone, Error)]
pub enum UserRepositoryError {
    /// Another account already uses the email.
    #[error("user with this email already exists: {0}")]
    DuplicateEmail(EmailAddress),

    /// Another account already uses the username.
    #[error("user with this username already exists: {0}")]
    DuplicateUsername(Username),

    /// Another account is already linked to the Google subject.
    #[error("google account already linked: {}", .0.as_str())]
    DuplicateGoogleSubject(GoogleSubject),

    /// The user was not found.
    #[error("user not found: {0}")]
    NotFound(UserId),

    /// A stored row could not be turned back into a user.
    #[error(transparent)]
    InvalidPersistedData(#[from] UserDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
