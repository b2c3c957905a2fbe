//! Repository port for login attempts.

use crate::login_audit::domain::{
    LoginAttempt, LoginAttemptId, LoginAttemptQuery, LoginAuditDomainError, LoginStats,
};
use crate::pagination::{Page, PageRequest};
use crate::user::domain::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for login attempt repository operations.
pub type LoginAttemptRepositoryResult<T> = Result<T, LoginAttemptRepositoryError>;

/// Append-only login attempt storage.
#[async_trait]
pub trait LoginAttemptRepository: Send + Sync {
    /// Appends an attempt.
    ///
    /// # Errors
    ///
    /// Returns [`LoginAttemptRepositoryError::DuplicateAttempt`] when the
    /// identifier already exists.
    async fn record(&self, attempt: &LoginAttempt) -> LoginAttemptRepositoryResult<()>;

    /// Lists attempts matching `query`, newest first.
    async fn list(
        &self,
        query: &LoginAttemptQuery,
        page: PageRequest,
    ) -> LoginAttemptRepositoryResult<Page<LoginAttempt>>;

    /// Aggregates attempts made at or after `since`.
    async fn stats_since(&self, since: DateTime<Utc>) -> LoginAttemptRepositoryResult<LoginStats>;

    /// Returns the account's most recent successful attempts, newest first.
    async fn recent_successes(
        &self,
        user: UserId,
        limit: usize,
    ) -> LoginAttemptRepositoryResult<Vec<LoginAttempt>>;
}

/// Errors returned by login attempt repository implementations.
#[derive(Debug, Clone, Error)]
pub enum LoginAttemptRepositoryError {
    /// An attempt with the same identifier already exists.
    #[error("duplicate login attempt identifier: {0}")]
    DuplicateAttempt(LoginAttemptId),

    /// A stored row could not be turned back into an attempt.
    #[error(transparent)]
    InvalidPersistedData(#[from] LoginAuditDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl LoginAttemptRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
