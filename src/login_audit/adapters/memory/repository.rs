//! In-memory login attempt repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use crate::login_audit::{
    domain::{LoginAttempt, LoginAttemptQuery, LoginStats},
    ports::{LoginAttemptRepository, LoginAttemptRepositoryError, LoginAttemptRepositoryResult},
};
use crate::pagination::{Page, PageRequest};
use crate::user::domain::UserId;

/// Thread-safe in-memory login attempt log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoginAttemptRepository {
    attempts: Arc<RwLock<Vec<LoginAttempt>>>,
}

impl InMemoryLoginAttemptRepository {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> LoginAttemptRepositoryResult<RwLockReadGuard<'_, Vec<LoginAttempt>>> {
        self.attempts.read().map_err(|err| {
            LoginAttemptRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    /// Returns matching attempts newest first.
    fn newest_first(
        &self,
        keep: impl Fn(&LoginAttempt) -> bool,
    ) -> LoginAttemptRepositoryResult<Vec<LoginAttempt>> {
        let attempts = self.read()?;
        let mut matching: Vec<LoginAttempt> =
            attempts.iter().filter(|attempt| keep(attempt)).cloned().collect();
        matching.sort_by(|left, right| {
            right
                .created_at()
                .cmp(&left.created_at())
                .then(right.id().cmp(&left.id()))
        });
        Ok(matching)
    }
}

#[async_trait]
impl LoginAttemptRepository for InMemoryLoginAttemptRepository {
    async fn record(&self, attempt: &LoginAttempt) -> LoginAttemptRepositoryResult<()> {
        let mut attempts = self.attempts.write().map_err(|err| {
            LoginAttemptRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if attempts.iter().any(|stored| stored.id() == attempt.id()) {
            return Err(LoginAttemptRepositoryError::DuplicateAttempt(attempt.id()));
        }
        attempts.push(attempt.clone());
        Ok(())
    }

    async fn list(
        &self,
        query: &LoginAttemptQuery,
        page: PageRequest,
    ) -> LoginAttemptRepositoryResult<Page<LoginAttempt>> {
        let matching = self.newest_first(|attempt| query.matches(attempt))?;
        Ok(page.slice(matching))
    }

    async fn stats_since(&self, since: DateTime<Utc>) -> LoginAttemptRepositoryResult<LoginStats> {
        let attempts = self.read()?;
        let window: Vec<&LoginAttempt> = attempts
            .iter()
            .filter(|attempt| attempt.created_at() >= since)
            .collect();
        let successful = window.iter().filter(|attempt| attempt.success()).count();
        let unique: HashSet<&str> = window.iter().map(|attempt| attempt.email()).collect();

        let to_count =
            |value: usize| u64::try_from(value).map_err(LoginAttemptRepositoryError::persistence);
        Ok(LoginStats::from_counts(
            to_count(window.len())?,
            to_count(successful)?,
            to_count(unique.len())?,
        ))
    }

    async fn recent_successes(
        &self,
        user: UserId,
        limit: usize,
    ) -> LoginAttemptRepositoryResult<Vec<LoginAttempt>> {
        let mut matching = self.newest_first(|attempt| {
            attempt.success() && attempt.user_id() == Some(user)
        })?;
        matching.truncate(limit);
        Ok(matching)
    }
}
