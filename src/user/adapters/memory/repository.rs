//! In-memory repository for user accounts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::pagination::{Page, PageRequest};
use crate::user::{
    domain::{AuthProvider, EmailAddress, GoogleSubject, User, UserId, Username},
    ports::{UserCounts, UserQuery, UserRepository, UserRepositoryError, UserRepositoryResult},
};

/// Thread-safe in-memory user repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    state: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> UserRepositoryResult<RwLockReadGuard<'_, HashMap<UserId, User>>> {
        self.state.read().map_err(|err| {
            UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> UserRepositoryResult<RwLockWriteGuard<'_, HashMap<UserId, User>>> {
        self.state.write().map_err(|err| {
            UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn find_where(
        &self,
        predicate: impl Fn(&User) -> bool,
    ) -> UserRepositoryResult<Option<User>> {
        let users = self.read()?;
        Ok(users.values().find(|user| predicate(user)).cloned())
    }
}

/// Rejects `candidate` when another stored account shares a unique field.
fn check_unique(users: &HashMap<UserId, User>, candidate: &User) -> UserRepositoryResult<()> {
    for other in users.values().filter(|other| other.id() != candidate.id()) {
        if other.email() == candidate.email() {
            return Err(UserRepositoryError::DuplicateEmail(candidate.email().clone()));
        }
        if let Some(username) = candidate.username()
            && other.username() == Some(username)
        {
            return Err(UserRepositoryError::DuplicateUsername(username.clone()));
        }
        if let Some(subject) = candidate.google_subject()
            && other.google_subject() == Some(subject)
        {
            return Err(UserRepositoryError::DuplicateGoogleSubject(subject.clone()));
        }
    }
    Ok(())
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn store(&self, user: &User) -> UserRepositoryResult<()> {
        let mut users = self.write()?;
        check_unique(&users, user)?;
        users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> UserRepositoryResult<()> {
        let mut users = self.write()?;
        if !users.contains_key(&user.id()) {
            return Err(UserRepositoryError::NotFound(user.id()));
        }
        check_unique(&users, user)?;
        users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> UserRepositoryResult<Option<User>> {
        self.find_where(|user| user.email() == email)
    }

    async fn find_by_username(&self, username: &Username) -> UserRepositoryResult<Option<User>> {
        self.find_where(|user| user.username() == Some(username))
    }

    async fn find_by_identifier(&self, identifier: &str) -> UserRepositoryResult<Option<User>> {
        let trimmed = identifier.trim();
        let lowered = trimmed.to_lowercase();
        self.find_where(|user| {
            user.email().as_str() == lowered
                || user.username().is_some_and(|name| name.as_str() == trimmed)
        })
    }

    async fn find_by_google_subject(
        &self,
        subject: &GoogleSubject,
    ) -> UserRepositoryResult<Option<User>> {
        self.find_where(|user| user.google_subject() == Some(subject))
    }

    async fn delete(&self, id: UserId) -> UserRepositoryResult<()> {
        self.write()?
            .remove(&id)
            .map(|_| ())
            .ok_or(UserRepositoryError::NotFound(id))
    }

    async fn list(
        &self,
        query: &UserQuery,
        page: PageRequest,
    ) -> UserRepositoryResult<Page<User>> {
        let users = self.read()?;
        let mut matching: Vec<User> = users
            .values()
            .filter(|user| query.matches(user))
            .cloned()
            .collect();
        matching.sort_by(|left, right| {
            right
                .created_at()
                .cmp(&left.created_at())
                .then(left.id().cmp(&right.id()))
        });
        Ok(page.slice(matching))
    }

    async fn counts(&self, recent_since: DateTime<Utc>) -> UserRepositoryResult<UserCounts> {
        let users = self.read()?;
        let mut counts = UserCounts::default();
        for user in users.values() {
            counts.total += 1;
            if user.is_active() {
                counts.active += 1;
            }
            match user.provider() {
                AuthProvider::Google => counts.google += 1,
                AuthProvider::Local => counts.local += 1,
            }
            if user.created_at() >= recent_since {
                counts.recent_signups += 1;
            }
        }
        Ok(counts)
    }
}
