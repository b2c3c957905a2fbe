//! Reporting and account moderation across bounded contexts.

use crate::admin::domain::{
    AdminDashboard, LoginHistory, LoginHistoryStats, TaskTotals, TopUser, UserOverview, UserTasks,
};
use crate::config::AuditConfig;
use crate::login_audit::{
    domain::{LoginAttempt, LoginAttemptQuery},
    ports::{LoginAttemptRepository, LoginAttemptRepositoryError},
};
use crate::pagination::{Page, PageRequest, PageRequestError};
use crate::task::{
    domain::TaskQuery,
    ports::{TaskRepository, TaskRepositoryError, TaskScope},
};
use crate::user::{
    domain::{User, UserId},
    ports::{UserQuery, UserRepository, UserRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Service-level errors for administrative operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Account storage failed.
    #[error(transparent)]
    Users(#[from] UserRepositoryError),
    /// Task storage failed.
    #[error(transparent)]
    Tasks(#[from] TaskRepositoryError),
    /// Login attempt storage failed.
    #[error(transparent)]
    LoginAttempts(#[from] LoginAttemptRepositoryError),
    /// A page request was out of range.
    #[error(transparent)]
    Page(#[from] PageRequestError),
    /// The account does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),
    /// Administrators cannot be deleted.
    #[error("cannot delete admin user: {0}")]
    Forbidden(UserId),
}

/// Result type for administrative operations.
pub type AdminResult<T> = Result<T, AdminError>;

/// Administrative reporting and moderation.
///
/// Callers are expected to have checked that the requester is an
/// administrator.
#[derive(Clone)]
pub struct AdminService<U, T, L, C>
where
    U: UserRepository,
    T: TaskRepository,
    L: LoginAttemptRepository,
    C: Clock + Send + Sync,
{
    users: Arc<U>,
    tasks: Arc<T>,
    attempts: Arc<L>,
    clock: Arc<C>,
    settings: AuditConfig,
}

impl<U, T, L, C> AdminService<U, T, L, C>
where
    U: UserRepository,
    T: TaskRepository,
    L: LoginAttemptRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new admin service.
    #[must_use]
    pub const fn new(
        users: Arc<U>,
        tasks: Arc<T>,
        attempts: Arc<L>,
        clock: Arc<C>,
        settings: AuditConfig,
    ) -> Self {
        Self {
            users,
            tasks,
            attempts,
            clock,
            settings,
        }
    }

    /// Collects dashboard figures as of the current instant.
    ///
    /// Owners whose account no longer exists are left out of the ranking.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when any repository fails.
    pub async fn dashboard(&self) -> AdminResult<AdminDashboard> {
        let now = self.clock.utc();
        let login_stats = self
            .attempts
            .stats_since(now - self.settings.login_stats_window())
            .await?;
        let user_stats = self
            .users
            .counts(now - self.settings.recent_signup_window())
            .await?;
        let task_stats = self.tasks.status_counts(TaskScope::All, now).await?;

        let mut top_users = Vec::new();
        for counts in self.tasks.top_owners(self.settings.top_users_limit).await? {
            if let Some(user) = self.users.find_by_id(counts.owner).await? {
                top_users.push(TopUser::new(&user, counts));
            }
        }

        debug!(top_users = top_users.len(), "dashboard assembled");
        Ok(AdminDashboard {
            login_stats,
            user_stats,
            task_stats: TaskTotals::from(task_stats),
            top_users,
        })
    }

    /// Lists accounts, newest first, with their task counts.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when a repository fails.
    pub async fn list_users(
        &self,
        query: &UserQuery,
        page: PageRequest,
    ) -> AdminResult<Page<UserOverview>> {
        let now = self.clock.utc();
        let listed = self.users.list(query, page).await?;
        let total = listed.total;
        let mut overviews = Vec::with_capacity(listed.items.len());
        for user in listed.items {
            let counts = self
                .tasks
                .status_counts(TaskScope::Owner(user.id()), now)
                .await?;
            overviews.push(UserOverview {
                user,
                task_counts: TaskTotals::from(counts),
            });
        }
        Ok(Page::new(overviews, page, total))
    }

    /// Returns every task of `user_id`, newest first, with counts.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::UserNotFound`] for unknown accounts.
    pub async fn user_tasks(&self, user_id: UserId) -> AdminResult<UserTasks> {
        let now = self.clock.utc();
        let user = self.require_user(user_id).await?;
        let tasks = self
            .tasks
            .list_for_owner(user_id, &TaskQuery::new())
            .await?;
        let stats = self
            .tasks
            .status_counts(TaskScope::Owner(user_id), now)
            .await?;
        Ok(UserTasks { user, tasks, stats })
    }

    /// Returns a page of `user_id`'s login attempts with overall totals.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::UserNotFound`] for unknown accounts.
    pub async fn user_login_history(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> AdminResult<LoginHistory> {
        let user = self.require_user(user_id).await?;
        let everything = LoginAttemptQuery::new().for_user(user_id);
        let attempts = self.attempts.list(&everything, page).await?;
        let successes = LoginAttemptQuery {
            success: Some(true),
            ..everything
        };
        let successful = self
            .attempts
            .list(&successes, PageRequest::new(1, 1)?)
            .await?
            .total;

        Ok(LoginHistory {
            stats: LoginHistoryStats::from_counts(attempts.total, successful),
            user,
            attempts,
        })
    }

    /// Lists login attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::LoginAttempts`] when the repository fails.
    pub async fn login_attempts(
        &self,
        query: &LoginAttemptQuery,
        page: PageRequest,
    ) -> AdminResult<Page<LoginAttempt>> {
        Ok(self.attempts.list(query, page).await?)
    }

    /// Activates or deactivates an account.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::UserNotFound`] for unknown accounts.
    pub async fn set_user_active(&self, user_id: UserId, active: bool) -> AdminResult<User> {
        let now = self.clock.utc();
        let mut user = self.require_user(user_id).await?;
        if user.set_active(active, now) {
            self.users.update(&user).await?;
            info!(%user_id, active, "account status changed");
        }
        Ok(user)
    }

    /// Deletes an account and every task it owns. Returns the number of
    /// deleted tasks.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Forbidden`] for administrators and
    /// [`AdminError::UserNotFound`] for unknown accounts.
    pub async fn delete_user(&self, user_id: UserId) -> AdminResult<u64> {
        let user = self.require_user(user_id).await?;
        if user.is_admin() {
            return Err(AdminError::Forbidden(user_id));
        }
        let deleted_tasks = self.tasks.delete_by_owner(user_id).await?;
        self.users.delete(user_id).await?;
        info!(%user_id, deleted_tasks, "account deleted");
        Ok(deleted_tasks)
    }

    async fn require_user(&self, user_id: UserId) -> AdminResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AdminError::UserNotFound(user_id))
    }
}
