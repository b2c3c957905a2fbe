//! Repository port for task persistence, lookup, and timer coordination.

use crate::task::domain::{
    ChangedTask, OwnerTaskCounts, Task, TaskChange, TaskDomainError, TaskId, TaskQuery,
    TaskStatusCounts,
};
use crate::user::domain::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Selects which tasks an aggregate count covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    /// Tasks of a single owner.
    Owner(UserId),
    /// Every task in the store.
    All,
}

impl TaskScope {
    /// Returns `true` when `task` falls inside the scope.
    #[must_use]
    pub fn contains(self, task: &Task) -> bool {
        match self {
            Self::Owner(owner) => task.owner() == owner,
            Self::All => true,
        }
    }
}

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier regardless of owner.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Finds a task by identifier when it belongs to `owner`.
    ///
    /// Returns `None` both for missing tasks and for tasks of other owners.
    async fn find_for_owner(&self, id: TaskId, owner: UserId)
    -> TaskRepositoryResult<Option<Task>>;

    /// Lists the owner's tasks that match `query`, in the requested order.
    async fn list_for_owner(
        &self,
        owner: UserId,
        query: &TaskQuery,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()>;

    /// Deletes every task of `owner` and returns how many were removed.
    async fn delete_by_owner(&self, owner: UserId) -> TaskRepositoryResult<u64>;

    /// Applies `change` to each of `ids` that belongs to `owner`, at `now`.
    ///
    /// The change is computed against the stored state of all of the owner's
    /// tasks and written back as one serialised unit per owner: either every
    /// modified task is persisted or none is. When the change starts a timer,
    /// the owner's other running timers are stopped in the same unit.
    /// Identifiers that are missing or owned by someone else are skipped, so
    /// the result holds one entry per matching identifier, in request order.
    async fn apply_change(
        &self,
        owner: UserId,
        ids: &[TaskId],
        change: &TaskChange,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<ChangedTask>>;

    /// Stores the new `task` and applies `change` to it in the same
    /// serialised unit as [`TaskRepository::apply_change`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists; nothing is written then.
    async fn store_with_change(
        &self,
        task: &Task,
        change: &TaskChange,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<ChangedTask>;

    /// Counts tasks in `scope` by status; open tasks due before `now` count as
    /// overdue.
    async fn status_counts(
        &self,
        scope: TaskScope,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<TaskStatusCounts>;

    /// Returns up to `limit` owners with the most tasks, largest first.
    async fn top_owners(&self, limit: usize) -> TaskRepositoryResult<Vec<OwnerTaskCounts>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A stored row could not be turned back into a task.
    #[error(transparent)]
    InvalidPersistedData(#[from] TaskDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
