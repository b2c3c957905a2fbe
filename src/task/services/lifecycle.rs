//! Service layer for task creation, editing, and time tracking.

use crate::task::{
    domain::{
        ChangedTask, Task, TaskAssignee, TaskCategory, TaskChange, TaskDescription, TaskDetails,
        TaskDomainError, TaskDraft, TaskId, TaskPatch, TaskPriority, TaskQuery, TaskStatus,
        TaskStatusCounts, TaskTag, TaskTiming, TaskTitle,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskScope},
};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    category: Option<String>,
    assignee: Option<String>,
    tags: Vec<String>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    due_date: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            category: None,
            assignee: None,
            tags: Vec::new(),
            status: None,
            priority: None,
            due_date: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Sets the initial status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    fn into_draft(self, owner: UserId) -> Result<TaskDraft, TaskDomainError> {
        let mut details = TaskDetails::new(TaskTitle::new(&self.title)?)
            .with_tags(TaskTag::parse_all(&self.tags)?);
        if let Some(description) = self.description {
            details = details.with_description(TaskDescription::new(description)?);
        }
        if let Some(category) = self.category {
            details = details.with_category(TaskCategory::new(category)?);
        }
        if let Some(assignee) = self.assignee {
            details = details.with_assignee(TaskAssignee::new(assignee)?);
        }

        let mut draft = TaskDraft::new(owner, details);
        if let Some(status) = self.status {
            draft = draft.with_status(status);
        }
        if let Some(priority) = self.priority {
            draft = draft.with_priority(priority);
        }
        if let Some(due_date) = self.due_date {
            draft = draft.with_due_date(due_date);
        }
        Ok(draft)
    }
}

/// Request payload for editing tasks.
///
/// Text fields arrive unvalidated and are checked when the request is
/// converted into a [`TaskPatch`]. Blank optional text clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    title: Option<String>,
    description: Option<String>,
    category: Option<String>,
    assignee: Option<String>,
    tags: Option<Vec<String>>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    due_date: Option<Option<DateTime<Utc>>>,
}

impl UpdateTaskRequest {
    /// Creates an empty update request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description; blank clears it.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the category; blank clears it.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the assignee; blank clears it.
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Replaces the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = Some(tags.into_iter().collect());
        self
    }

    /// Requests a status change.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets or clears the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Validates the request into a domain patch.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when a field fails validation.
    pub fn into_patch(self) -> Result<TaskPatch, TaskDomainError> {
        let mut patch = TaskPatch::new();
        if let Some(title) = self.title {
            patch = patch.with_title(TaskTitle::new(title)?);
        }
        if let Some(description) = self.description {
            patch = patch.with_description(clearable(description, TaskDescription::new)?);
        }
        if let Some(category) = self.category {
            patch = patch.with_category(clearable(category, TaskCategory::new)?);
        }
        if let Some(assignee) = self.assignee {
            patch = patch.with_assignee(clearable(assignee, TaskAssignee::new)?);
        }
        if let Some(tags) = self.tags {
            patch = patch.with_tags(TaskTag::parse_all(tags)?);
        }
        if let Some(status) = self.status {
            patch = patch.with_status(status);
        }
        if let Some(priority) = self.priority {
            patch = patch.with_priority(priority);
        }
        if let Some(due_date) = self.due_date {
            patch = patch.with_due_date(due_date);
        }
        Ok(patch)
    }
}

fn clearable<T>(
    raw: String,
    parse: impl FnOnce(String) -> Result<T, TaskDomainError>,
) -> Result<Option<T>, TaskDomainError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse(raw).map(Some)
}

/// A task together with its timing values at the instant it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    /// The stored task.
    pub task: Task,
    /// Values derived at read time.
    pub timing: TaskTiming,
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// The task does not exist or belongs to another owner.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// A bulk update named no tasks.
    #[error("bulk update requires at least one task identifier")]
    EmptyBulkSelection,
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Every operation samples the clock once and uses that instant for all of
/// its computations.
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates a task for `owner`.
    ///
    /// A request status other than `todo` is applied as a status change, so
    /// creating a task `in-progress` starts its timer and stops any other
    /// running timer of the owner. The new task and the timer switch are
    /// stored together; when either fails nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when input validation fails or the
    /// repository rejects persistence.
    pub async fn create(
        &self,
        owner: UserId,
        request: CreateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let draft = request.into_draft(owner)?;
        let now = self.clock.utc();
        let starts_timer = draft.status == TaskStatus::InProgress;
        let initial = if starts_timer {
            draft.with_status(TaskStatus::Todo)
        } else {
            draft
        };
        let created = Task::create(initial, now);
        let task = if starts_timer {
            self.repository
                .store_with_change(&created, &TaskChange::StartTimer, now)
                .await?
                .task
        } else {
            self.repository.store(&created).await?;
            created
        };
        info!(%owner, task_id = %task.id(), status = %task.status(), "task created");
        Ok(task)
    }

    /// Returns one of the owner's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task is missing or
    /// belongs to another owner.
    pub async fn get(&self, owner: UserId, id: TaskId) -> TaskLifecycleResult<Task> {
        self.owned(owner, id).await
    }

    /// Returns one of the owner's tasks with its timing values.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task is missing or
    /// belongs to another owner.
    pub async fn view(&self, owner: UserId, id: TaskId) -> TaskLifecycleResult<TaskView> {
        let now = self.clock.utc();
        let task = self.owned(owner, id).await?;
        let timing = task.timing(now);
        Ok(TaskView { task, timing })
    }

    /// Lists the owner's tasks matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn list(&self, owner: UserId, query: &TaskQuery) -> TaskLifecycleResult<Vec<Task>> {
        let tasks = self.repository.list_for_owner(owner, query).await?;
        debug!(%owner, count = tasks.len(), "listed tasks");
        Ok(tasks)
    }

    /// Applies an edit to one of the owner's tasks.
    ///
    /// A status in the request only triggers timer bookkeeping when it
    /// differs from the stored status. Moving into `in-progress` stops any
    /// other running timer of the owner. The edit is applied to the stored
    /// task inside the repository's per-owner unit, so fields and timer
    /// state are written together.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for foreign or missing tasks,
    /// [`TaskLifecycleError::Domain`] for invalid fields, or
    /// [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn update(
        &self,
        owner: UserId,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let patch = request.into_patch()?;
        let ChangedTask { task, changed } = self
            .change_one(owner, id, &TaskChange::Edit(patch))
            .await?;
        if changed {
            info!(%owner, task_id = %id, status = %task.status(), "task updated");
        }
        Ok(task)
    }

    /// Deletes one of the owner's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for foreign or missing tasks.
    pub async fn delete(&self, owner: UserId, id: TaskId) -> TaskLifecycleResult<()> {
        self.owned(owner, id).await?;
        self.repository.delete(id).await?;
        info!(%owner, task_id = %id, "task deleted");
        Ok(())
    }

    /// Counts the owner's tasks by status, including overdue ones.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the query fails.
    pub async fn stats(&self, owner: UserId) -> TaskLifecycleResult<TaskStatusCounts> {
        let now = self.clock.utc();
        Ok(self
            .repository
            .status_counts(TaskScope::Owner(owner), now)
            .await?)
    }

    /// Applies the same edit to several of the owner's tasks.
    ///
    /// Identifiers that are missing or owned by someone else are skipped.
    /// The whole batch is written as one unit. Returns the number of tasks
    /// that changed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::EmptyBulkSelection`] when `ids` is
    /// empty, [`TaskLifecycleError::Domain`] for invalid fields, or
    /// [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn bulk_update(
        &self,
        owner: UserId,
        ids: &[TaskId],
        request: UpdateTaskRequest,
    ) -> TaskLifecycleResult<u64> {
        if ids.is_empty() {
            return Err(TaskLifecycleError::EmptyBulkSelection);
        }
        let patch = request.into_patch()?;
        let now = self.clock.utc();

        let results = self
            .repository
            .apply_change(owner, ids, &TaskChange::Edit(patch), now)
            .await?;
        let changed = results.iter().filter(|result| result.changed).count();
        let modified = u64::try_from(changed).map_err(TaskRepositoryError::persistence)?;
        info!(%owner, requested = ids.len(), modified, "bulk task update");
        Ok(modified)
    }

    /// Starts the timer of one of the owner's tasks.
    ///
    /// Any other running timer of the owner is stopped first, with its
    /// elapsed minutes added to that task's tracked time.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for foreign or missing tasks
    /// or [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn start_timer(&self, owner: UserId, id: TaskId) -> TaskLifecycleResult<Task> {
        let started = self.change_one(owner, id, &TaskChange::StartTimer).await?;
        info!(%owner, task_id = %id, "timer started");
        Ok(started.task)
    }

    /// Stops the timer of one of the owner's tasks.
    ///
    /// Stopping a task whose timer is not running succeeds and changes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for foreign or missing tasks
    /// or [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn stop_timer(&self, owner: UserId, id: TaskId) -> TaskLifecycleResult<Task> {
        let ChangedTask { task, changed } =
            self.change_one(owner, id, &TaskChange::StopTimer).await?;
        if changed {
            info!(%owner, task_id = %id, time_spent = task.time_spent().value(), "timer stopped");
        }
        Ok(task)
    }

    async fn change_one(
        &self,
        owner: UserId,
        id: TaskId,
        change: &TaskChange,
    ) -> TaskLifecycleResult<ChangedTask> {
        let now = self.clock.utc();
        self.repository
            .apply_change(owner, &[id], change, now)
            .await?
            .into_iter()
            .next()
            .ok_or(TaskLifecycleError::NotFound(id))
    }

    async fn owned(&self, owner: UserId, id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_for_owner(id, owner)
            .await?
            .ok_or(TaskLifecycleError::NotFound(id))
    }
}
