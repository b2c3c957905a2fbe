//! Task aggregate root and its lifecycle transitions.

use super::{
    TaskDetails, TaskDomainError, TaskId, TaskPatch, TaskPriority, TaskStatus, TimerState,
    TrackedMinutes, elapsed_minutes,
};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Parameter object for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Owning user.
    pub owner: UserId,
    /// Descriptive fields.
    pub details: TaskDetails,
    /// Initial status; `todo` unless the caller asks otherwise.
    pub status: TaskStatus,
    /// Initial priority.
    pub priority: TaskPriority,
    /// Optional due date, past or future.
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskDraft {
    /// Creates a draft with default status and priority.
    #[must_use]
    pub fn new(owner: UserId, details: TaskDetails) -> Self {
        Self {
            owner,
            details,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date: None,
        }
    }

    /// Sets the initial status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Task aggregate root.
///
/// `status` and `timer` are kept private so that a completed timer always
/// pairs with the `completed` status and a running timer always pairs with
/// `in-progress`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    id: TaskId,
    owner: UserId,
    details: TaskDetails,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: Option<DateTime<Utc>>,
    time_spent: TrackedMinutes,
    timer: TimerState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owner.
    pub owner: UserId,
    /// Persisted descriptive fields.
    pub details: TaskDetails,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted priority.
    pub priority: TaskPriority,
    /// Persisted due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Persisted accumulated minutes.
    pub time_spent: TrackedMinutes,
    /// Persisted timer state.
    pub timer: TimerState,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task at `now`.
    ///
    /// The task starts as `todo` with no tracked time; a non-default draft
    /// status is then applied as an ordinary status change, so creating a
    /// task directly `in-progress` starts its timer.
    #[must_use]
    pub fn create(draft: TaskDraft, now: DateTime<Utc>) -> Self {
        let TaskDraft {
            owner,
            details,
            status,
            priority,
            due_date,
        } = draft;

        let mut task = Self {
            id: TaskId::new(),
            owner,
            details,
            status: TaskStatus::Todo,
            priority,
            due_date,
            time_spent: TrackedMinutes::ZERO,
            timer: TimerState::Idle,
            created_at: now,
            updated_at: now,
        };
        task.apply_status_change(status, now);
        task
    }

    /// Reconstructs a task from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InconsistentTimerState`] when the persisted
    /// status and timer contradict each other.
    pub fn from_persisted(data: PersistedTaskData) -> Result<Self, TaskDomainError> {
        let consistent = match data.timer {
            TimerState::Idle => !data.status.is_completed(),
            TimerState::Running { .. } => data.status == TaskStatus::InProgress,
            TimerState::Completed { .. } => data.status.is_completed(),
        };
        if !consistent {
            return Err(TaskDomainError::InconsistentTimerState {
                task_id: data.id,
                reason: "status does not match timer state",
            });
        }

        Ok(Self {
            id: data.id,
            owner: data.owner,
            details: data.details,
            status: data.status,
            priority: data.priority,
            due_date: data.due_date,
            time_spent: data.time_spent,
            timer: data.timer,
            created_at: data.created_at,
            updated_at: data.updated_at,
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the descriptive fields.
    #[must_use]
    pub const fn details(&self) -> &TaskDetails {
        &self.details
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns minutes accumulated across finished sessions.
    #[must_use]
    pub const fn time_spent(&self) -> TrackedMinutes {
        self.time_spent
    }

    /// Returns the timer state.
    #[must_use]
    pub const fn timer(&self) -> TimerState {
        self.timer
    }

    /// Returns `true` while a timer session is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.timer.is_active()
    }

    /// Returns the start of the running session, if any.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.timer.started_at()
    }

    /// Returns the completion instant, if any.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.timer.completed_at()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Reacts to a status change requested at `now`.
    ///
    /// Setting the current status again changes nothing and returns `false`.
    /// Otherwise:
    ///
    /// - `completed` flushes a running session and records `now` as the
    ///   completion instant;
    /// - `in-progress` starts a session at `now` unless one is running and
    ///   drops any completion marker;
    /// - `todo` flushes a running session and drops any completion marker.
    pub fn apply_status_change(&mut self, new_status: TaskStatus, now: DateTime<Utc>) -> bool {
        if new_status == self.status {
            return false;
        }

        match new_status {
            TaskStatus::Completed => {
                self.flush(now);
                self.timer = TimerState::Completed { at: now };
            }
            TaskStatus::InProgress => {
                if !self.timer.is_active() {
                    self.timer = TimerState::Running { since: now };
                }
            }
            TaskStatus::Todo => {
                self.flush(now);
                self.timer = TimerState::Idle;
            }
        }

        self.status = new_status;
        self.touch(now);
        true
    }

    /// Starts a fresh timer session at `now`.
    ///
    /// A session that is already running is flushed first. The task moves to
    /// `in-progress`, reopening it if it was completed. Returns the minutes
    /// flushed from a previous session.
    pub fn start_timer(&mut self, now: DateTime<Utc>) -> TrackedMinutes {
        let flushed = self.flush(now);
        self.status = TaskStatus::InProgress;
        self.timer = TimerState::Running { since: now };
        self.touch(now);
        flushed
    }

    /// Stops the running session at `now`, adding its whole minutes to the
    /// tracked time.
    ///
    /// Stopping an idle or completed task changes nothing. Returns the
    /// minutes flushed.
    pub fn stop_timer(&mut self, now: DateTime<Utc>) -> TrackedMinutes {
        if !self.timer.is_active() {
            return TrackedMinutes::ZERO;
        }
        let flushed = self.flush(now);
        self.touch(now);
        flushed
    }

    /// Applies a field patch at `now`.
    ///
    /// A status in the patch is routed through
    /// [`Self::apply_status_change`]. Returns `true` when any field changed.
    pub fn apply_patch(&mut self, patch: TaskPatch, now: DateTime<Utc>) -> bool {
        let TaskPatch {
            title,
            description,
            category,
            assignee,
            tags,
            status,
            priority,
            due_date,
        } = patch;

        let mut changed = false;
        changed |= replace_if_different(&mut self.details.title, title);
        changed |= replace_if_different(&mut self.details.description, description);
        changed |= replace_if_different(&mut self.details.category, category);
        changed |= replace_if_different(&mut self.details.assignee, assignee);
        changed |= replace_if_different(&mut self.details.tags, tags);
        changed |= replace_if_different(&mut self.priority, priority);
        changed |= replace_if_different(&mut self.due_date, due_date);

        if changed {
            self.touch(now);
        }
        if let Some(new_status) = status {
            changed |= self.apply_status_change(new_status, now);
        }
        changed
    }

    /// Moves a running session's elapsed minutes into `time_spent` and
    /// leaves the timer idle. Other timer states are untouched.
    fn flush(&mut self, now: DateTime<Utc>) -> TrackedMinutes {
        let TimerState::Running { since } = self.timer else {
            return TrackedMinutes::ZERO;
        };
        let elapsed = elapsed_minutes(since, now);
        self.time_spent = self.time_spent.saturating_add(elapsed);
        self.timer = TimerState::Idle;
        elapsed
    }

    /// Updates the `updated_at` timestamp to the operation instant.
    const fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Replaces `field` with `candidate` when present and different.
fn replace_if_different<T: PartialEq>(field: &mut T, candidate: Option<T>) -> bool {
    match candidate {
        Some(value) if *field != value => {
            *field = value;
            true
        }
        _ => false,
    }
}
