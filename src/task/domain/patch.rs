//! Partial field updates for existing tasks.

use super::{
    TaskAssignee, TaskCategory, TaskDescription, TaskPriority, TaskStatus, TaskTag, TaskTitle,
};
use chrono::{DateTime, Utc};

/// Field-level changes to apply to a task.
///
/// `None` leaves a field untouched. Clearable fields use a nested option
/// where `Some(None)` removes the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New title.
    pub title: Option<TaskTitle>,
    /// New or cleared description.
    pub description: Option<Option<TaskDescription>>,
    /// New or cleared category.
    pub category: Option<Option<TaskCategory>>,
    /// New or cleared assignee.
    pub assignee: Option<Option<TaskAssignee>>,
    /// Replacement tag list.
    pub tags: Option<Vec<TaskTag>>,
    /// Requested status.
    pub status: Option<TaskStatus>,
    /// New priority.
    pub priority: Option<TaskPriority>,
    /// New or cleared due date.
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: TaskTitle) -> Self {
        self.title = Some(title);
        self
    }

    /// Sets or clears the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<TaskDescription>) -> Self {
        self.description = Some(description);
        self
    }

    /// Sets or clears the category.
    #[must_use]
    pub fn with_category(mut self, category: Option<TaskCategory>) -> Self {
        self.category = Some(category);
        self
    }

    /// Sets or clears the assignee.
    #[must_use]
    pub fn with_assignee(mut self, assignee: Option<TaskAssignee>) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Replaces the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = TaskTag>) -> Self {
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
}
