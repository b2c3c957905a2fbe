//! Listing filters, ordering, and aggregate counts for tasks.

use super::{ParseTaskSortError, Task, TaskCategory, TaskPriority, TaskStatus};
use crate::rates::percentage;
use crate::user::domain::UserId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Field used to order task listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSortKey {
    /// Creation timestamp.
    #[default]
    CreatedAt,
    /// Latest mutation timestamp.
    UpdatedAt,
    /// Due date; tasks without one sort last in ascending order.
    DueDate,
    /// Priority (`low` < `medium` < `high`).
    Priority,
    /// Title, lexicographically.
    Title,
    /// Status in workflow order.
    Status,
}

impl TaskSortKey {
    /// Returns the canonical query-string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
            Self::DueDate => "dueDate",
            Self::Priority => "priority",
            Self::Title => "title",
            Self::Status => "status",
        }
    }
}

impl TryFrom<&str> for TaskSortKey {
    type Error = ParseTaskSortError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "createdAt" | "created_at" => Ok(Self::CreatedAt),
            "updatedAt" | "updated_at" => Ok(Self::UpdatedAt),
            "dueDate" | "due_date" => Ok(Self::DueDate),
            "priority" => Ok(Self::Priority),
            "title" => Ok(Self::Title),
            "status" => Ok(Self::Status),
            _ => Err(ParseTaskSortError(value.to_owned())),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Smallest first.
    Asc,
    /// Largest first.
    #[default]
    Desc,
}

impl TryFrom<&str> for SortOrder {
    type Error = ParseTaskSortError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ParseTaskSortError(value.to_owned())),
        }
    }
}

/// Filters and ordering for an owner's task listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Only tasks with this status.
    pub status: Option<TaskStatus>,
    /// Only tasks with this priority.
    pub priority: Option<TaskPriority>,
    /// Only tasks in this category.
    pub category: Option<TaskCategory>,
    /// Ordering field.
    pub sort: TaskSortKey,
    /// Ordering direction.
    pub order: SortOrder,
}

impl TaskQuery {
    /// Creates an unfiltered query ordered by creation time, newest first.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filters by priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Filters by category.
    #[must_use]
    pub fn with_category(mut self, category: TaskCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Sets the ordering.
    #[must_use]
    pub const fn sorted_by(mut self, sort: TaskSortKey, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }

    /// Returns `true` when `task` passes every filter.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|status| task.status() == status)
            && self
                .priority
                .is_none_or(|priority| task.priority() == priority)
            && self
                .category
                .as_ref()
                .is_none_or(|category| task.details().category.as_ref() == Some(category))
    }

    /// Compares two tasks according to the requested ordering.
    #[must_use]
    pub fn compare(&self, left: &Task, right: &Task) -> Ordering {
        let ascending = match self.sort {
            TaskSortKey::CreatedAt => left.created_at().cmp(&right.created_at()),
            TaskSortKey::UpdatedAt => left.updated_at().cmp(&right.updated_at()),
            TaskSortKey::DueDate => compare_due_dates(left, right),
            TaskSortKey::Priority => left.priority().cmp(&right.priority()),
            TaskSortKey::Title => left
                .details()
                .title
                .as_str()
                .cmp(right.details().title.as_str()),
            TaskSortKey::Status => status_rank(left.status()).cmp(&status_rank(right.status())),
        };
        match self.order {
            SortOrder::Asc => ascending,
            SortOrder::Desc => ascending.reverse(),
        }
    }
}

/// Orders dated tasks before undated ones.
fn compare_due_dates(left: &Task, right: &Task) -> Ordering {
    match (left.due_date(), right.due_date()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

const fn status_rank(status: TaskStatus) -> u8 {
    match status {
        TaskStatus::Todo => 0,
        TaskStatus::InProgress => 1,
        TaskStatus::Completed => 2,
    }
}

/// Task counts grouped by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatusCounts {
    /// Tasks in `todo`.
    pub todo: u64,
    /// Tasks in `in-progress`.
    pub in_progress: u64,
    /// Tasks in `completed`.
    pub completed: u64,
    /// All tasks.
    pub total: u64,
    /// Open tasks whose due date has passed.
    pub overdue: u64,
}

impl TaskStatusCounts {
    /// Adds `count` tasks with `status` to the tally.
    pub const fn add(&mut self, status: TaskStatus, count: u64) {
        match status {
            TaskStatus::Todo => self.todo += count,
            TaskStatus::InProgress => self.in_progress += count,
            TaskStatus::Completed => self.completed += count,
        }
        self.total += count;
    }

    /// Completed share of all tasks as a percentage, zero when empty.
    #[must_use]
    pub fn completion_rate(&self) -> f64 {
        percentage(self.completed, self.total)
    }
}

/// Per-owner task totals used for leaderboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerTaskCounts {
    /// Owning user.
    pub owner: UserId,
    /// All tasks of the owner.
    pub total: u64,
    /// Completed tasks of the owner.
    pub completed: u64,
}

impl OwnerTaskCounts {
    /// Completed share as a percentage, zero when the owner has no tasks.
    #[must_use]
    pub fn completion_rate(&self) -> f64 {
        percentage(self.completed, self.total)
    }
}
