//! Error types for task domain validation and parsing.

use super::TaskId;
use thiserror::Error;

/// Errors returned while constructing or reconstructing task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title is required")]
    EmptyTitle,

    /// A text field exceeds its storage limit.
    #[error("{field} cannot exceed {max} characters")]
    FieldTooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Maximum number of characters accepted.
        max: usize,
    },

    /// A tag is empty after trimming.
    #[error("tags must not be empty")]
    EmptyTag,

    /// Persisted timer columns describe an impossible lifecycle state.
    #[error("task {task_id} has inconsistent timer state: {reason}")]
    InconsistentTimerState {
        /// Task whose persisted row was rejected.
        task_id: TaskId,
        /// Short description of the violated invariant.
        reason: &'static str,
    },
}

/// Error returned while parsing task statuses from input or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities from input or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);

/// Error returned while parsing task list sort keys or orders.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task sort option: {0}")]
pub struct ParseTaskSortError(pub String);
