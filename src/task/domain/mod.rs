//! Domain model for task lifecycle and time tracking.
//!
//! The aggregate keeps workflow status and timer state together so that a
//! running session always belongs to an `in-progress` task and a completion
//! marker always belongs to a `completed` one. Everything here is pure:
//! operations take the instant they run at as an explicit argument.

mod change;
mod error;
mod fields;
mod ids;
mod patch;
mod query;
mod status;
mod task;
mod timer;
mod timing;

pub use change::{ChangeOutcome, ChangedTask, TaskChange};
pub use error::{ParseTaskPriorityError, ParseTaskSortError, ParseTaskStatusError, TaskDomainError};
pub use fields::{TaskAssignee, TaskCategory, TaskDescription, TaskDetails, TaskTag, TaskTitle};
pub use ids::TaskId;
pub use patch::TaskPatch;
pub use query::{OwnerTaskCounts, SortOrder, TaskQuery, TaskSortKey, TaskStatusCounts};
pub use status::{TaskPriority, TaskStatus};
pub use task::{PersistedTaskData, Task, TaskDraft};
pub use timer::{TimerState, TrackedMinutes, elapsed_minutes};
pub use timing::{TaskTiming, TimeRemaining};
