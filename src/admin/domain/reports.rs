//! Aggregated views over accounts, tasks and login attempts.

use crate::login_audit::domain::{LoginAttempt, LoginStats};
use crate::pagination::Page;
use crate::rates::percentage;
use crate::task::domain::{OwnerTaskCounts, Task, TaskStatusCounts};
use crate::user::{
    domain::{User, UserId},
    ports::UserCounts,
};
use serde::Serialize;

/// Task totals across all owners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaskTotals {
    /// All tasks.
    pub total: u64,
    /// Completed tasks.
    pub completed: u64,
    /// Tasks not yet started.
    pub todo: u64,
    /// Tasks in progress.
    pub in_progress: u64,
    /// Open tasks past their due date.
    pub overdue: u64,
    /// Completed share in percent.
    pub completion_rate: f64,
}

impl From<TaskStatusCounts> for TaskTotals {
    fn from(counts: TaskStatusCounts) -> Self {
        Self {
            total: counts.total,
            completed: counts.completed,
            todo: counts.todo,
            in_progress: counts.in_progress,
            overdue: counts.overdue,
            completion_rate: counts.completion_rate(),
        }
    }
}

/// An owner ranked by task count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopUser {
    /// Account identifier.
    pub user_id: UserId,
    /// Display name.
    pub name: Option<String>,
    /// Account email.
    pub email: String,
    /// All tasks of the owner.
    pub task_count: u64,
    /// Completed tasks of the owner.
    pub completed_count: u64,
    /// Completed share in percent.
    pub completion_rate: f64,
}

impl TopUser {
    /// Joins an owner's counts with the owning account.
    #[must_use]
    pub fn new(user: &User, counts: OwnerTaskCounts) -> Self {
        Self {
            user_id: user.id(),
            name: user.name().map(str::to_owned),
            email: user.email().as_str().to_owned(),
            task_count: counts.total,
            completed_count: counts.completed,
            completion_rate: counts.completion_rate(),
        }
    }
}

/// Dashboard figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminDashboard {
    /// Login attempts within the configured window.
    pub login_stats: LoginStats,
    /// Account totals.
    pub user_stats: UserCounts,
    /// Task totals.
    pub task_stats: TaskTotals,
    /// Owners with the most tasks.
    pub top_users: Vec<TopUser>,
}

/// An account with its task counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserOverview {
    /// The account.
    pub user: User,
    /// Task counts of the account.
    pub task_counts: TaskTotals,
}

/// All tasks of one account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserTasks {
    /// The account.
    pub user: User,
    /// Tasks, newest first.
    pub tasks: Vec<Task>,
    /// Counts including overdue tasks.
    pub stats: TaskStatusCounts,
}

/// Totals over every login attempt of one account.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoginHistoryStats {
    /// All attempts.
    pub total_attempts: u64,
    /// Successful attempts.
    pub successful: u64,
    /// Failed attempts.
    pub failed: u64,
    /// Successful share in percent.
    pub success_rate: f64,
}

impl LoginHistoryStats {
    /// Builds totals from raw counts.
    #[must_use]
    pub fn from_counts(total_attempts: u64, successful: u64) -> Self {
        Self {
            total_attempts,
            successful,
            failed: total_attempts.saturating_sub(successful),
            success_rate: percentage(successful, total_attempts),
        }
    }
}

/// A page of one account's login attempts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginHistory {
    /// The account.
    pub user: User,
    /// Attempts, newest first.
    pub attempts: Page<LoginAttempt>,
    /// Totals over all of the account's attempts.
    pub stats: LoginHistoryStats,
}
