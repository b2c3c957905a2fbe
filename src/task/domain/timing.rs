//! Values derived from a task at read time.
//!
//! None of these are stored; they depend on the instant the task is viewed.

use super::{Task, TrackedMinutes, elapsed_minutes};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Coarse time left until a task's due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRemaining {
    /// The due date has passed.
    Overdue,
    /// At least one whole day remains.
    Days(i64),
    /// Less than a day but at least one whole hour remains.
    Hours(i64),
    /// Less than one hour remains.
    LessThanAnHour,
}

impl TimeRemaining {
    /// Classifies the time between `now` and `due`.
    #[must_use]
    pub fn until(due: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let remaining = due.signed_duration_since(now);
        if remaining < chrono::TimeDelta::zero() {
            return Self::Overdue;
        }
        let days = remaining.num_days();
        if days > 0 {
            return Self::Days(days);
        }
        let hours = remaining.num_hours();
        if hours > 0 {
            return Self::Hours(hours);
        }
        Self::LessThanAnHour
    }
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overdue => f.write_str("overdue"),
            Self::Days(1) => f.write_str("1 day"),
            Self::Days(days) => write!(f, "{days} days"),
            Self::Hours(1) => f.write_str("1 hour"),
            Self::Hours(hours) => write!(f, "{hours} hours"),
            Self::LessThanAnHour => f.write_str("less than 1 hour"),
        }
    }
}

impl Serialize for TimeRemaining {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Read model of a task's schedule and time tracking at a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskTiming {
    /// Due date has passed and the task is not completed.
    pub is_overdue: bool,
    /// Time left until the due date; `None` without a due date or once
    /// completed.
    pub time_remaining: Option<TimeRemaining>,
    /// Whole minutes of the running session, zero when idle.
    pub current_session_minutes: TrackedMinutes,
    /// Tracked plus current-session time in human form.
    pub total_time_formatted: String,
}

impl TaskTiming {
    /// Derives timing values for `task` as seen at `now`.
    #[must_use]
    pub fn of(task: &Task, now: DateTime<Utc>) -> Self {
        let open_due_date = task.due_date().filter(|_| !task.status().is_completed());
        let current_session_minutes = task
            .started_at()
            .map_or(TrackedMinutes::ZERO, |since| elapsed_minutes(since, now));
        let total = task.time_spent().saturating_add(current_session_minutes);

        Self {
            is_overdue: open_due_date.is_some_and(|due| due < now),
            time_remaining: open_due_date.map(|due| TimeRemaining::until(due, now)),
            current_session_minutes,
            total_time_formatted: total.to_human(),
        }
    }
}

impl Task {
    /// Derives read-time values for this task at `now`.
    #[must_use]
    pub fn timing(&self, now: DateTime<Utc>) -> TaskTiming {
        TaskTiming::of(self, now)
    }
}
