//! Timer state and whole-minute time accounting.
//!
//! A task's timer is a tagged state rather than an `is_active` flag paired
//! with a nullable start timestamp, so a running timer always carries the
//! instant it started and a completed task always carries its completion
//! instant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timer state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TimerState {
    /// No session is running and the task is not completed.
    Idle,
    /// A session has been running since the given instant.
    Running {
        /// Start of the current session.
        since: DateTime<Utc>,
    },
    /// The task was completed at the given instant.
    Completed {
        /// Completion instant.
        at: DateTime<Utc>,
    },
}

impl TimerState {
    /// Returns `true` while a session is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// Returns the start of the running session, if any.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Running { since } => Some(*since),
            Self::Idle | Self::Completed { .. } => None,
        }
    }

    /// Returns the completion instant, if any.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Completed { at } => Some(*at),
            Self::Idle | Self::Running { .. } => None,
        }
    }

    /// Rebuilds a timer state from its flat storage columns.
    ///
    /// Returns `None` when the columns describe an impossible combination,
    /// such as an active flag without a start instant or a running session
    /// on a completed task.
    #[must_use]
    pub fn from_columns(
        is_active: bool,
        started_at: Option<DateTime<Utc>>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Option<Self> {
        match (is_active, started_at, completed_at) {
            (false, None, None) => Some(Self::Idle),
            (true, Some(since), None) => Some(Self::Running { since }),
            (false, None, Some(at)) => Some(Self::Completed { at }),
            _ => None,
        }
    }
}

/// Non-negative count of whole minutes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TrackedMinutes(u64);

impl TrackedMinutes {
    /// Zero minutes.
    pub const ZERO: Self = Self(0);

    /// Wraps a minute count.
    #[must_use]
    pub const fn new(minutes: u64) -> Self {
        Self(minutes)
    }

    /// Returns the minute count.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns `true` when no minutes are recorded.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Adds two counts, saturating at the numeric bound.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Renders the count as `Hh Mm`, `Mm`, or `No time logged` for zero.
    #[must_use]
    pub fn to_human(self) -> String {
        if self.is_zero() {
            return "No time logged".to_owned();
        }
        let hours = self.0.div_euclid(60);
        let minutes = self.0.rem_euclid(60);
        if hours > 0 {
            format!("{hours}h {minutes}m")
        } else {
            format!("{minutes}m")
        }
    }
}

impl fmt::Display for TrackedMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whole minutes elapsed between `since` and `now`, floored.
///
/// Clock skew that places `now` before `since` yields zero.
#[must_use]
pub fn elapsed_minutes(since: DateTime<Utc>, now: DateTime<Utc>) -> TrackedMinutes {
    let minutes = now.signed_duration_since(since).num_minutes();
    TrackedMinutes(u64::try_from(minutes).unwrap_or(0))
}
