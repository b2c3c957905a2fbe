//! Changes to stored tasks, applied against the owner's whole task set.
//!
//! Persistence adapters load every task of the owner inside one serialised
//! unit (a locked transaction or a held write guard), run
//! [`TaskChange::apply_all`], and write back exactly the tasks it reports as
//! modified. Another change for the same owner therefore never sees or
//! overwrites a half-applied one.

use super::{Task, TaskId, TaskPatch, TaskStatus};
use chrono::{DateTime, Utc};

/// A change requested for one or more of an owner's tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskChange {
    /// Field edits. A move into `in-progress` starts the timer.
    Edit(TaskPatch),
    /// Starts the timer; a running session is flushed and restarted.
    StartTimer,
    /// Stops a running timer.
    StopTimer,
}

/// A task after a change was applied to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedTask {
    /// The task as written.
    pub task: Task,
    /// Whether the change modified the task.
    pub changed: bool,
}

/// Everything a change did to an owner's task set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeOutcome {
    /// One entry per requested identifier found in the set, in request
    /// order.
    pub results: Vec<ChangedTask>,
    /// Every task that must be written back, including tasks whose timers
    /// were stopped to make room for a new one.
    pub modified: Vec<TaskId>,
}

impl ChangeOutcome {
    /// Returns the modified tasks of `owned` in write order: stopped and
    /// otherwise idle tasks first, the running task last.
    #[must_use]
    pub fn writes<'a>(&self, owned: &'a [Task]) -> Vec<&'a Task> {
        let mut writes: Vec<&Task> = owned
            .iter()
            .filter(|task| self.modified.contains(&task.id()))
            .collect();
        writes.sort_by_key(|task| task.is_active());
        writes
    }

    fn mark(&mut self, id: TaskId) {
        if !self.modified.contains(&id) {
            self.modified.push(id);
        }
    }
}

impl TaskChange {
    /// Returns `true` when applying this change to `task` starts its timer.
    #[must_use]
    pub fn starts_timer(&self, task: &Task) -> bool {
        match self {
            Self::Edit(patch) => {
                patch.status == Some(TaskStatus::InProgress)
                    && task.status() != TaskStatus::InProgress
            }
            Self::StartTimer => true,
            Self::StopTimer => false,
        }
    }

    /// Applies the change to each of `ids`, in order, within `owned`.
    ///
    /// `owned` must hold every task of a single owner. Identifiers that are
    /// not in `owned` are skipped. Before a timer starts, every other running
    /// task in `owned` is stopped at the same `now`, so at most one timer
    /// runs afterwards.
    #[must_use]
    pub fn apply_all(
        &self,
        owned: &mut [Task],
        ids: &[TaskId],
        now: DateTime<Utc>,
    ) -> ChangeOutcome {
        let mut outcome = ChangeOutcome::default();
        for &id in ids {
            let Some(starts_timer) = owned
                .iter()
                .find(|task| task.id() == id)
                .map(|task| self.starts_timer(task))
            else {
                continue;
            };
            if starts_timer {
                for other in owned
                    .iter_mut()
                    .filter(|task| task.id() != id && task.is_active())
                {
                    other.stop_timer(now);
                    outcome.mark(other.id());
                }
            }
            let Some(target) = owned.iter_mut().find(|task| task.id() == id) else {
                continue;
            };
            let changed = self.apply_to(target, now);
            if changed {
                outcome.mark(id);
            }
            outcome.results.push(ChangedTask {
                task: target.clone(),
                changed,
            });
        }
        outcome
    }

    fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) -> bool {
        match self {
            Self::Edit(patch) => task.apply_patch(patch.clone(), now),
            Self::StartTimer => {
                task.start_timer(now);
                true
            }
            Self::StopTimer => {
                if !task.is_active() {
                    return false;
                }
                task.stop_timer(now);
                true
            }
        }
    }
}
