//! Shared world state for task time tracking BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rstest::fixture;
use taskwright::{
    clock::ManualClock,
    task::{
        adapters::memory::InMemoryTaskRepository, domain::TaskId, services::TaskLifecycleService,
    },
    user::domain::UserId,
};

/// Service type used by the BDD world.
pub type TestTaskService = TaskLifecycleService<InMemoryTaskRepository, ManualClock>;

/// Scenario world for timer behaviour tests.
pub struct TimerWorld {
    pub service: TestTaskService,
    pub clock: Arc<ManualClock>,
    pub owner: UserId,
    pub tasks: HashMap<String, TaskId>,
}

impl TimerWorld {
    /// Creates a world with a fresh account and no tasks.
    #[must_use]
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2025, 2, 10, 8, 30, 0)
            .single()
            .unwrap_or_default();
        let clock = Arc::new(ManualClock::new(start));
        let service = TaskLifecycleService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::clone(&clock),
        );

        Self {
            service,
            clock,
            owner: UserId::new(),
            tasks: HashMap::new(),
        }
    }

    /// Looks up a task created earlier in the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error when no task with `title` was created.
    pub fn task_id(&self, title: &str) -> Result<TaskId, eyre::Report> {
        self.tasks
            .get(title)
            .copied()
            .ok_or_else(|| eyre::eyre!("no task titled {title:?} in scenario world"))
    }
}

impl Default for TimerWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TimerWorld {
    TimerWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
