//! In-memory repository for task lifecycle tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{
        ChangedTask, OwnerTaskCounts, Task, TaskChange, TaskId, TaskQuery, TaskStatusCounts,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskScope},
};
use crate::user::domain::UserId;

/// Thread-safe in-memory task repository.
///
/// The whole store sits behind one lock, so a change holding the write guard
/// is serialised against every other mutation.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
}

impl InMemoryTaskState {
    fn apply(
        &mut self,
        owner: UserId,
        ids: &[TaskId],
        change: &TaskChange,
        now: DateTime<Utc>,
    ) -> Vec<ChangedTask> {
        let mut owned: Vec<Task> = self
            .tasks
            .values()
            .filter(|task| task.owner() == owner)
            .cloned()
            .collect();
        let outcome = change.apply_all(&mut owned, ids, now);
        for task in owned
            .into_iter()
            .filter(|task| outcome.modified.contains(&task.id()))
        {
            self.tasks.insert(task.id(), task);
        }
        outcome.results
    }
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_for_owner(
        &self,
        id: TaskId,
        owner: UserId,
    ) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state
            .tasks
            .get(&id)
            .filter(|task| task.owner() == owner)
            .cloned())
    }

    async fn list_for_owner(
        &self,
        owner: UserId,
        query: &TaskQuery,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.owner() == owner && query.matches(task))
            .cloned()
            .collect();
        tasks.sort_by(|left, right| query.compare(left, right).then(left.id().cmp(&right.id())));
        Ok(tasks)
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        state
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(TaskRepositoryError::NotFound(id))
    }

    async fn delete_by_owner(&self, owner: UserId) -> TaskRepositoryResult<u64> {
        let mut state = self.write()?;
        let before = state.tasks.len();
        state.tasks.retain(|_, task| task.owner() != owner);
        let removed = before.saturating_sub(state.tasks.len());
        u64::try_from(removed).map_err(TaskRepositoryError::persistence)
    }

    async fn apply_change(
        &self,
        owner: UserId,
        ids: &[TaskId],
        change: &TaskChange,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<ChangedTask>> {
        let mut state = self.write()?;
        Ok(state.apply(owner, ids, change, now))
    }

    async fn store_with_change(
        &self,
        task: &Task,
        change: &TaskChange,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<ChangedTask> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        state
            .apply(task.owner(), &[task.id()], change, now)
            .into_iter()
            .next()
            .ok_or(TaskRepositoryError::NotFound(task.id()))
    }

    async fn status_counts(
        &self,
        scope: TaskScope,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<TaskStatusCounts> {
        let state = self.read()?;
        let mut counts = TaskStatusCounts::default();
        for task in state.tasks.values().filter(|task| scope.contains(task)) {
            counts.add(task.status(), 1);
            if task.timing(now).is_overdue {
                counts.overdue += 1;
            }
        }
        Ok(counts)
    }

    async fn top_owners(&self, limit: usize) -> TaskRepositoryResult<Vec<OwnerTaskCounts>> {
        let state = self.read()?;
        let mut by_owner: HashMap<UserId, OwnerTaskCounts> = HashMap::new();
        for task in state.tasks.values() {
            let entry = by_owner.entry(task.owner()).or_insert(OwnerTaskCounts {
                owner: task.owner(),
                total: 0,
                completed: 0,
            });
            entry.total += 1;
            if task.status().is_completed() {
                entry.completed += 1;
            }
        }
        let mut ranked: Vec<OwnerTaskCounts> = by_owner.into_values().collect();
        ranked.sort_by(|left, right| {
            right
                .total
                .cmp(&left.total)
                .then(left.owner.cmp(&right.owner))
        });
        ranked.truncate(limit);
        Ok(ranked)
    }
}
