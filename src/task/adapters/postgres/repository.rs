//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{NewTaskRow, TaskRow},
    schema::tasks,
};
use crate::db::PgPool;
use crate::task::{
    domain::{
        ChangedTask, OwnerTaskCounts, PersistedTaskData, Task, TaskAssignee, TaskCategory,
        TaskChange, TaskDescription, TaskDetails, TaskDomainError, TaskId, TaskPriority,
        TaskQuery, TaskStatus, TaskStatusCounts, TaskTag, TaskTitle, TimerState, TrackedMinutes,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskScope},
};
use crate::user::domain::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{BigInt, Nullable, Timestamptz, Uuid as SqlUuid, Varchar};

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_row(task)?;

        self.run_blocking(move |connection| insert_row(connection, task_id, &new_row))
            .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_for_owner(
        &self,
        id: TaskId,
        owner: UserId,
    ) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .filter(tasks::user_id.eq(owner.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_for_owner(
        &self,
        owner: UserId,
        query: &TaskQuery,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let filters = query.clone();
        self.run_blocking(move |connection| {
            let mut statement = tasks::table
                .filter(tasks::user_id.eq(owner.into_inner()))
                .select(TaskRow::as_select())
                .into_boxed();
            if let Some(status) = filters.status {
                statement = statement.filter(tasks::status.eq(status.as_str()));
            }
            if let Some(priority) = filters.priority {
                statement = statement.filter(tasks::priority.eq(priority.as_str()));
            }
            if let Some(category) = filters.category.as_ref() {
                statement = statement.filter(tasks::category.eq(category.as_str().to_owned()));
            }

            let rows = statement.load::<TaskRow>(connection)?;
            let mut found = rows
                .into_iter()
                .map(row_to_task)
                .collect::<TaskRepositoryResult<Vec<_>>>()?;
            // Priority and status sort by rank, not by their stored text.
            found.sort_by(|left, right| {
                filters.compare(left, right).then(left.id().cmp(&right.id()))
            });
            Ok(found)
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(tasks::table.find(id.into_inner())).execute(connection)?;
            if deleted == 0 {
                return Err(TaskRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_by_owner(&self, owner: UserId) -> TaskRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let deleted =
                diesel::delete(tasks::table.filter(tasks::user_id.eq(owner.into_inner())))
                    .execute(connection)?;
            u64::try_from(deleted).map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn apply_change(
        &self,
        owner: UserId,
        ids: &[TaskId],
        change: &TaskChange,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<ChangedTask>> {
        let targets = ids.to_vec();
        let requested = change.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                apply_locked(tx, owner, &targets, &requested, now)
            })
        })
        .await
    }

    async fn store_with_change(
        &self,
        task: &Task,
        change: &TaskChange,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<ChangedTask> {
        let task_id = task.id();
        let owner = task.owner();
        let new_row = to_row(task)?;
        let requested = change.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                insert_row(tx, task_id, &new_row)?;
                apply_locked(tx, owner, &[task_id], &requested, now)?
                    .into_iter()
                    .next()
                    .ok_or(TaskRepositoryError::NotFound(task_id))
            })
        })
        .await
    }

    async fn status_counts(
        &self,
        scope: TaskScope,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<TaskStatusCounts> {
        let owner = match scope {
            TaskScope::Owner(owner) => Some(owner.into_inner()),
            TaskScope::All => None,
        };
        self.run_blocking(move |connection| {
            let rows = diesel::sql_query(concat!(
                "SELECT status, COUNT(*) AS total, ",
                "COUNT(*) FILTER (WHERE due_date < $2 AND status <> 'completed') AS overdue ",
                "FROM tasks WHERE ($1::uuid IS NULL OR user_id = $1) ",
                "GROUP BY status",
            ))
            .bind::<Nullable<SqlUuid>, _>(owner)
            .bind::<Timestamptz, _>(now)
            .load::<StatusCountRow>(connection)?;

            let mut counts = TaskStatusCounts::default();
            for row in rows {
                let status = TaskStatus::try_from(row.status.as_str())
                    .map_err(TaskRepositoryError::persistence)?;
                counts.add(status, to_count(row.total)?);
                counts.overdue += to_count(row.overdue)?;
            }
            Ok(counts)
        })
        .await
    }

    async fn top_owners(&self, limit: usize) -> TaskRepositoryResult<Vec<OwnerTaskCounts>> {
        let row_limit = i64::try_from(limit).map_err(TaskRepositoryError::persistence)?;
        self.run_blocking(move |connection| {
            let rows = diesel::sql_query(concat!(
                "SELECT user_id, COUNT(*) AS total, ",
                "COUNT(*) FILTER (WHERE status = 'completed') AS completed ",
                "FROM tasks GROUP BY user_id ",
                "ORDER BY total DESC, user_id ASC LIMIT $1",
            ))
            .bind::<BigInt, _>(row_limit)
            .load::<OwnerCountRow>(connection)?;

            rows.into_iter()
                .map(|row| {
                    Ok(OwnerTaskCounts {
                        owner: UserId::from_uuid(row.user_id),
                        total: to_count(row.total)?,
                        completed: to_count(row.completed)?,
                    })
                })
                .collect()
        })
        .await
    }
}

#[derive(QueryableByName)]
struct StatusCountRow {
    #[diesel(sql_type = Varchar)]
    status: String,
    #[diesel(sql_type = BigInt)]
    total: i64,
    #[diesel(sql_type = BigInt)]
    overdue: i64,
}

#[derive(QueryableByName)]
struct OwnerCountRow {
    #[diesel(sql_type = SqlUuid)]
    user_id: uuid::Uuid,
    #[diesel(sql_type = BigInt)]
    total: i64,
    #[diesel(sql_type = BigInt)]
    completed: i64,
}

fn to_count(value: i64) -> TaskRepositoryResult<u64> {
    u64::try_from(value).map_err(TaskRepositoryError::persistence)
}

/// Applies `change` to the owner's tasks inside the caller's transaction.
///
/// Every row of the owner is locked in id order first, so a concurrent change
/// for the same owner blocks until this transaction commits and then sees the
/// written state. The partial unique index on running timers is checked per
/// statement, so stopped rows are written before the running one.
fn apply_locked(
    tx: &mut PgConnection,
    owner: UserId,
    ids: &[TaskId],
    change: &TaskChange,
    now: DateTime<Utc>,
) -> TaskRepositoryResult<Vec<ChangedTask>> {
    let rows = tasks::table
        .filter(tasks::user_id.eq(owner.into_inner()))
        .order(tasks::id.asc())
        .select(TaskRow::as_select())
        .for_update()
        .load::<TaskRow>(tx)?;
    let mut owned = rows
        .into_iter()
        .map(row_to_task)
        .collect::<TaskRepositoryResult<Vec<_>>>()?;

    let outcome = change.apply_all(&mut owned, ids, now);
    for task in outcome.writes(&owned) {
        write_row(tx, task.id(), &to_row(task)?)?;
    }
    Ok(outcome.results)
}

fn insert_row(
    connection: &mut PgConnection,
    id: TaskId,
    row: &NewTaskRow,
) -> TaskRepositoryResult<()> {
    diesel::insert_into(tasks::table)
        .values(row)
        .execute(connection)
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                TaskRepositoryError::DuplicateTask(id)
            }
            _ => TaskRepositoryError::persistence(err),
        })?;
    Ok(())
}

fn write_row(
    connection: &mut PgConnection,
    id: TaskId,
    row: &NewTaskRow,
) -> TaskRepositoryResult<()> {
    let updated = diesel::update(tasks::table.find(id.into_inner()))
        .set(row)
        .execute(connection)?;
    if updated == 0 {
        return Err(TaskRepositoryError::NotFound(id));
    }
    Ok(())
}

fn to_row(task: &Task) -> TaskRepositoryResult<NewTaskRow> {
    let details = task.details();
    let time_spent =
        i64::try_from(task.time_spent().value()).map_err(TaskRepositoryError::persistence)?;
    let timer = task.timer();

    Ok(NewTaskRow {
        id: task.id().into_inner(),
        user_id: task.owner().into_inner(),
        title: details.title.as_str().to_owned(),
        description: details.description.as_ref().map(|d| d.as_str().to_owned()),
        category: details.category.as_ref().map(|c| c.as_str().to_owned()),
        assignee: details.assignee.as_ref().map(|a| a.as_str().to_owned()),
        tags: details.tags.iter().map(|tag| tag.as_str().to_owned()).collect(),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        due_date: task.due_date(),
        time_spent,
        is_active: timer.is_active(),
        started_at: timer.started_at(),
        completed_at: timer.completed_at(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        user_id,
        title,
        description,
        category,
        assignee,
        tags,
        status: persisted_status,
        priority: persisted_priority,
        due_date,
        time_spent: persisted_minutes,
        is_active,
        started_at,
        completed_at,
        created_at,
        updated_at,
    } = row;

    let task_id = TaskId::from_uuid(id);
    let mut details = TaskDetails::new(TaskTitle::new(title)?)
        .with_tags(TaskTag::parse_all(tags)?);
    if let Some(value) = description {
        details = details.with_description(TaskDescription::new(value)?);
    }
    if let Some(value) = category {
        details = details.with_category(TaskCategory::new(value)?);
    }
    if let Some(value) = assignee {
        details = details.with_assignee(TaskAssignee::new(value)?);
    }

    let status = TaskStatus::try_from(persisted_status.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let priority = TaskPriority::try_from(persisted_priority.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let time_spent = u64::try_from(persisted_minutes)
        .map(TrackedMinutes::new)
        .map_err(TaskRepositoryError::persistence)?;
    let timer = TimerState::from_columns(is_active, started_at, completed_at).ok_or(
        TaskDomainError::InconsistentTimerState {
            task_id,
            reason: "timer columns do not form a valid state",
        },
    )?;

    let data = PersistedTaskData {
        id: task_id,
        owner: UserId::from_uuid(user_id),
        details,
        status,
        priority,
        due_date,
        time_spent,
        timer,
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data)?)
}
