//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub user_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional category.
    pub category: Option<String>,
    /// Optional assignee.
    pub assignee: Option<String>,
    /// Tags.
    pub tags: Vec<String>,
    /// Workflow status.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Accumulated minutes.
    pub time_spent: i64,
    /// Running-session flag.
    pub is_active: bool,
    /// Running-session start.
    pub started_at: Option<DateTime<Utc>>,
    /// Completion instant.
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for task records.
///
/// `None` values are written as `NULL` so that cleared fields and stopped
/// timers reach the row.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct NewTaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub user_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional category.
    pub category: Option<String>,
    /// Optional assignee.
    pub assignee: Option<String>,
    /// Tags.
    pub tags: Vec<String>,
    /// Workflow status.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Accumulated minutes.
    pub time_spent: i64,
    /// Running-session flag.
    pub is_active: bool,
    /// Running-session start.
    pub started_at: Option<DateTime<Utc>>,
    /// Completion instant.
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
