//! Diesel row models for login attempts.

use super::schema::login_attempts;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Stored login attempt.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = login_attempts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LoginAttemptRow {
    /// Attempt identifier.
    pub id: uuid::Uuid,
    /// Attempted identifier.
    pub email: String,
    /// Success flag.
    pub success: bool,
    /// Remote address.
    pub ip_address: String,
    /// `User-Agent` header.
    pub user_agent: String,
    /// Authentication method.
    pub login_method: String,
    /// Resolved account.
    pub user_id: Option<uuid::Uuid>,
    /// Failure reason.
    pub failure_reason: Option<String>,
    /// Attempt instant.
    pub created_at: DateTime<Utc>,
}
