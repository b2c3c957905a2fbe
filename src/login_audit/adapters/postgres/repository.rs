//! `PostgreSQL` repository implementation for login attempts.

use super::{models::LoginAttemptRow, schema::login_attempts};
use crate::db::{PgPool, escape_like};
use crate::login_audit::{
    domain::{
        ClientInfo, LoginAttempt, LoginAttemptId, LoginAttemptQuery, LoginMethod, LoginStats,
        NewLoginAttempt,
    },
    ports::{LoginAttemptRepository, LoginAttemptRepositoryError, LoginAttemptRepositoryResult},
};
use crate::pagination::{Page, PageRequest};
use crate::user::domain::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{BigInt, Timestamptz};

/// `PostgreSQL`-backed login attempt log.
#[derive(Debug, Clone)]
pub struct PostgresLoginAttemptRepository {
    pool: PgPool,
}

impl PostgresLoginAttemptRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> LoginAttemptRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> LoginAttemptRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(LoginAttemptRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(LoginAttemptRepositoryError::persistence)?
    }
}

impl From<DieselError> for LoginAttemptRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl LoginAttemptRepository for PostgresLoginAttemptRepository {
    async fn record(&self, attempt: &LoginAttempt) -> LoginAttemptRepositoryResult<()> {
        let attempt_id = attempt.id();
        let row = to_row(attempt);
        self.run_blocking(move |connection| {
            diesel::insert_into(login_attempts::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        LoginAttemptRepositoryError::DuplicateAttempt(attempt_id)
                    }
                    _ => LoginAttemptRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn list(
        &self,
        query: &LoginAttemptQuery,
        page: PageRequest,
    ) -> LoginAttemptRepositoryResult<Page<LoginAttempt>> {
        let filters = query.clone();
        self.run_blocking(move |connection| {
            let total: i64 = filtered(&filters).count().get_result(connection)?;
            let offset =
                i64::try_from(page.offset()).map_err(LoginAttemptRepositoryError::persistence)?;
            let rows = filtered(&filters)
                .select(LoginAttemptRow::as_select())
                .order((login_attempts::created_at.desc(), login_attempts::id.desc()))
                .limit(i64::from(page.limit()))
                .offset(offset)
                .load::<LoginAttemptRow>(connection)?;

            let found = rows
                .into_iter()
                .map(row_to_attempt)
                .collect::<LoginAttemptRepositoryResult<Vec<_>>>()?;
            Ok(Page::new(found, page, to_count(total)?))
        })
        .await
    }

    async fn stats_since(&self, since: DateTime<Utc>) -> LoginAttemptRepositoryResult<LoginStats> {
        self.run_blocking(move |connection| {
            let row = diesel::sql_query(concat!(
                "SELECT COUNT(*) AS total, ",
                "COUNT(*) FILTER (WHERE success) AS successful, ",
                "COUNT(DISTINCT email) AS unique_emails ",
                "FROM login_attempts WHERE created_at >= $1",
            ))
            .bind::<Timestamptz, _>(since)
            .get_result::<LoginStatsRow>(connection)?;

            Ok(LoginStats::from_counts(
                to_count(row.total)?,
                to_count(row.successful)?,
                to_count(row.unique_emails)?,
            ))
        })
        .await
    }

    async fn recent_successes(
        &self,
        user: UserId,
        limit: usize,
    ) -> LoginAttemptRepositoryResult<Vec<LoginAttempt>> {
        let row_limit = i64::try_from(limit).map_err(LoginAttemptRepositoryError::persistence)?;
        self.run_blocking(move |connection| {
            let rows = login_attempts::table
                .filter(login_attempts::user_id.eq(user.into_inner()))
                .filter(login_attempts::success.eq(true))
                .order((login_attempts::created_at.desc(), login_attempts::id.desc()))
                .limit(row_limit)
                .select(LoginAttemptRow::as_select())
                .load::<LoginAttemptRow>(connection)?;
            rows.into_iter().map(row_to_attempt).collect()
        })
        .await
    }
}

#[derive(QueryableByName)]
struct LoginStatsRow {
    #[diesel(sql_type = BigInt)]
    total: i64,
    #[diesel(sql_type = BigInt)]
    successful: i64,
    #[diesel(sql_type = BigInt)]
    unique_emails: i64,
}

fn filtered(query: &LoginAttemptQuery) -> login_attempts::BoxedQuery<'static, Pg> {
    let mut statement = login_attempts::table.into_boxed();
    if let Some(success) = query.success {
        statement = statement.filter(login_attempts::success.eq(success));
    }
    if let Some(email) = query.email.as_deref() {
        let pattern = format!("%{}%", escape_like(email));
        statement = statement.filter(login_attempts::email.ilike(pattern));
    }
    if let Some(since) = query.since {
        statement = statement.filter(login_attempts::created_at.ge(since));
    }
    if let Some(user) = query.user {
        statement = statement.filter(login_attempts::user_id.eq(user.into_inner()));
    }
    statement
}

fn to_count(value: i64) -> LoginAttemptRepositoryResult<u64> {
    u64::try_from(value).map_err(LoginAttemptRepositoryError::persistence)
}

fn to_row(attempt: &LoginAttempt) -> LoginAttemptRow {
    LoginAttemptRow {
        id: attempt.id().into_inner(),
        email: attempt.email().to_owned(),
        success: attempt.success(),
        ip_address: attempt.client().ip_address.clone(),
        user_agent: attempt.client().user_agent.clone(),
        login_method: attempt.method().as_str().to_owned(),
        user_id: attempt.user_id().map(UserId::into_inner),
        failure_reason: attempt.failure_reason().map(str::to_owned),
        created_at: attempt.created_at(),
    }
}

fn row_to_attempt(row: LoginAttemptRow) -> LoginAttemptRepositoryResult<LoginAttempt> {
    let method = LoginMethod::try_from(row.login_method.as_str())?;
    let attempt = NewLoginAttempt {
        email: row.email,
        success: row.success,
        client: ClientInfo::new(row.ip_address, row.user_agent),
        method,
        user_id: row.user_id.map(UserId::from_uuid),
        failure_reason: row.failure_reason,
    };
    Ok(LoginAttempt::restore(
        LoginAttemptId::from_uuid(row.id),
        attempt,
        row.created_at,
    )?)
}
