//! Shared test helpers for `PostgreSQL` integration tests.

use chrono::{DateTime, TimeZone, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use taskwright::{
    config::DatabaseConfig,
    db::{PgPool, build_pool, run_migrations},
    user::domain::{EmailAddress, LocalRegistration, PasswordDigest, User, Username},
};
use uuid::Uuid;

/// Server URL, including a maintenance database path, used by the tests.
pub const DATABASE_URL_ENV: &str = "TASKWRIGHT_TEST_DATABASE_URL";

/// Database created for a single test and dropped afterwards.
pub struct TemporaryDatabase {
    admin_url: String,
    name: String,
    pub pool: PgPool,
}

impl TemporaryDatabase {
    fn create(admin_url: String) -> Result<Self, eyre::Report> {
        let name = format!("taskwright_test_{}", Uuid::new_v4().simple());
        let (server, _) = admin_url
            .rsplit_once('/')
            .ok_or_else(|| eyre::eyre!("{DATABASE_URL_ENV} must include a database path"))?;
        let url = format!("{server}/{name}");

        let mut admin = PgConnection::establish(&admin_url)?;
        admin.batch_execute(&format!("CREATE DATABASE {name}"))?;

        let pool = build_pool(&DatabaseConfig { url, pool_size: 2 })?;
        run_migrations(&pool)?;
        Ok(Self {
            admin_url,
            name,
            pool,
        })
    }
}

impl Drop for TemporaryDatabase {
    fn drop(&mut self) {
        let Ok(mut admin) = PgConnection::establish(&self.admin_url) else {
            return;
        };
        let statement = format!("DROP DATABASE IF EXISTS {} WITH (FORCE)", self.name);
        if let Err(err) = admin.batch_execute(&statement) {
            tracing::warn!(database = %self.name, error = %err, "failed to drop test database");
        }
    }
}

/// Creates a migrated temporary database, or returns `None` when no server
/// is configured.
///
/// # Errors
///
/// Returns an error when the server is configured but unusable.
pub async fn temporary_database() -> Result<Option<TemporaryDatabase>, eyre::Report> {
    let Ok(admin_url) = std::env::var(DATABASE_URL_ENV) else {
        return Ok(None);
    };
    let created = tokio::task::spawn_blocking(move || TemporaryDatabase::create(admin_url));
    Ok(Some(created.await??))
}

/// Fixed instant used as the starting point of every test.
#[must_use]
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 1, 10, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Builds an unsaved password account.
///
/// # Errors
///
/// Returns an error when `username` is not a valid username.
pub fn local_user(username: &str, now: DateTime<Utc>) -> Result<User, eyre::Report> {
    Ok(User::register_local(
        LocalRegistration {
            username: Username::new(username)?,
            email: EmailAddress::new(format!("{username}@example.com"))?,
            password: PasswordDigest::from_encoded("$argon2id$v=19$stub"),
            name: Some(username.to_uppercase()),
        },
        now,
    ))
}
