//! `PostgreSQL` connection pooling and schema migrations.

use crate::config::DatabaseConfig;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError, PooledConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use thiserror::Error;
use tracing::info;

/// Shared r2d2 pool of `PostgreSQL` connections.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Migrations under `migrations/`, compiled into the binary.
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while connecting or migrating.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The pool could not open its connections.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] PoolError),
    /// A pooled connection could not be checked out.
    #[error("failed to check out connection: {0}")]
    Checkout(String),
    /// A migration could not be applied or reverted.
    #[error("migration failed: {0}")]
    Migration(String),
}

/// Builds a connection pool for `config`.
///
/// # Errors
///
/// Returns [`DatabaseError::Pool`] when the initial connections fail.
pub fn build_pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    let manager = ConnectionManager::<PgConnection>::new(config.url.as_str());
    let pool = Pool::builder().max_size(config.pool_size).build(manager)?;
    Ok(pool)
}

/// Applies every embedded migration that has not run yet. Returns the
/// versions that were applied, oldest first.
///
/// # Errors
///
/// Returns [`DatabaseError`] when a connection cannot be obtained or a
/// migration fails.
pub fn run_migrations(pool: &PgPool) -> Result<Vec<String>, DatabaseError> {
    let mut connection = checkout(pool)?;
    let applied: Vec<String> = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| DatabaseError::Migration(err.to_string()))?
        .iter()
        .map(ToString::to_string)
        .collect();
    for version in &applied {
        info!(%version, "applied migration");
    }
    Ok(applied)
}

/// Reverts every applied migration, newest first, dropping all application
/// tables.
///
/// # Errors
///
/// Returns [`DatabaseError`] when a connection cannot be obtained or a
/// down script fails.
pub fn revert_migrations(pool: &PgPool) -> Result<(), DatabaseError> {
    let mut connection = checkout(pool)?;
    let reverted = connection
        .revert_all_migrations(MIGRATIONS)
        .map_err(|err| DatabaseError::Migration(err.to_string()))?;
    info!(count = reverted.len(), "reverted migrations");
    Ok(())
}

fn checkout(
    pool: &PgPool,
) -> Result<PooledConnection<ConnectionManager<PgConnection>>, DatabaseError> {
    pool.get().map_err(|err| DatabaseError::Checkout(err.to_string()))
}

/// Escapes `%`, `_` and `\` so `value` matches literally inside a `LIKE`
/// pattern.
pub(crate) fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
