//! Bundled migrations against `PostgreSQL`.

use super::helpers::temporary_database;
use diesel::prelude::*;
use eyre::ensure;
use rstest::rstest;
use taskwright::db::{revert_migrations, run_migrations};

#[derive(QueryableByName)]
struct TableCount {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    tables: i64,
}

fn application_tables(connection: &mut PgConnection) -> QueryResult<i64> {
    diesel::sql_query(concat!(
        "SELECT COUNT(*) AS tables FROM information_schema.tables ",
        "WHERE table_schema = 'public' ",
        "AND table_name IN ('users', 'tasks', 'login_attempts')",
    ))
    .get_result::<TableCount>(connection)
    .map(|row| row.tables)
}

fn recorded_versions(connection: &mut PgConnection) -> QueryResult<i64> {
    diesel::sql_query("SELECT COUNT(*) AS tables FROM __diesel_schema_migrations")
        .get_result::<TableCount>(connection)
        .map(|row| row.tables)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn migrations_revert_and_reapply() -> Result<(), eyre::Report> {
    let Some(db) = temporary_database().await? else {
        return Ok(());
    };
    let pool = db.pool.clone();
    tokio::task::spawn_blocking(move || -> Result<(), eyre::Report> {
        ensure!(run_migrations(&pool)?.is_empty(), "migrations applied twice");
        ensure!(recorded_versions(&mut *pool.get()?)? == 3, "ledger incomplete");
        revert_migrations(&pool)?;
        ensure!(application_tables(&mut *pool.get()?)? == 0, "tables survived revert");
        ensure!(recorded_versions(&mut *pool.get()?)? == 0, "ledger kept reverted versions");
        ensure!(run_migrations(&pool)?.len() == 3, "not every migration re-applied");
        ensure!(application_tables(&mut *pool.get()?)? == 3, "tables missing");
        Ok(())
    })
    .await?
}
