//! Operator commands for a Taskwright deployment.
//!
//! Usage:
//!
//! ```text
//! taskwright-admin [--config <path>] migrate
//! taskwright-admin [--config <path>] create-admin --email <email> --username <name> \
//!     [--name <display>]
//! taskwright-admin [--config <path>] dashboard
//! ```
//!
//! Settings come from the optional TOML file and `TASKWRIGHT_*` environment
//! variables. `create-admin` reads the password from
//! `TASKWRIGHT_ADMIN_PASSWORD` so it never appears in shell history.

use clap::{Parser, Subcommand};
use jsonwebtoken::jwk::JwkSet;
use mockable::DefaultClock;
use std::path::PathBuf;
use std::sync::Arc;
use taskwright::{
    admin::services::AdminService,
    config::AppConfig,
    db::{PgPool, build_pool, run_migrations},
    login_audit::{adapters::postgres::PostgresLoginAttemptRepository, services::LoginAuditor},
    task::adapters::postgres::PostgresTaskRepository,
    telemetry::init_tracing,
    user::{
        adapters::{
            Argon2Hasher, GoogleIdentityVerifier, JwtTokenIssuer, postgres::PostgresUserRepository,
        },
        services::{AdminBootstrap, AuthService},
    },
};
use thiserror::Error;
use tokio::runtime::Builder;
use tracing::info;

const ADMIN_PASSWORD_ENV: &str = "TASKWRIGHT_ADMIN_PASSWORD";

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Parser)]
#[command(name = "taskwright-admin", about = "Operate a Taskwright deployment")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending schema migrations.
    Migrate,
    /// Create the administrator account, or promote the account with the
    /// given email.
    CreateAdmin {
        /// Administrator email.
        #[arg(long)]
        email: String,
        /// Administrator username.
        #[arg(long)]
        username: String,
        /// Display name.
        #[arg(long)]
        name: Option<String>,
    },
    /// Log the admin dashboard as JSON.
    Dashboard,
}

#[derive(Debug, Error)]
enum AdminCliError {
    #[error("{ADMIN_PASSWORD_ENV} must be set")]
    MissingPassword,
}

fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    init_tracing(&config.logging)?;

    let pool = build_pool(&config.database)?;
    let runtime = Builder::new_multi_thread().enable_all().build()?;
    match cli.command {
        Command::Migrate => {
            let applied = run_migrations(&pool)?;
            info!(count = applied.len(), "migrations complete");
            Ok(())
        }
        Command::CreateAdmin {
            email,
            username,
            name,
        } => runtime.block_on(create_admin(&config, pool, email, username, name)),
        Command::Dashboard => runtime.block_on(dashboard(&config, pool)),
    }
}

async fn create_admin(
    config: &AppConfig,
    pool: PgPool,
    email: String,
    username: String,
    name: Option<String>,
) -> Result<(), BoxError> {
    let password =
        std::env::var(ADMIN_PASSWORD_ENV).map_err(|_| AdminCliError::MissingPassword)?;
    let clock = Arc::new(DefaultClock);
    let auditor = LoginAuditor::new(
        Arc::new(PostgresLoginAttemptRepository::new(pool.clone())),
        Arc::clone(&clock),
    );
    let mut identities = GoogleIdentityVerifier::new(JwkSet { keys: Vec::new() });
    if let Some(client) = &config.auth.google_client_id {
        identities = identities.with_google_client(client.as_str());
    }
    if let Some(project) = &config.auth.firebase_project_id {
        identities = identities.with_firebase_project(project.as_str());
    }
    let auth = AuthService::new(
        Arc::new(PostgresUserRepository::new(pool)),
        auditor,
        Arc::new(Argon2Hasher::new()),
        Arc::new(JwtTokenIssuer::new(
            config.auth.jwt_secret.as_bytes(),
            config.auth.token_ttl()?,
        )),
        Arc::new(identities),
        clock,
    );

    let admin = auth
        .bootstrap_admin(AdminBootstrap {
            email,
            username,
            password,
            name,
        })
        .await?;
    info!(user_id = %admin.id(), email = %admin.email(), "administrator ready");
    Ok(())
}

async fn dashboard(config: &AppConfig, pool: PgPool) -> Result<(), BoxError> {
    let admin = AdminService::new(
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(PostgresTaskRepository::new(pool.clone())),
        Arc::new(PostgresLoginAttemptRepository::new(pool)),
        Arc::new(DefaultClock),
        config.audit,
    );
    let report = admin.dashboard().await?;
    info!(dashboard = %serde_json::to_string(&report)?, "admin dashboard");
    Ok(())
}
