//! Shared application wiring for in-memory integration tests.

use chrono::{TimeZone, Utc};
use jsonwebtoken::jwk::JwkSet;
use rstest::fixture;
use std::sync::Arc;
use taskwright::{
    admin::services::AdminService,
    clock::ManualClock,
    config::AuditConfig,
    login_audit::{adapters::memory::InMemoryLoginAttemptRepository, services::LoginAuditor},
    task::{adapters::memory::InMemoryTaskRepository, services::TaskLifecycleService},
    user::{
        adapters::{
            Argon2Hasher, GoogleIdentityVerifier, JwtTokenIssuer, memory::InMemoryUserRepository,
        },
        services::{AuthService, AuthSession, SignUpRequest},
    },
};

/// Authentication service over in-memory adapters.
pub type TestAuth = AuthService<
    InMemoryUserRepository,
    InMemoryLoginAttemptRepository,
    Argon2Hasher,
    JwtTokenIssuer,
    GoogleIdentityVerifier,
    ManualClock,
>;

/// Admin service over in-memory adapters.
pub type TestAdmin = AdminService<
    InMemoryUserRepository,
    InMemoryTaskRepository,
    InMemoryLoginAttemptRepository,
    ManualClock,
>;

/// Password used by every account created through [`App::sign_up`].
pub const PASSWORD: &str = "correct horse";

/// Fully wired application sharing one clock and one set of stores.
pub struct App {
    pub auth: TestAuth,
    pub tasks: TaskLifecycleService<InMemoryTaskRepository, ManualClock>,
    pub admin: TestAdmin,
    pub users: Arc<InMemoryUserRepository>,
    pub attempts: Arc<InMemoryLoginAttemptRepository>,
    pub clock: Arc<ManualClock>,
}

impl App {
    /// Registers `username` with [`PASSWORD`].
    ///
    /// # Errors
    ///
    /// Returns an error when registration fails.
    pub async fn sign_up(&self, username: &str) -> Result<AuthSession, eyre::Report> {
        let session = self
            .auth
            .sign_up(
                SignUpRequest::new(username, format!("{username}@example.com"), PASSWORD)
                    .with_name(username.to_uppercase()),
            )
            .await?;
        Ok(session)
    }
}

/// Provides a fresh application with the clock at a fixed instant.
#[fixture]
pub fn app() -> App {
    let start = Utc
        .with_ymd_and_hms(2025, 5, 5, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    let clock = Arc::new(ManualClock::new(start));
    let users = Arc::new(InMemoryUserRepository::new());
    let task_store = Arc::new(InMemoryTaskRepository::new());
    let attempts = Arc::new(InMemoryLoginAttemptRepository::new());

    let auth = AuthService::new(
        Arc::clone(&users),
        LoginAuditor::new(Arc::clone(&attempts), Arc::clone(&clock)),
        Arc::new(Argon2Hasher::new()),
        Arc::new(JwtTokenIssuer::new(
            b"integration-secret",
            chrono::TimeDelta::hours(1),
        )),
        Arc::new(
            GoogleIdentityVerifier::new(JwkSet { keys: Vec::new() })
                .with_google_client("taskwright-tests"),
        ),
        Arc::clone(&clock),
    );
    let admin = AdminService::new(
        Arc::clone(&users),
        Arc::clone(&task_store),
        Arc::clone(&attempts),
        Arc::clone(&clock),
        AuditConfig::default(),
    );

    App {
        auth,
        tasks: TaskLifecycleService::new(task_store, Arc::clone(&clock)),
        admin,
        users,
        attempts,
        clock,
    }
}
