//! Best-effort auditing behaviour.

use std::sync::Arc;

use crate::clock::ManualClock;
use crate::login_audit::{
    adapters::memory::InMemoryLoginAttemptRepository,
    domain::{
        ClientInfo, LoginAttempt, LoginAttemptQuery, LoginMethod, LoginStats, NewLoginAttempt,
    },
    ports::{LoginAttemptRepository, LoginAttemptRepositoryError, LoginAttemptRepositoryResult},
    services::LoginAuditor,
};
use crate::pagination::{Page, PageRequest};
use crate::user::domain::UserId;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use mockall::mock;
use rstest::{fixture, rstest};

mock! {
    AttemptStore {}

    #[async_trait]
    impl LoginAttemptRepository for AttemptStore {
        async fn record(&self, attempt: &LoginAttempt) -> LoginAttemptRepositoryResult<()>;
        async fn list(
            &self,
            query: &LoginAttemptQuery,
            page: PageRequest,
        ) -> LoginAttemptRepositoryResult<Page<LoginAttempt>>;
        async fn stats_since(
            &self,
            since: DateTime<Utc>,
        ) -> LoginAttemptRepositoryResult<LoginStats>;
        async fn recent_successes(
            &self,
            user: UserId,
            limit: usize,
        ) -> LoginAttemptRepositoryResult<Vec<LoginAttempt>>;
    }
}

#[fixture]
fn clock() -> Arc<ManualClock> {
    let start = Utc
        .with_ymd_and_hms(2025, 6, 2, 14, 0, 0)
        .single()
        .expect("valid timestamp");
    Arc::new(ManualClock::new(start))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn records_with_the_clock_instant(clock: Arc<ManualClock>) {
    let repository = Arc::new(InMemoryLoginAttemptRepository::new());
    let auditor = LoginAuditor::new(Arc::clone(&repository), Arc::clone(&clock));
    let user = UserId::new();

    let recorded = auditor
        .record_best_effort(NewLoginAttempt::succeeded(
            "ada@example.com",
            user,
            LoginMethod::Email,
            ClientInfo::new("203.0.113.9", "tests"),
        ))
        .await
        .expect("attempt should be recorded");

    assert_eq!(recorded.created_at(), mockable::Clock::utc(clock.as_ref()));
    let history = repository
        .recent_successes(user, 5)
        .await
        .expect("history lookup");
    assert_eq!(history, vec![recorded]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn swallows_repository_failures(clock: Arc<ManualClock>) {
    let mut store = MockAttemptStore::new();
    store.expect_record().times(1).returning(|_| {
        Err(LoginAttemptRepositoryError::persistence(
            std::io::Error::other("database unavailable"),
        ))
    });
    let auditor = LoginAuditor::new(Arc::new(store), clock);

    let outcome = auditor
        .record_best_effort(NewLoginAttempt::failed(
            "ada@example.com",
            None,
            "User not found",
            LoginMethod::Email,
            ClientInfo::unknown(),
        ))
        .await;

    assert!(outcome.is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn skips_invalid_attempts_without_touching_storage(clock: Arc<ManualClock>) {
    let mut store = MockAttemptStore::new();
    store.expect_record().never();
    let auditor = LoginAuditor::new(Arc::new(store), clock);

    let outcome = auditor
        .record_best_effort(NewLoginAttempt::failed(
            " ",
            None,
            "User not found",
            LoginMethod::Email,
            ClientInfo::unknown(),
        ))
        .await;

    assert!(outcome.is_none());
}
