//! Login audit trail against `PostgreSQL`.

use super::helpers::{base_time, temporary_database};
use chrono::Duration;
use eyre::ensure;
use rstest::rstest;
use taskwright::{
    login_audit::{
        adapters::postgres::PostgresLoginAttemptRepository,
        domain::{ClientInfo, LoginAttempt, LoginAttemptQuery, LoginMethod, NewLoginAttempt},
        ports::LoginAttemptRepository,
    },
    pagination::PageRequest,
    user::domain::UserId,
};

async fn seed(
    repo: &PostgresLoginAttemptRepository,
    user: UserId,
) -> Result<Vec<LoginAttempt>, eyre::Report> {
    let client = ClientInfo::new("203.0.113.7", "curl/8.0");
    let attempts = [
        NewLoginAttempt::succeeded("ada@example.com", user, LoginMethod::Email, client.clone()),
        NewLoginAttempt::failed(
            "ada@example.com",
            Some(user),
            "Invalid password",
            LoginMethod::Email,
            client.clone(),
        ),
        NewLoginAttempt::failed(
            "mallory",
            None,
            "User not found",
            LoginMethod::Email,
            client.clone(),
        ),
        NewLoginAttempt::succeeded("ada@example.com", user, LoginMethod::GoogleSignin, client),
    ];
    let mut recorded = Vec::new();
    for (minutes, attempt) in (0_i64..).zip(attempts) {
        let stored = LoginAttempt::record(attempt, base_time() + Duration::minutes(minutes))?;
        repo.record(&stored).await?;
        recorded.push(stored);
    }
    Ok(recorded)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn attempts_page_newest_first() -> Result<(), eyre::Report> {
    let Some(db) = temporary_database().await? else {
        return Ok(());
    };
    let repo = PostgresLoginAttemptRepository::new(db.pool.clone());
    let recorded = seed(&repo, UserId::new()).await?;

    let first = repo
        .list(&LoginAttemptQuery::new(), PageRequest::new(1, 3)?)
        .await?;
    ensure!(first.total == 4 && first.has_next, "unexpected page {first:?}");
    ensure!(
        first.items.first() == recorded.last(),
        "newest attempt should lead"
    );
    let second = repo
        .list(&LoginAttemptQuery::new(), PageRequest::new(2, 3)?)
        .await?;
    ensure!(
        second.items.as_slice() == recorded.get(..1).unwrap_or_default(),
        "oldest attempt should trail"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn filters_select_matching_attempts() -> Result<(), eyre::Report> {
    let Some(db) = temporary_database().await? else {
        return Ok(());
    };
    let repo = PostgresLoginAttemptRepository::new(db.pool.clone());
    let user = UserId::new();
    seed(&repo, user).await?;
    let page = PageRequest::new(1, 10)?;

    let failures = LoginAttemptQuery {
        success: Some(false),
        ..LoginAttemptQuery::default()
    };
    ensure!(repo.list(&failures, page).await?.total == 2, "failure filter");

    let by_email = LoginAttemptQuery {
        email: Some("MALL".to_owned()),
        ..LoginAttemptQuery::default()
    };
    ensure!(repo.list(&by_email, page).await?.total == 1, "email filter");

    let mine = repo
        .list(&LoginAttemptQuery::new().for_user(user), page)
        .await?;
    ensure!(mine.total == 3, "user filter returned {}", mine.total);

    let recent = repo.recent_successes(user, 5).await?;
    ensure!(
        recent
            .iter()
            .map(LoginAttempt::method)
            .eq([LoginMethod::GoogleSignin, LoginMethod::Email]),
        "unexpected successes {recent:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stats_cover_the_window() -> Result<(), eyre::Report> {
    let Some(db) = temporary_database().await? else {
        return Ok(());
    };
    let repo = PostgresLoginAttemptRepository::new(db.pool.clone());
    seed(&repo, UserId::new()).await?;

    let all = repo.stats_since(base_time()).await?;
    ensure!(
        (all.total_attempts, all.successful, all.failed, all.unique_emails) == (4, 2, 2, 2),
        "unexpected stats {all:?}"
    );
    ensure!(all.success_rate.to_bits() == 50.0_f64.to_bits(), "rate");

    let late = repo.stats_since(base_time() + Duration::minutes(2)).await?;
    ensure!(late.total_attempts == 2 && late.unique_emails == 2, "window {late:?}");
    Ok(())
}
