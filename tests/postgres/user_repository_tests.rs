//! Account persistence against `PostgreSQL`.

use super::helpers::{base_time, local_user, temporary_database};
use chrono::Duration;
use eyre::ensure;
use rstest::rstest;
use taskwright::{
    pagination::PageRequest,
    user::{
        adapters::postgres::PostgresUserRepository,
        domain::{AuthProvider, EmailAddress, GoogleSubject, User, Username, VerifiedIdentity},
        ports::{UserQuery, UserRepository, UserRepositoryError},
    },
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stored_accounts_are_found_by_username_or_email() -> Result<(), eyre::Report> {
    let Some(db) = temporary_database().await? else {
        return Ok(());
    };
    let repo = PostgresUserRepository::new(db.pool.clone());
    let user = local_user("grace", base_time())?;
    repo.store(&user).await?;

    let by_email = repo.find_by_identifier("grace@example.com").await?;
    let by_username = repo.find_by_identifier("grace").await?;
    ensure!(by_email.as_ref() == Some(&user), "lookup by email failed");
    ensure!(by_username.as_ref() == Some(&user), "lookup by username failed");
    ensure!(
        repo.find_by_identifier("nobody").await?.is_none(),
        "unknown identifier matched"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_email_is_rejected() -> Result<(), eyre::Report> {
    let Some(db) = temporary_database().await? else {
        return Ok(());
    };
    let repo = PostgresUserRepository::new(db.pool.clone());
    repo.store(&local_user("grace", base_time())?).await?;

    let mut clash = local_user("hopper", base_time())?;
    clash.update_profile(
        Username::new("hopper")?,
        EmailAddress::new("grace@example.com")?,
        base_time(),
    );
    let result = repo.store(&clash).await;
    ensure!(
        matches!(result, Err(UserRepositoryError::DuplicateEmail(_))),
        "expected duplicate email, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn updates_and_deletes_round_trip() -> Result<(), eyre::Report> {
    let Some(db) = temporary_database().await? else {
        return Ok(());
    };
    let repo = PostgresUserRepository::new(db.pool.clone());
    let mut user = local_user("grace", base_time())?;
    repo.store(&user).await?;

    let later = base_time() + Duration::hours(1);
    user.record_login(later);
    user.set_active(false, later);
    repo.update(&user).await?;
    let reloaded = repo.find_by_id(user.id()).await?;
    ensure!(reloaded.as_ref() == Some(&user), "update was not persisted");

    repo.delete(user.id()).await?;
    let again = repo.delete(user.id()).await;
    ensure!(
        matches!(again, Err(UserRepositoryError::NotFound(_))),
        "expected not found, got {again:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_filters_and_counts_accounts() -> Result<(), eyre::Report> {
    let Some(db) = temporary_database().await? else {
        return Ok(());
    };
    let repo = PostgresUserRepository::new(db.pool.clone());
    for (offset, name) in ["ada", "adalyn", "bob"].into_iter().enumerate() {
        let joined = base_time() + Duration::days(i64::try_from(offset)?);
        repo.store(&local_user(name, joined)?).await?;
    }
    let google = User::register_google(
        VerifiedIdentity {
            subject: GoogleSubject::new("google-sub-1")?,
            email: EmailAddress::new("carol@example.com")?,
            name: Some("Carol".to_owned()),
            picture: None,
        },
        Username::new("carol")?,
        base_time() + Duration::days(5),
    );
    repo.store(&google).await?;

    let query = UserQuery {
        search: Some("ADA".to_owned()),
        ..UserQuery::default()
    };
    let page = repo.list(&query, PageRequest::new(1, 10)?).await?;
    let names: Vec<_> = page
        .items
        .iter()
        .filter_map(|user| user.username().map(|name| name.as_str().to_owned()))
        .collect();
    ensure!(names == ["adalyn", "ada"], "unexpected search result {names:?}");
    ensure!(page.total == 2, "unexpected total {}", page.total);

    let google_only = UserQuery {
        provider: Some(AuthProvider::Google),
        ..UserQuery::default()
    };
    let google_page = repo.list(&google_only, PageRequest::new(1, 10)?).await?;
    ensure!(google_page.total == 1, "expected one google account");

    let counts = repo.counts(base_time() + Duration::days(2)).await?;
    ensure!(counts.total == 4, "unexpected total {}", counts.total);
    ensure!(counts.google == 1 && counts.local == 3, "unexpected provider split");
    ensure!(counts.recent_signups == 2, "unexpected recent {}", counts.recent_signups);
    Ok(())
}
