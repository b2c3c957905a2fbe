//! Account flows with real hashing, signing and auditing.

use super::helpers::{App, PASSWORD, app};
use chrono::TimeDelta;
use rstest::rstest;
use taskwright::{
    login_audit::{
        domain::{ClientInfo, LoginAttemptQuery},
        ports::LoginAttemptRepository,
    },
    pagination::PageRequest,
    user::services::AuthError,
};

fn browser() -> ClientInfo {
    ClientInfo::new("203.0.113.9", "Mozilla/5.0")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registered_accounts_sign_in_by_email_or_username(app: App) -> Result<(), eyre::Report> {
    let registered = app.sign_up("ada").await?;

    let by_email = app
        .auth
        .login("ADA@example.com", PASSWORD, browser())
        .await?;
    let by_username = app.auth.login("ada", PASSWORD, browser()).await?;

    let expected = registered.user.id();
    eyre::ensure!(by_email.user.id() == expected, "email login resolved another account");
    eyre::ensure!(by_username.user.id() == expected, "username login resolved another account");
    let authenticated = app.auth.authenticate(&by_username.token.token).await?;
    eyre::ensure!(authenticated.id() == expected, "token resolved another account");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_logins_are_audited_with_reasons(app: App) -> Result<(), eyre::Report> {
    let session = app.sign_up("grace").await?;

    let wrong = app.auth.login("grace", "not the password", browser()).await;
    assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
    app.clock.advance_minutes(1);
    let unknown = app.auth.login("nobody", PASSWORD, browser()).await;
    assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));

    let page = app
        .attempts
        .list(&LoginAttemptQuery::new(), PageRequest::default())
        .await?;
    let reasons: Vec<_> = page
        .items
        .iter()
        .map(|attempt| attempt.failure_reason().map(str::to_owned))
        .collect();
    let newest_first = vec![
        Some("User not found".to_owned()),
        Some("Invalid password".to_owned()),
    ];
    eyre::ensure!(reasons == newest_first, "unexpected audit trail: {reasons:?}");
    let resolved = page.items.last().and_then(|attempt| attempt.user_id());
    eyre::ensure!(
        resolved == Some(session.user.id()),
        "failed attempt not linked to account"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deactivated_accounts_cannot_sign_in(app: App) -> Result<(), eyre::Report> {
    let session = app.sign_up("alan").await?;
    app.admin.set_user_active(session.user.id(), false).await?;

    let result = app.auth.login("alan", PASSWORD, browser()).await;

    assert!(matches!(result, Err(AuthError::AccountDeactivated)));
    let token_result = app.auth.authenticate(&session.token.token).await;
    assert!(token_result.is_err());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tokens_expire_with_the_clock(app: App) -> Result<(), eyre::Report> {
    let session = app.sign_up("edsger").await?;
    app.clock.advance(TimeDelta::hours(2));

    let result = app.auth.authenticate(&session.token.token).await;

    assert!(matches!(result, Err(AuthError::Token(_))));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn profile_updates_respect_uniqueness(app: App) -> Result<(), eyre::Report> {
    let ada = app.sign_up("ada").await?;
    app.sign_up("grace").await?;

    let clash = app
        .auth
        .update_profile(ada.user.id(), "grace", "ada@example.com")
        .await;
    assert!(matches!(clash, Err(AuthError::AlreadyExists { field: "username" })));

    let renamed = app
        .auth
        .update_profile(ada.user.id(), "countess", "lovelace@example.com")
        .await?;
    eyre::ensure!(
        renamed.username().map(|name| name.as_str()) == Some("countess"),
        "username not updated"
    );
    app.auth.login("lovelace@example.com", PASSWORD, browser()).await?;
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn google_tokens_signed_by_unknown_keys_are_rejected(app: App) {
    let result = app.auth.google_sign_in("not-a-jwt", browser()).await;
    assert!(matches!(result, Err(AuthError::Identity(_))));
}
