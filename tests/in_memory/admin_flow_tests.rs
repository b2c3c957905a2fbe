//! Administration over accounts created through real sign-in flows.

use super::helpers::{App, PASSWORD, app};
use rstest::rstest;
use taskwright::{
    admin::services::AdminError,
    login_audit::domain::ClientInfo,
    pagination::PageRequest,
    task::{domain::TaskStatus, services::CreateTaskRequest},
    user::{ports::UserQuery, services::AdminBootstrap},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dashboard_reflects_activity(app: App) -> Result<(), eyre::Report> {
    let ada = app.sign_up("ada").await?.user.id();
    app.sign_up("grace").await?;
    app.auth.login("ada", PASSWORD, ClientInfo::unknown()).await?;
    let failed = app.auth.login("ada", "wrong password", ClientInfo::unknown()).await;
    eyre::ensure!(failed.is_err(), "wrong password accepted");
    app.tasks
        .create(
            ada,
            CreateTaskRequest::new("Ship").with_status(TaskStatus::Completed),
        )
        .await?;

    let dashboard = app.admin.dashboard().await?;

    eyre::ensure!(dashboard.user_stats.total == 2, "user total");
    eyre::ensure!(dashboard.user_stats.recent_signups == 2, "recent signups");
    eyre::ensure!(dashboard.login_stats.total_attempts == 2, "login attempts");
    eyre::ensure!(dashboard.login_stats.unique_emails == 1, "unique emails");
    eyre::ensure!(dashboard.task_stats.completed == 1, "completed tasks");
    let leader = dashboard.top_users.first().map(|top| top.user_id);
    eyre::ensure!(leader == Some(ada), "top user");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bootstrapped_admin_is_protected_from_deletion(app: App) -> Result<(), eyre::Report> {
    let admin = app
        .auth
        .bootstrap_admin(AdminBootstrap {
            email: "root@example.com".to_owned(),
            username: "root".to_owned(),
            password: "s3cret-admin".to_owned(),
            name: Some("Root".to_owned()),
        })
        .await?;
    eyre::ensure!(admin.is_admin(), "bootstrap did not grant admin role");

    let result = app.admin.delete_user(admin.id()).await;
    assert!(matches!(result, Err(AdminError::Forbidden(_))));

    let session = app
        .auth
        .login("root", "s3cret-admin", ClientInfo::unknown())
        .await?;
    eyre::ensure!(session.user.id() == admin.id(), "admin login");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moderation_filters_and_removes_accounts(app: App) -> Result<(), eyre::Report> {
    let ada = app.sign_up("ada").await?.user.id();
    let grace = app.sign_up("grace").await?.user.id();
    app.tasks.create(grace, CreateTaskRequest::new("Compiler")).await?;
    app.admin.set_user_active(ada, false).await?;

    let inactive = app
        .admin
        .list_users(
            &UserQuery {
                active: Some(false),
                ..UserQuery::default()
            },
            PageRequest::default(),
        )
        .await?;
    let inactive_ids: Vec<_> = inactive.items.iter().map(|row| row.user.id()).collect();
    eyre::ensure!(inactive_ids == vec![ada], "inactive filter returned {inactive_ids:?}");

    let removed = app.admin.delete_user(grace).await?;
    eyre::ensure!(removed == 1, "removed {removed} tasks");
    let missing = app.admin.user_tasks(grace).await;
    assert!(matches!(missing, Err(AdminError::UserNotFound(_))));
    Ok(())
}
