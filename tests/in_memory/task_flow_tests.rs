//! Task lifecycle flows for signed-in accounts.

use super::helpers::{App, app};
use chrono::TimeDelta;
use mockable::Clock;
use rstest::rstest;
use taskwright::task::{
    domain::{TaskQuery, TaskStatus, TrackedMinutes},
    services::{CreateTaskRequest, TaskLifecycleError, UpdateTaskRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_working_day_accumulates_tracked_time(app: App) -> Result<(), eyre::Report> {
    let owner = app.sign_up("ada").await?.user.id();
    let report = app
        .tasks
        .create(owner, CreateTaskRequest::new("Quarterly report"))
        .await?;
    let review = app
        .tasks
        .create(owner, CreateTaskRequest::new("Code review"))
        .await?;

    app.tasks.start_timer(owner, report.id()).await?;
    app.clock.advance(TimeDelta::minutes(95));
    app.tasks.start_timer(owner, review.id()).await?;
    app.clock.advance(TimeDelta::minutes(30));
    app.tasks
        .update(
            owner,
            review.id(),
            UpdateTaskRequest::new().with_status(TaskStatus::Completed),
        )
        .await?;

    let report_view = app.tasks.view(owner, report.id()).await?;
    let review_view = app.tasks.view(owner, review.id()).await?;
    eyre::ensure!(
        report_view.task.time_spent() == TrackedMinutes::new(95),
        "report tracked {} minutes",
        report_view.task.time_spent()
    );
    eyre::ensure!(report_view.timing.total_time_formatted == "1h 35m", "bad report format");
    eyre::ensure!(
        review_view.task.time_spent() == TrackedMinutes::new(30),
        "review tracked {} minutes",
        review_view.task.time_spent()
    );
    eyre::ensure!(review_view.task.completed_at() == Some(app.clock.utc()), "no completion");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn accounts_see_only_their_own_tasks(app: App) -> Result<(), eyre::Report> {
    let ada = app.sign_up("ada").await?.user.id();
    let grace = app.sign_up("grace").await?.user.id();
    let private = app
        .tasks
        .create(ada, CreateTaskRequest::new("Private notes"))
        .await?;

    let listed = app.tasks.list(grace, &TaskQuery::new()).await?;
    eyre::ensure!(listed.is_empty(), "foreign task leaked into listing");

    let stolen = app
        .tasks
        .update(grace, private.id(), UpdateTaskRequest::new().with_title("Mine now"))
        .await;
    assert!(matches!(stolen, Err(TaskLifecycleError::NotFound(_))));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_starts_leave_one_timer_running(app: App) -> Result<(), eyre::Report> {
    let owner = app.sign_up("ada").await?.user.id();
    let mut ids = Vec::new();
    for title in ["One", "Two", "Three", "Four"] {
        ids.push(app.tasks.create(owner, CreateTaskRequest::new(title)).await?.id());
    }

    let mut handles = Vec::new();
    for id in ids {
        let service = app.tasks.clone();
        handles.push(tokio::spawn(async move { service.start_timer(owner, id).await }));
    }
    for handle in handles {
        handle.await??;
    }

    let running = app
        .tasks
        .list(owner, &TaskQuery::new())
        .await?
        .into_iter()
        .filter(|task| task.is_active())
        .count();
    eyre::ensure!(running == 1, "{running} timers running");
    Ok(())
}
