//! Task persistence, per-owner changes, and aggregates against `PostgreSQL`.

use super::helpers::{base_time, temporary_database};
use chrono::Duration;
use eyre::ensure;
use rstest::rstest;
use taskwright::{
    task::{
        adapters::postgres::PostgresTaskRepository,
        domain::{
            SortOrder, Task, TaskChange, TaskDetails, TaskDraft, TaskPatch, TaskPriority,
            TaskQuery, TaskSortKey, TaskStatus, TaskTag, TaskTitle,
        },
        ports::{TaskRepository, TaskRepositoryError, TaskScope},
    },
    user::domain::UserId,
};

fn draft(owner: UserId, title: &str) -> Result<TaskDraft, eyre::Report> {
    Ok(TaskDraft::new(owner, TaskDetails::new(TaskTitle::new(title)?)))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn timer_states_survive_a_round_trip() -> Result<(), eyre::Report> {
    let Some(db) = temporary_database().await? else {
        return Ok(());
    };
    let repo = PostgresTaskRepository::new(db.pool.clone());
    let owner = UserId::new();

    let details = TaskDetails::new(TaskTitle::new("Write report")?)
        .with_tags(TaskTag::parse_all(["writing", "q3"])?);
    let running = Task::create(
        TaskDraft::new(owner, details)
            .with_status(TaskStatus::InProgress)
            .with_priority(TaskPriority::High),
        base_time(),
    );
    let mut done = Task::create(draft(owner, "Archive")?, base_time());
    done.start_timer(base_time());
    done.apply_status_change(TaskStatus::Completed, base_time() + Duration::minutes(42));

    for task in [&running, &done] {
        repo.store(task).await?;
        let loaded = repo.find_by_id(task.id()).await?;
        ensure!(loaded.as_ref() == Some(task), "task {} changed in storage", task.id());
    }
    ensure!(done.time_spent().value() == 42, "completion did not flush");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn exclusive_start_stops_the_owners_other_timer() -> Result<(), eyre::Report> {
    let Some(db) = temporary_database().await? else {
        return Ok(());
    };
    let repo = PostgresTaskRepository::new(db.pool.clone());
    let owner = UserId::new();
    let neighbour = UserId::new();

    let first = Task::create(draft(owner, "First")?, base_time());
    let second = Task::create(draft(owner, "Second")?, base_time());
    let theirs = Task::create(
        draft(neighbour, "Theirs")?.with_status(TaskStatus::InProgress),
        base_time(),
    );
    for task in [&first, &second, &theirs] {
        repo.store(task).await?;
    }

    repo.apply_change(owner, &[first.id()], &TaskChange::StartTimer, base_time())
        .await?;
    let switched = repo
        .apply_change(
            owner,
            &[second.id()],
            &TaskChange::StartTimer,
            base_time() + Duration::minutes(25),
        )
        .await?;
    ensure!(
        switched.first().is_some_and(|result| result.task.is_active()),
        "second not running"
    );

    let stopped = repo.find_by_id(first.id()).await?;
    ensure!(
        stopped
            .as_ref()
            .is_some_and(|task| !task.is_active() && task.time_spent().value() == 25),
        "first timer not flushed: {stopped:?}"
    );
    let untouched = repo.find_by_id(theirs.id()).await?;
    ensure!(
        untouched.as_ref().is_some_and(Task::is_active),
        "another owner's timer was stopped"
    );

    let foreign = repo
        .apply_change(owner, &[theirs.id()], &TaskChange::StartTimer, base_time())
        .await?;
    ensure!(foreign.is_empty(), "foreign task was started");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn an_edit_reads_the_locked_state_not_a_stale_copy() -> Result<(), eyre::Report> {
    let Some(db) = temporary_database().await? else {
        return Ok(());
    };
    let repo = PostgresTaskRepository::new(db.pool.clone());
    let owner = UserId::new();
    let first = Task::create(draft(owner, "First")?, base_time());
    let second = Task::create(draft(owner, "Second")?, base_time());
    for task in [&first, &second] {
        repo.store(task).await?;
    }
    repo.apply_change(owner, &[first.id()], &TaskChange::StartTimer, base_time())
        .await?;
    let stale = repo.find_by_id(first.id()).await?;
    ensure!(stale.as_ref().is_some_and(Task::is_active), "first not running");

    repo.apply_change(
        owner,
        &[second.id()],
        &TaskChange::StartTimer,
        base_time() + Duration::minutes(20),
    )
    .await?;
    let rename = TaskChange::Edit(TaskPatch::new().with_title(TaskTitle::new("Renamed")?));
    let edited = repo
        .apply_change(owner, &[first.id()], &rename, base_time() + Duration::minutes(30))
        .await?;

    ensure!(
        edited.first().is_some_and(|result| {
            !result.task.is_active()
                && result.task.time_spent().value() == 20
                && result.task.details().title.as_str() == "Renamed"
        }),
        "edit restored the stale timer: {edited:?}"
    );
    let counts = repo.list_for_owner(owner, &TaskQuery::new()).await?;
    let running = counts.iter().filter(|task| task.is_active()).count();
    ensure!(running == 1, "expected one running timer, found {running}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn store_with_change_is_all_or_nothing() -> Result<(), eyre::Report> {
    let Some(db) = temporary_database().await? else {
        return Ok(());
    };
    let repo = PostgresTaskRepository::new(db.pool.clone());
    let owner = UserId::new();
    let running = Task::create(
        draft(owner, "Running")?.with_status(TaskStatus::InProgress),
        base_time(),
    );
    repo.store(&running).await?;

    let fresh = Task::create(draft(owner, "Fresh")?, base_time() + Duration::minutes(15));
    let started = repo
        .store_with_change(&fresh, &TaskChange::StartTimer, base_time() + Duration::minutes(15))
        .await?;
    ensure!(started.task.is_active(), "new task not running");
    let stopped = repo.find_by_id(running.id()).await?;
    ensure!(
        stopped
            .as_ref()
            .is_some_and(|task| !task.is_active() && task.time_spent().value() == 15),
        "previous timer not flushed: {stopped:?}"
    );

    let duplicate = repo
        .store_with_change(&running, &TaskChange::StartTimer, base_time() + Duration::hours(1))
        .await;
    ensure!(
        matches!(duplicate, Err(TaskRepositoryError::DuplicateTask(id)) if id == running.id()),
        "duplicate insert was not rejected: {duplicate:?}"
    );
    let still_running = repo.find_by_id(fresh.id()).await?;
    ensure!(
        still_running.as_ref().is_some_and(Task::is_active),
        "rolled back insert stopped the running timer"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_and_aggregates_follow_the_query() -> Result<(), eyre::Report> {
    let Some(db) = temporary_database().await? else {
        return Ok(());
    };
    let repo = PostgresTaskRepository::new(db.pool.clone());
    let busy = UserId::new();
    let quiet = UserId::new();
    let now = base_time() + Duration::days(3);

    let overdue = Task::create(
        draft(busy, "Overdue")?
            .with_priority(TaskPriority::High)
            .with_due_date(base_time()),
        base_time(),
    );
    let finished = Task::create(
        draft(busy, "Finished")?
            .with_status(TaskStatus::Completed)
            .with_due_date(base_time()),
        base_time() + Duration::hours(1),
    );
    let undated = Task::create(
        draft(busy, "Undated")?.with_priority(TaskPriority::Low),
        base_time() + Duration::hours(2),
    );
    let solo = Task::create(draft(quiet, "Solo")?, base_time());
    for task in [&overdue, &finished, &undated, &solo] {
        repo.store(task).await?;
    }

    let by_priority = TaskQuery::new().sorted_by(TaskSortKey::Priority, SortOrder::Desc);
    let listed = repo.list_for_owner(busy, &by_priority).await?;
    let titles: Vec<_> = listed
        .iter()
        .map(|task| task.details().title.as_str().to_owned())
        .collect();
    ensure!(
        titles == ["Overdue", "Finished", "Undated"],
        "unexpected order {titles:?}"
    );

    let open = TaskQuery::new().with_status(TaskStatus::Todo);
    ensure!(
        repo.list_for_owner(busy, &open).await?.len() == 2,
        "status filter ignored"
    );

    let counts = repo.status_counts(TaskScope::Owner(busy), now).await?;
    ensure!(counts.total == 3 && counts.completed == 1, "unexpected {counts:?}");
    ensure!(counts.overdue == 1, "completed task counted as overdue");
    let everything = repo.status_counts(TaskScope::All, now).await?;
    ensure!(everything.total == 4, "unexpected {everything:?}");

    let leaders = repo.top_owners(1).await?;
    ensure!(
        leaders
            .first()
            .is_some_and(|top| top.owner == busy && top.total == 3 && top.completed == 1),
        "unexpected leaders {leaders:?}"
    );

    ensure!(repo.delete_by_owner(busy).await? == 3, "cascade count");
    ensure!(
        repo.list_for_owner(busy, &TaskQuery::new()).await?.is_empty(),
        "tasks survived owner deletion"
    );
    Ok(())
}
