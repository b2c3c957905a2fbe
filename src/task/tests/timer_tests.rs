//! Timer accounting, single-timer switching, and read-time values.

use crate::task::domain::{
    Task, TaskChange, TaskDetails, TaskDraft, TaskId, TaskPatch, TaskStatus, TaskTitle,
    TimeRemaining, TimerState, TrackedMinutes, elapsed_minutes,
};
use crate::user::domain::UserId;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rstest::{fixture, rstest};

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 14, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn task_for(owner: UserId, title: &str, status: TaskStatus, at: DateTime<Utc>) -> Task {
    Task::create(
        TaskDraft::new(
            owner,
            TaskDetails::new(TaskTitle::new(title).expect("valid title")),
        )
        .with_status(status),
        at,
    )
}

#[rstest]
#[case(TimeDelta::seconds(59), 0)]
#[case(TimeDelta::seconds(60), 1)]
#[case(TimeDelta::minutes(90) + TimeDelta::seconds(59), 90)]
#[case(TimeDelta::minutes(-5), 0)]
fn elapsed_minutes_are_floored(
    now: DateTime<Utc>,
    #[case] offset: TimeDelta,
    #[case] expected: u64,
) {
    assert_eq!(elapsed_minutes(now, now + offset), TrackedMinutes::new(expected));
}

#[rstest]
#[case(0, "No time logged")]
#[case(45, "45m")]
#[case(60, "1h 0m")]
#[case(135, "2h 15m")]
fn tracked_minutes_render_for_humans(#[case] minutes: u64, #[case] expected: &str) {
    assert_eq!(TrackedMinutes::new(minutes).to_human(), expected);
}

#[rstest]
fn timer_columns_round_trip_through_state(now: DateTime<Utc>) {
    assert_eq!(
        TimerState::from_columns(true, Some(now), None),
        Some(TimerState::Running { since: now })
    );
    assert_eq!(TimerState::from_columns(true, None, None), None);
    assert_eq!(TimerState::from_columns(true, Some(now), Some(now)), None);
    assert_eq!(TimerState::from_columns(false, Some(now), None), None);
}

#[rstest]
fn sessions_accumulate_across_starts_and_stops(now: DateTime<Utc>) {
    let mut task = task_for(UserId::new(), "Write docs", TaskStatus::Todo, now);

    assert_eq!(task.start_timer(now), TrackedMinutes::ZERO);
    assert_eq!(task.status(), TaskStatus::InProgress);
    assert_eq!(task.stop_timer(now + TimeDelta::minutes(25)), TrackedMinutes::new(25));

    let second = now + TimeDelta::hours(1);
    assert_eq!(task.start_timer(second), TrackedMinutes::ZERO);
    assert_eq!(task.stop_timer(second + TimeDelta::minutes(20)), TrackedMinutes::new(20));

    assert_eq!(task.time_spent(), TrackedMinutes::new(45));
    assert_eq!(task.timer(), TimerState::Idle);
    assert_eq!(task.status(), TaskStatus::InProgress);
}

#[rstest]
fn stopping_an_idle_timer_is_a_no_op(now: DateTime<Utc>) {
    let mut task = task_for(UserId::new(), "Idle", TaskStatus::Todo, now);
    let before = task.clone();

    assert_eq!(task.stop_timer(now + TimeDelta::hours(3)), TrackedMinutes::ZERO);
    assert_eq!(task, before);
}

#[rstest]
fn restarting_a_running_timer_flushes_the_old_session(now: DateTime<Utc>) {
    let mut task = task_for(UserId::new(), "Busy", TaskStatus::InProgress, now);
    let restart = now + TimeDelta::minutes(12);

    assert_eq!(task.start_timer(restart), TrackedMinutes::new(12));
    assert_eq!(task.started_at(), Some(restart));
}

#[rstest]
fn starting_a_completed_task_reopens_it(now: DateTime<Utc>) {
    let mut task = task_for(UserId::new(), "Done", TaskStatus::Completed, now);

    task.start_timer(now + TimeDelta::minutes(1));

    assert_eq!(task.status(), TaskStatus::InProgress);
    assert_eq!(task.completed_at(), None);
    assert!(task.is_active());
}

#[rstest]
fn starting_a_timer_stops_the_owners_other_running_task(now: DateTime<Utc>) {
    let owner = UserId::new();
    let running = task_for(owner, "Running", TaskStatus::InProgress, now);
    let idle = task_for(owner, "Idle", TaskStatus::Todo, now);
    let target = task_for(owner, "Target", TaskStatus::Todo, now);
    let switch_at = now + TimeDelta::minutes(30);
    let mut owned = vec![running.clone(), idle.clone(), target.clone()];

    let outcome = TaskChange::StartTimer.apply_all(&mut owned, &[target.id()], switch_at);

    assert_eq!(outcome.modified, vec![running.id(), target.id()]);
    let writes: Vec<TaskId> = outcome.writes(&owned).into_iter().map(Task::id).collect();
    assert_eq!(writes, vec![running.id(), target.id()]);
    let stopped = owned.first().expect("running task");
    assert_eq!(stopped.time_spent(), TrackedMinutes::new(30));
    assert!(!stopped.is_active());
    let started = outcome.results.first().expect("one result");
    assert!(started.changed);
    assert_eq!(started.task.started_at(), Some(switch_at));
}

#[rstest]
fn an_edit_into_progress_switches_and_keeps_field_changes(now: DateTime<Utc>) {
    let owner = UserId::new();
    let running = task_for(owner, "Running", TaskStatus::InProgress, now);
    let target = task_for(owner, "Target", TaskStatus::Todo, now);
    let mut owned = vec![target.clone(), running.clone()];
    let patch = TaskPatch::new()
        .with_title(TaskTitle::new("Renamed").expect("valid title"))
        .with_status(TaskStatus::InProgress);

    let outcome =
        TaskChange::Edit(patch).apply_all(&mut owned, &[target.id()], now + TimeDelta::minutes(5));

    let writes: Vec<TaskId> = outcome.writes(&owned).into_iter().map(Task::id).collect();
    assert_eq!(writes, vec![running.id(), target.id()]);
    let edited = outcome.results.first().expect("one result");
    assert_eq!(edited.task.details().title.as_str(), "Renamed");
    assert!(edited.task.is_active());
    assert_eq!(owned.iter().filter(|task| task.is_active()).count(), 1);
}

#[rstest]
fn unknown_identifiers_and_idle_stops_change_nothing(now: DateTime<Utc>) {
    let owner = UserId::new();
    let idle = task_for(owner, "Idle", TaskStatus::Todo, now);
    let mut owned = vec![idle.clone()];

    let outcome = TaskChange::StopTimer.apply_all(&mut owned, &[TaskId::new(), idle.id()], now);

    assert!(outcome.modified.is_empty());
    let result = outcome.results.first().expect("idle task result");
    assert!(!result.changed);
    assert_eq!(outcome.results.len(), 1);
}

#[rstest]
#[case(TimeDelta::days(3) + TimeDelta::hours(2), TimeRemaining::Days(3), "3 days")]
#[case(TimeDelta::days(1), TimeRemaining::Days(1), "1 day")]
#[case(TimeDelta::hours(5), TimeRemaining::Hours(5), "5 hours")]
#[case(TimeDelta::minutes(61), TimeRemaining::Hours(1), "1 hour")]
#[case(TimeDelta::minutes(59), TimeRemaining::LessThanAnHour, "less than 1 hour")]
#[case(TimeDelta::minutes(-1), TimeRemaining::Overdue, "overdue")]
fn time_remaining_is_coarse(
    now: DateTime<Utc>,
    #[case] until_due: TimeDelta,
    #[case] expected: TimeRemaining,
    #[case] rendered: &str,
) {
    let remaining = TimeRemaining::until(now + until_due, now);
    assert_eq!(remaining, expected);
    assert_eq!(remaining.to_string(), rendered);
}

#[rstest]
fn timing_includes_the_running_session(now: DateTime<Utc>) {
    let mut task = task_for(UserId::new(), "Track me", TaskStatus::Todo, now);
    task.start_timer(now);
    task.stop_timer(now + TimeDelta::minutes(50));
    task.start_timer(now + TimeDelta::hours(1));

    let timing = task.timing(now + TimeDelta::hours(1) + TimeDelta::minutes(25));

    assert_eq!(timing.current_session_minutes, TrackedMinutes::new(25));
    assert_eq!(timing.total_time_formatted, "1h 15m");
    assert!(!timing.is_overdue);
    assert_eq!(timing.time_remaining, None);
}

#[rstest]
fn completed_tasks_are_never_overdue(now: DateTime<Utc>) {
    let owner = UserId::new();
    let due = now - TimeDelta::days(1);
    let draft = |status| {
        TaskDraft::new(
            owner,
            TaskDetails::new(TaskTitle::new("Deadline").expect("valid title")),
        )
        .with_status(status)
        .with_due_date(due)
    };

    let open = Task::create(draft(TaskStatus::Todo), now).timing(now);
    assert!(open.is_overdue);
    assert_eq!(open.time_remaining, Some(TimeRemaining::Overdue));

    let done = Task::create(draft(TaskStatus::Completed), now).timing(now);
    assert!(!done.is_overdue);
    assert_eq!(done.time_remaining, None);
}
