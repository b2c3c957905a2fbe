//! Then steps for task time tracking BDD scenarios.

use super::world::{TimerWorld, run_async};
use rstest_bdd_macros::then;
use taskwright::task::domain::{Task, TaskQuery, TaskStatus, TrackedMinutes};

fn load(world: &TimerWorld, title: &str) -> Result<Task, eyre::Report> {
    let id = world.task_id(title)?;
    Ok(run_async(world.service.get(world.owner, id))?)
}

fn running_titles(world: &TimerWorld) -> Result<Vec<String>, eyre::Report> {
    let tasks = run_async(world.service.list(world.owner, &TaskQuery::new()))?;
    Ok(tasks
        .into_iter()
        .filter(Task::is_active)
        .map(|task| task.details().title.as_str().to_owned())
        .collect())
}

#[then(r#""{title}" has {minutes:u64} minutes tracked"#)]
fn minutes_tracked(world: &TimerWorld, title: String, minutes: u64) -> Result<(), eyre::Report> {
    let task = load(world, &title)?;
    if task.time_spent() != TrackedMinutes::new(minutes) {
        return Err(eyre::eyre!(
            "expected {minutes} minutes on {title:?}, found {}",
            task.time_spent()
        ));
    }
    Ok(())
}

#[then(r#""{title}" has status "{status}""#)]
fn has_status(world: &TimerWorld, title: String, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task = load(world, &title)?;
    if task.status() != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {}",
            task.status()
        ));
    }
    Ok(())
}

#[then("no timer is running")]
fn no_timer_running(world: &TimerWorld) -> Result<(), eyre::Report> {
    let running = running_titles(world)?;
    if !running.is_empty() {
        return Err(eyre::eyre!("expected no running timers, found {running:?}"));
    }
    Ok(())
}

#[then(r#"only "{title}" is running"#)]
fn only_running(world: &TimerWorld, title: String) -> Result<(), eyre::Report> {
    let running = running_titles(world)?;
    if running != vec![title.clone()] {
        return Err(eyre::eyre!("expected only {title:?} running, found {running:?}"));
    }
    Ok(())
}
