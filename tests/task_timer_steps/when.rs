//! When steps for task time tracking BDD scenarios.

use super::world::{TimerWorld, run_async};
use chrono::TimeDelta;
use eyre::WrapErr;
use rstest_bdd_macros::when;
use taskwright::task::{domain::TaskStatus, services::UpdateTaskRequest};

#[when(r#"the timer of "{title}" is started"#)]
fn timer_started(world: &mut TimerWorld, title: String) -> Result<(), eyre::Report> {
    let id = world.task_id(&title)?;
    run_async(world.service.start_timer(world.owner, id)).wrap_err("start timer")?;
    Ok(())
}

#[when(r#"the timer of "{title}" is stopped"#)]
fn timer_stopped(world: &mut TimerWorld, title: String) -> Result<(), eyre::Report> {
    let id = world.task_id(&title)?;
    run_async(world.service.stop_timer(world.owner, id)).wrap_err("stop timer")?;
    Ok(())
}

#[when("{minutes:u32} minutes and {seconds:u32} seconds pass")]
fn time_passes(world: &mut TimerWorld, minutes: u32, seconds: u32) {
    world.clock.advance(
        TimeDelta::minutes(i64::from(minutes)) + TimeDelta::seconds(i64::from(seconds)),
    );
}

#[when(r#""{title}" is marked "{status}""#)]
fn task_marked(world: &mut TimerWorld, title: String, status: String) -> Result<(), eyre::Report> {
    let id = world.task_id(&title)?;
    let target = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    run_async(world.service.update(
        world.owner,
        id,
        UpdateTaskRequest::new().with_status(target),
    ))
    .wrap_err("update task status")?;
    Ok(())
}
