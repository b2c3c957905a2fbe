//! Given steps for task time tracking BDD scenarios.

use super::world::{TimerWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskwright::task::services::CreateTaskRequest;

fn create_task(world: &mut TimerWorld, title: String) -> Result<(), eyre::Report> {
    let created = run_async(
        world
            .service
            .create(world.owner, CreateTaskRequest::new(title.as_str())),
    )
    .wrap_err("create task for timer scenario")?;
    world.tasks.insert(title, created.id());
    Ok(())
}

#[given(r#"an account with a task titled "{title}""#)]
fn account_with_task(world: &mut TimerWorld, title: String) -> Result<(), eyre::Report> {
    create_task(world, title)
}

#[given(r#"the account has a task titled "{title}""#)]
fn account_has_task(world: &mut TimerWorld, title: String) -> Result<(), eyre::Report> {
    create_task(world, title)
}
