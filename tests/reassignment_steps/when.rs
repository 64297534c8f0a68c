//! When steps for task reassignment BDD scenarios.

use super::world::{ReassignmentWorld, run_async};
use chrono::Duration;
use eyre::WrapErr;
use rstest_bdd_macros::when;
use trellis::{identity::domain::Email, task::services::TaskRequest};

#[when(r#"the task is reassigned to "{assignee}""#)]
fn reassign(world: &mut ReassignmentWorld, assignee: String) -> Result<(), eyre::Report> {
    let (_, admin) = world.project()?;
    let task = world.current_task()?;
    world.clock.advance(Duration::minutes(1));

    let request = TaskRequest::new(task.content().title())
        .with_status(task.status())
        .with_priority(task.content().priority())
        .with_assignee(Email::new(assignee)?);
    run_async(world.tasks.update_task(task.id(), &admin, request))
        .wrap_err("update scenario task")?;
    Ok(())
}

#[when(r#""{member}" is removed from the project"#)]
fn remove_member(world: &mut ReassignmentWorld, member: String) -> Result<(), eyre::Report> {
    let (project_id, admin) = world.project()?;
    let target = Email::new(member)?;
    run_async(world.memberships.remove_member(project_id, &admin, &target))
        .wrap_err("remove scenario member")?;
    Ok(())
}
