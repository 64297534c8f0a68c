//! Given steps for task reassignment BDD scenarios.

use super::world::{ReassignmentWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use trellis::{
    identity::domain::Email,
    membership::domain::ProjectRole,
    task::services::TaskRequest,
};

#[given(r#"a project administered by "{admin}" with active employees "{first}" and "{second}""#)]
fn project_with_employees(
    world: &mut ReassignmentWorld,
    admin: String,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    let admin_email = world.register(&admin)?;
    let project = run_async(world.memberships.create_project(&admin_email, "Waterworks"))
        .wrap_err("create scenario project")?;

    for address in [first, second] {
        let employee = world.register(&address)?;
        run_async(world.memberships.invite_member(
            project.id,
            &admin_email,
            &employee,
            Some(ProjectRole::Employee),
        ))
        .wrap_err("invite scenario employee")?;
        let invite = world
            .mailer
            .last_invite_for(&employee)
            .ok_or_else(|| eyre::eyre!("missing invitation mail"))?;
        run_async(world.memberships.accept_invite(invite.token.as_str()))
            .wrap_err("accept scenario invitation")?;
    }

    world.project_id = Some(project.id);
    world.admin = Some(admin_email);
    Ok(())
}

#[given(r#"a task "{title}" assigned to "{assignee}""#)]
fn task_assigned(
    world: &mut ReassignmentWorld,
    title: String,
    assignee: String,
) -> Result<(), eyre::Report> {
    let (project_id, admin) = world.project()?;
    let request = TaskRequest::new(title).with_assignee(Email::new(assignee)?);
    let task = run_async(world.tasks.create_task(project_id, &admin, request))
        .wrap_err("create scenario task")?;
    world.task_id = Some(task.id());
    world.assigned_before = Some(task.last_assigned_at());
    Ok(())
}

#[given("the assignee has seen the task")]
fn assignee_saw_task(world: &mut ReassignmentWorld) -> Result<(), eyre::Report> {
    let task = world.current_task()?;
    let assignee = task
        .assignee()
        .ok_or_else(|| eyre::eyre!("scenario task has no assignee"))?;
    run_async(world.tasks.update_is_new_flag(task.id(), assignee, false))
        .wrap_err("mark scenario task seen")?;
    Ok(())
}
