//! Then steps for task reassignment BDD scenarios.

use super::world::ReassignmentWorld;
use rstest_bdd_macros::then;

#[then(r#"the task is assigned to "{assignee}""#)]
fn assigned_to(world: &ReassignmentWorld, assignee: String) -> Result<(), eyre::Report> {
    let task = world.current_task()?;
    match task.assignee() {
        Some(email) if email.as_str() == assignee => Ok(()),
        other => Err(eyre::eyre!("expected assignee {assignee}, found {other:?}")),
    }
}

#[then("the task is unassigned")]
fn unassigned(world: &ReassignmentWorld) -> Result<(), eyre::Report> {
    let task = world.current_task()?;
    if let Some(email) = task.assignee() {
        return Err(eyre::eyre!("expected no assignee, found {email}"));
    }
    Ok(())
}

#[then("the task is unseen")]
fn unseen(world: &ReassignmentWorld) -> Result<(), eyre::Report> {
    if !world.current_task()?.is_new() {
        return Err(eyre::eyre!("expected the task to be flagged unseen"));
    }
    Ok(())
}

#[then("the task is seen")]
fn seen(world: &ReassignmentWorld) -> Result<(), eyre::Report> {
    if world.current_task()?.is_new() {
        return Err(eyre::eyre!("expected the task to stay seen"));
    }
    Ok(())
}

#[then("the assignment time advanced")]
fn assignment_time_advanced(world: &ReassignmentWorld) -> Result<(), eyre::Report> {
    let before = world
        .assigned_before
        .ok_or_else(|| eyre::eyre!("missing original assignment time"))?;
    let after = world.current_task()?.last_assigned_at();
    if after <= before {
        return Err(eyre::eyre!("assignment time did not advance: {after}"));
    }
    Ok(())
}

#[then("the assignment time is unchanged")]
fn assignment_time_unchanged(world: &ReassignmentWorld) -> Result<(), eyre::Report> {
    let before = world
        .assigned_before
        .ok_or_else(|| eyre::eyre!("missing original assignment time"))?;
    let after = world.current_task()?.last_assigned_at();
    if after != before {
        return Err(eyre::eyre!("assignment time moved from {before} to {after}"));
    }
    Ok(())
}
