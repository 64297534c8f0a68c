//! In-memory integration tests for task assignment and events.

use super::helpers::{Platform, platform};
use chrono::Duration;
use eyre::OptionExt;
use rstest::rstest;
use trellis::{
    error::ErrorKind,
    identity::domain::Email,
    membership::{
        domain::{ProjectId, ProjectRole},
        ports::MembershipRepository,
    },
    notification::domain::Topic,
    task::{
        domain::TaskStatus,
        ports::TaskRepository,
        services::TaskRequest,
    },
};

struct Team {
    project_id: ProjectId,
    admin: Email,
    ana: Email,
    ben: Email,
}

async fn team(platform: &Platform) -> eyre::Result<Team> {
    let admin = platform.signed_up("Morgan", "morgan@example.com").await?;
    let ana = platform.signed_up("Ana", "ana@example.com").await?;
    let ben = platform.signed_up("Ben", "ben@example.com").await?;
    let project = platform
        .memberships
        .create_project(&admin, "Harbour")
        .await?;
    platform
        .join(project.id, &admin, &ana, ProjectRole::Employee)
        .await?;
    platform
        .join(project.id, &admin, &ben, ProjectRole::Employee)
        .await?;
    Ok(Team {
        project_id: project.id,
        admin,
        ana,
        ben,
    })
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reassignment_flags_task_and_repeat_keeps_it(
    platform: eyre::Result<Platform>,
) -> eyre::Result<()> {
    let platform = platform?;
    let team = team(&platform).await?;
    let task = platform
        .tasks
        .create_task(
            team.project_id,
            &team.admin,
            TaskRequest::new("Inspect hull").with_assignee(team.ana.clone()),
        )
        .await?;
    let seen = platform
        .tasks
        .update_is_new_flag(task.id(), &team.ana, false)
        .await?;
    eyre::ensure!(!seen.is_new(), "assignee marked the task seen");

    platform.clock.advance(Duration::minutes(5));
    let reassigned = platform
        .tasks
        .update_task(
            task.id(),
            &team.admin,
            TaskRequest::new("Inspect hull").with_assignee(team.ben.clone()),
        )
        .await?;
    eyre::ensure!(reassigned.is_new(), "new assignee sees an unseen task");
    eyre::ensure!(
        reassigned.last_assigned_at() > task.last_assigned_at(),
        "assignment time advanced"
    );

    platform.clock.advance(Duration::minutes(5));
    let repeated = platform
        .tasks
        .update_task(
            task.id(),
            &team.admin,
            TaskRequest::new("Inspect hull and deck").with_assignee(team.ben.clone()),
        )
        .await?;
    eyre::ensure!(repeated.is_new() == reassigned.is_new(), "flag unchanged");
    eyre::ensure!(
        repeated.last_assigned_at() == reassigned.last_assigned_at(),
        "assignment time unchanged"
    );
    eyre::ensure!(
        repeated.content().title() == "Inspect hull and deck",
        "other fields overwritten"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn removing_member_unassigns_their_tasks(
    platform: eyre::Result<Platform>,
) -> eyre::Result<()> {
    let platform = platform?;
    let team = team(&platform).await?;
    let mut assigned = Vec::new();
    for title in ["Fuel boat", "Chart route"] {
        let task = platform
            .tasks
            .create_task(
                team.project_id,
                &team.admin,
                TaskRequest::new(title)
                    .with_status(TaskStatus::InProgress)
                    .with_assignee(team.ana.clone()),
            )
            .await?;
        assigned.push(task.id());
    }
    let untouched = platform
        .tasks
        .create_task(
            team.project_id,
            &team.admin,
            TaskRequest::new("Stow lines").with_assignee(team.ben.clone()),
        )
        .await?;

    let unassigned = platform
        .memberships
        .remove_member(team.project_id, &team.admin, &team.ana)
        .await?;

    eyre::ensure!(unassigned == 2, "two tasks unassigned, got {unassigned}");
    for task_id in assigned {
        let task = platform
            .store
            .find_task(task_id)
            .await?
            .ok_or_eyre("task kept after removal")?;
        eyre::ensure!(task.assignee().is_none(), "task {task_id} unassigned");
    }
    let kept = platform
        .store
        .find_task(untouched.id())
        .await?
        .ok_or_eyre("other task kept")?;
    eyre::ensure!(kept.assignee() == Some(&team.ben), "other assignee kept");
    eyre::ensure!(
        platform
            .store
            .find_member(team.project_id, &team.ana)
            .await?
            .is_none(),
        "membership row deleted"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn employee_cannot_create_tasks(platform: eyre::Result<Platform>) -> eyre::Result<()> {
    let platform = platform?;
    let team = team(&platform).await?;

    let err = platform
        .tasks
        .create_task(team.project_id, &team.ana, TaskRequest::new("Sneaky task"))
        .await
        .err()
        .ok_or_eyre("employee create must fail")?;

    eyre::ensure!(err.kind() == ErrorKind::Unauthorized, "got {err}");
    eyre::ensure!(
        platform
            .store
            .list_project_tasks(team.project_id)
            .await?
            .is_empty(),
        "nothing stored"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn subscribers_receive_events_after_each_write(
    platform: eyre::Result<Platform>,
) -> eyre::Result<()> {
    let platform = platform?;
    let team = team(&platform).await?;
    let mut created = platform
        .fanout
        .subscribe(Topic::TaskCreated)
        .ok_or_eyre("created channel")?;
    let mut status = platform
        .fanout
        .subscribe(Topic::TaskStatusUpdated)
        .ok_or_eyre("status channel")?;
    let mut deleted = platform
        .fanout
        .subscribe(Topic::TaskDeleted)
        .ok_or_eyre("deleted channel")?;

    let task = platform
        .tasks
        .create_task(team.project_id, &team.admin, TaskRequest::new("Raise sail"))
        .await?;
    platform
        .tasks
        .update_status(task.id(), &team.ben, TaskStatus::Done)
        .await?;
    platform.tasks.delete_task(task.id(), &team.admin).await?;

    let created_event = created.recv().await?;
    eyre::ensure!(created_event.event_type() == "TASK_CREATED", "created type");
    eyre::ensure!(
        created_event.payload()["title"] == "Raise sail",
        "created payload carries the task"
    );
    let status_event = status.recv().await?;
    eyre::ensure!(
        status_event.payload()["status"] == "DONE",
        "status payload carries the new status"
    );
    let deleted_event = deleted.recv().await?;
    eyre::ensure!(
        deleted_event.payload() == &serde_json::to_value(task.id())?,
        "deleted payload is the id"
    );
    Ok(())
}
