//! Assignee checks and optimistic task writes against `PostgreSQL`.

use super::helpers::PgPlatform;
use chrono::Duration;
use eyre::OptionExt;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use trellis::{
    error::ErrorKind,
    identity::domain::Email,
    membership::domain::{ProjectId, ProjectRole},
    task::{
        domain::{Task, TaskContent, TaskPriority, TaskStatus},
        ports::{TaskRepository, TaskRepositoryError},
        services::TaskRequest,
    },
};

struct Crew {
    project_id: ProjectId,
    admin: Email,
    ana: Email,
    ben: Email,
}

async fn crew(platform: &PgPlatform) -> eyre::Result<Crew> {
    let admin = platform.signed_up("Morgan", "morgan@example.com").await?;
    let ana = platform.signed_up("Ana", "ana@example.com").await?;
    let ben = platform.signed_up("Ben", "ben@example.com").await?;
    let project = platform.memberships.create_project(&admin, "Harbour").await?;
    platform
        .join(project.id, &admin, &ana, ProjectRole::Employee)
        .await?;
    platform
        .join(project.id, &admin, &ben, ProjectRole::Employee)
        .await?;
    Ok(Crew {
        project_id: project.id,
        admin,
        ana,
        ben,
    })
}

fn draft(platform: &PgPlatform, crew: &Crew, assignee: Option<Email>) -> eyre::Result<Task> {
    let content = TaskContent::new("Check moorings", None, None, TaskPriority::Medium)?;
    Ok(Task::create(
        crew.project_id,
        crew.admin.clone(),
        content,
        TaskStatus::Todo,
        assignee,
        &*platform.clock,
    ))
}

async fn assignee_checks(platform: &PgPlatform) -> eyre::Result<()> {
    let crew = crew(platform).await?;
    let pending = platform.signed_up("Pia", "pia@example.com").await?;
    platform
        .invite(crew.project_id, &crew.admin, &pending, ProjectRole::Employee)
        .await?;
    let outsider = platform.signed_up("Otto", "otto@example.com").await?;

    for assignee in [&pending, &outsider] {
        let task = draft(platform, &crew, Some(assignee.clone()))?;
        let result = platform.store.store_task(&task).await;
        eyre::ensure!(
            matches!(
                result,
                Err(TaskRepositoryError::AssigneeNotActive { ref email, .. }) if email == assignee
            ),
            "expected AssigneeNotActive for {assignee}, got {result:?}"
        );
        eyre::ensure!(
            platform.store.find_task(task.id()).await?.is_none(),
            "rejected task is not stored"
        );
    }

    let refused = platform
        .tasks
        .create_task(
            crew.project_id,
            &crew.admin,
            TaskRequest::new("Coil ropes").with_assignee(pending.clone()),
        )
        .await
        .err()
        .ok_or_eyre("pending member cannot be assigned")?;
    eyre::ensure!(refused.kind() == ErrorKind::Conflict, "got {refused}");

    let stored = draft(platform, &crew, Some(crew.ana.clone()))?;
    platform.store.store_task(&stored).await?;
    let reloaded = platform
        .store
        .find_task(stored.id())
        .await?
        .ok_or_eyre("active assignee accepted")?;
    eyre::ensure!(reloaded.assignee() == Some(&crew.ana), "assignee stored");
    Ok(())
}

#[rstest]
fn only_active_members_can_hold_tasks(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let platform = PgPlatform::new(shared_test_cluster)?;
    platform.runtime.block_on(assignee_checks(&platform))
}

async fn reassignment(platform: &PgPlatform) -> eyre::Result<()> {
    let crew = crew(platform).await?;
    let task = platform
        .tasks
        .create_task(
            crew.project_id,
            &crew.admin,
            TaskRequest::new("Inspect hull").with_assignee(crew.ana.clone()),
        )
        .await?;
    platform
        .tasks
        .update_is_new_flag(task.id(), &crew.ana, false)
        .await?;

    platform.clock.advance(Duration::minutes(5));
    let repeated = platform
        .tasks
        .update_task(
            task.id(),
            &crew.admin,
            TaskRequest::new("Inspect hull and deck").with_assignee(crew.ana.clone()),
        )
        .await?;
    eyre::ensure!(!repeated.is_new(), "same assignee keeps the task seen");
    eyre::ensure!(
        repeated.last_assigned_at() == task.last_assigned_at(),
        "same assignee keeps the assignment time"
    );

    let reassigned = platform
        .tasks
        .update_task(
            task.id(),
            &crew.admin,
            TaskRequest::new("Inspect hull and deck").with_assignee(crew.ben.clone()),
        )
        .await?;
    eyre::ensure!(reassigned.is_new(), "new assignee sees the task as new");
    eyre::ensure!(
        reassigned.last_assigned_at() == task.last_assigned_at() + Duration::minutes(5),
        "assignment time refreshed"
    );

    let cleared = platform
        .tasks
        .update_task(
            task.id(),
            &crew.admin,
            TaskRequest::new("Inspect hull and deck"),
        )
        .await?;
    eyre::ensure!(cleared.assignee().is_none(), "absent assignee clears it");
    eyre::ensure!(
        cleared.last_assigned_at() == reassigned.last_assigned_at(),
        "clearing keeps the assignment time"
    );
    Ok(())
}

#[rstest]
fn reassignment_refreshes_the_new_flag(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let platform = PgPlatform::new(shared_test_cluster)?;
    platform.runtime.block_on(reassignment(&platform))
}

async fn stale_and_missing_writes(platform: &PgPlatform) -> eyre::Result<()> {
    let crew = crew(platform).await?;
    let stale = platform
        .tasks
        .create_task(crew.project_id, &crew.admin, TaskRequest::new("Log tides"))
        .await?;
    platform
        .tasks
        .update_status(stale.id(), &crew.admin, TaskStatus::InProgress)
        .await?;

    let result = platform.store.update_task(&stale).await;
    eyre::ensure!(
        matches!(
            result,
            Err(TaskRepositoryError::StaleRevision { id, expected })
                if id == stale.id() && expected == stale.revision()
        ),
        "expected StaleRevision, got {result:?}"
    );
    let current = platform
        .store
        .find_task(stale.id())
        .await?
        .ok_or_eyre("task kept")?;
    eyre::ensure!(
        current.status() == TaskStatus::InProgress,
        "stale write did not land"
    );

    let missing = draft(platform, &crew, None)?;
    let unknown = platform.store.update_task(&missing).await;
    eyre::ensure!(
        matches!(unknown, Err(TaskRepositoryError::NotFound(id)) if id == missing.id()),
        "expected NotFound, got {unknown:?}"
    );
    Ok(())
}

#[rstest]
fn stale_and_missing_task_writes_are_distinguished(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let platform = PgPlatform::new(shared_test_cluster)?;
    platform
        .runtime
        .block_on(stale_and_missing_writes(&platform))
}

async fn assignment_racing_removal(platform: &PgPlatform) -> eyre::Result<()> {
    let crew = crew(platform).await?;
    for round in 0..10 {
        let (created, removed) = tokio::join!(
            platform.tasks.create_task(
                crew.project_id,
                &crew.admin,
                TaskRequest::new(format!("Watch {round}")).with_assignee(crew.ana.clone()),
            ),
            platform
                .memberships
                .remove_member(crew.project_id, &crew.admin, &crew.ana),
        );
        removed?;
        if let Err(err) = created {
            eyre::ensure!(err.kind() == ErrorKind::Conflict, "round {round}: got {err}");
        }

        let tasks = platform.store.list_project_tasks(crew.project_id).await?;
        eyre::ensure!(
            tasks.iter().all(|task| task.assignee() != Some(&crew.ana)),
            "round {round}: a task kept a removed assignee"
        );
        platform
            .join(crew.project_id, &crew.admin, &crew.ana, ProjectRole::Employee)
            .await?;
    }
    Ok(())
}

#[rstest]
fn removed_member_never_keeps_a_task(
    shared_test_cluster: &'static TestCluster,
) -> eyre::Result<()> {
    let platform = PgPlatform::new(shared_test_cluster)?;
    platform
        .runtime
        .block_on(assignment_racing_removal(&platform))
}
