//! Store-wide consistency checks after mixed operations.

use super::helpers::{Platform, platform};
use eyre::OptionExt;
use rstest::rstest;
use trellis::{
    error::ErrorKind,
    identity::domain::Email,
    membership::{
        domain::{MemberStatus, ProjectId, ProjectRole},
        ports::MembershipRepository,
    },
    task::{ports::TaskRepository, services::TaskRequest},
};

async fn assert_consistent(platform: &Platform, project_id: ProjectId) -> eyre::Result<()> {
    let members = platform.store.list_members(project_id).await?;
    let mut seen: Vec<&Email> = Vec::new();
    for member in &members {
        eyre::ensure!(
            !seen.contains(&member.email()),
            "duplicate membership for {}",
            member.email()
        );
        seen.push(member.email());
        let pending = member.status() == MemberStatus::Pending;
        eyre::ensure!(
            pending == member.invite_token().is_some(),
            "token present iff pending for {}",
            member.email()
        );
    }

    for task in platform.store.list_project_tasks(project_id).await? {
        if let Some(assignee) = task.assignee() {
            let member = platform
                .store
                .find_member(project_id, assignee)
                .await?
                .ok_or_eyre("assignee must hold a membership")?;
            eyre::ensure!(member.is_active(), "assignee {assignee} must be active");
        }
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mixed_workload_keeps_store_consistent(
    platform: eyre::Result<Platform>,
) -> eyre::Result<()> {
    let platform = platform?;
    let owner = platform.signed_up("Olive", "olive@example.com").await?;
    let lead = platform.signed_up("Leo", "leo@example.com").await?;
    let temp = platform.signed_up("Tess", "tess@example.com").await?;
    let late = platform.signed_up("Lars", "lars@example.com").await?;
    let project = platform
        .memberships
        .create_project(&owner, "Meridian")
        .await?;
    assert_consistent(&platform, project.id).await?;

    platform
        .join(project.id, &owner, &lead, ProjectRole::Admin)
        .await?;
    platform
        .join(project.id, &owner, &temp, ProjectRole::Employee)
        .await?;
    platform
        .memberships
        .invite_member(project.id, &lead, &late, None)
        .await?;
    assert_consistent(&platform, project.id).await?;

    let duplicate = platform
        .memberships
        .invite_member(project.id, &owner, &temp, Some(ProjectRole::Admin))
        .await
        .err()
        .ok_or_eyre("second membership row must be refused")?;
    eyre::ensure!(duplicate.kind() == ErrorKind::Conflict, "got {duplicate}");

    for (title, assignee) in [
        ("Draft budget", &temp),
        ("Review budget", &lead),
        ("File budget", &temp),
    ] {
        platform
            .tasks
            .create_task(
                project.id,
                &lead,
                TaskRequest::new(title).with_assignee(assignee.clone()),
            )
            .await?;
    }
    assert_consistent(&platform, project.id).await?;

    platform
        .memberships
        .remove_member(project.id, &owner, &temp)
        .await?;
    assert_consistent(&platform, project.id).await?;

    let tasks = platform.store.list_project_tasks(project.id).await?;
    eyre::ensure!(tasks.len() == 3, "removal keeps tasks");
    eyre::ensure!(
        tasks.iter().filter(|task| task.assignee().is_none()).count() == 2,
        "removed member's tasks are unassigned"
    );
    Ok(())
}
