//! [`MembershipRepository`] over the in-memory store.

use super::InMemoryStore;
use crate::{
    identity::domain::Email,
    membership::{
        domain::{InviteToken, Project, ProjectId, ProjectMember},
        ports::{MembershipRepository, MembershipRepositoryError, MembershipRepositoryResult},
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl MembershipRepository for InMemoryStore {
    async fn create_project(
        &self,
        project: &Project,
        owner: &ProjectMember,
    ) -> MembershipRepositoryResult<()> {
        let mut state = self
            .write_state()
            .map_err(MembershipRepositoryError::persistence)?;
        let Some(user) = state.users.get_mut(owner.email()) else {
            return Err(MembershipRepositoryError::OwnerNotFound(
                owner.email().clone(),
            ));
        };
        user.record_project_visit(project.id());
        state.projects.insert(project.id(), project.clone());
        state
            .members
            .insert((project.id(), owner.email().clone()), owner.clone());
        Ok(())
    }

    async fn find_project(&self, id: ProjectId) -> MembershipRepositoryResult<Option<Project>> {
        let state = self
            .read_state()
            .map_err(MembershipRepositoryError::persistence)?;
        Ok(state.projects.get(&id).cloned())
    }

    async fn update_project(&self, project: &Project) -> MembershipRepositoryResult<()> {
        let mut state = self
            .write_state()
            .map_err(MembershipRepositoryError::persistence)?;
        let Some(stored) = state.projects.get_mut(&project.id()) else {
            return Err(MembershipRepositoryError::ProjectNotFound(project.id()));
        };
        *stored = project.clone();
        Ok(())
    }

    async fn delete_project(&self, id: ProjectId) -> MembershipRepositoryResult<bool> {
        let mut state = self
            .write_state()
            .map_err(MembershipRepositoryError::persistence)?;
        if state.projects.remove(&id).is_none() {
            return Ok(false);
        }
        state.members.retain(|(project_id, _), _| *project_id != id);
        state.tasks.retain(|_, task| task.project_id() != id);
        for user in state.users.values_mut() {
            if user.last_project() == Some(id) {
                user.clear_project_visit();
            }
        }
        Ok(true)
    }

    async fn find_member(
        &self,
        project_id: ProjectId,
        email: &Email,
    ) -> MembershipRepositoryResult<Option<ProjectMember>> {
        let state = self
            .read_state()
            .map_err(MembershipRepositoryError::persistence)?;
        Ok(state.members.get(&(project_id, email.clone())).cloned())
    }

    async fn add_member(&self, member: &ProjectMember) -> MembershipRepositoryResult<()> {
        let mut state = self
            .write_state()
            .map_err(MembershipRepositoryError::persistence)?;
        if !state.projects.contains_key(&member.project_id()) {
            return Err(MembershipRepositoryError::ProjectNotFound(member.project_id()));
        }
        let key = (member.project_id(), member.email().clone());
        if state.members.contains_key(&key) {
            return Err(MembershipRepositoryError::DuplicateMember {
                project_id: member.project_id(),
                email: member.email().clone(),
            });
        }
        state.members.insert(key, member.clone());
        Ok(())
    }

    async fn accept_invitation(
        &self,
        token: &InviteToken,
        accepted_at: DateTime<Utc>,
    ) -> MembershipRepositoryResult<Option<ProjectMember>> {
        let mut state = self
            .write_state()
            .map_err(MembershipRepositoryError::persistence)?;
        let pending = state
            .members
            .values_mut()
            .find(|member| member.invite_token() == Some(token));
        Ok(pending.map(|member| {
            member.accept(accepted_at);
            member.clone()
        }))
    }

    async fn remove_member(
        &self,
        project_id: ProjectId,
        email: &Email,
    ) -> MembershipRepositoryResult<u64> {
        let mut state = self
            .write_state()
            .map_err(MembershipRepositoryError::persistence)?;
        let key = (project_id, email.clone());
        if !state.members.contains_key(&key) {
            return Err(MembershipRepositoryError::MemberNotFound {
                project_id,
                email: email.clone(),
            });
        }

        let mut unassigned: u64 = 0;
        for task in state.tasks.values_mut() {
            if task.project_id() == project_id && task.assignee() == Some(email) {
                task.unassign();
                task.bump_revision();
                unassigned += 1;
            }
        }
        state.members.remove(&key);
        Ok(unassigned)
    }

    async fn list_members(
        &self,
        project_id: ProjectId,
    ) -> MembershipRepositoryResult<Vec<ProjectMember>> {
        let state = self
            .read_state()
            .map_err(MembershipRepositoryError::persistence)?;
        let mut members: Vec<ProjectMember> = state
            .members
            .values()
            .filter(|member| member.project_id() == project_id)
            .cloned()
            .collect();
        members.sort_by(|a, b| {
            a.joined_at()
                .cmp(&b.joined_at())
                .then_with(|| a.email().cmp(b.email()))
        });
        Ok(members)
    }

    async fn list_memberships(
        &self,
        email: &Email,
    ) -> MembershipRepositoryResult<Vec<ProjectMember>> {
        let state = self
            .read_state()
            .map_err(MembershipRepositoryError::persistence)?;
        Ok(state
            .members
            .values()
            .filter(|member| member.email() == email)
            .cloned()
            .collect())
    }
}
