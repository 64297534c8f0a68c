//! [`TaskRepository`] over the in-memory store.

use super::{InMemoryStore, StoreState};
use crate::{
    identity::domain::Email,
    membership::domain::ProjectId,
    task::{
        domain::{Task, TaskId},
        ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
    },
};
use async_trait::async_trait;

fn check_assignee(state: &StoreState, task: &Task) -> TaskRepositoryResult<()> {
    match task.assignee() {
        Some(email) if !state.has_active_member(task.project_id(), email) => {
            Err(TaskRepositoryError::AssigneeNotActive {
                project_id: task.project_id(),
                email: email.clone(),
            })
        }
        _ => Ok(()),
    }
}

fn sorted(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().into_inner().cmp(&b.id().into_inner()))
    });
    tasks
}

fn assigned_in<'a>(
    state: &'a StoreState,
    project_id: ProjectId,
    email: &'a Email,
) -> impl Iterator<Item = &'a Task> + 'a {
    state
        .tasks
        .values()
        .filter(move |task| task.project_id() == project_id && task.assignee() == Some(email))
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn store_task(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write_state().map_err(TaskRepositoryError::persistence)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        if !state.projects.contains_key(&task.project_id()) {
            return Err(TaskRepositoryError::ProjectNotFound(task.project_id()));
        }
        check_assignee(&state, task)?;
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> TaskRepositoryResult<Task> {
        let mut state = self.write_state().map_err(TaskRepositoryError::persistence)?;
        let Some(stored) = state.tasks.get(&task.id()) else {
            return Err(TaskRepositoryError::NotFound(task.id()));
        };
        if stored.revision() != task.revision() {
            return Err(TaskRepositoryError::StaleRevision {
                id: task.id(),
                expected: task.revision(),
            });
        }
        check_assignee(&state, task)?;

        let mut next = task.clone();
        next.bump_revision();
        state.tasks.insert(next.id(), next.clone());
        Ok(next)
    }

    async fn find_task(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read_state().map_err(TaskRepositoryError::persistence)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn delete_task(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let mut state = self.write_state().map_err(TaskRepositoryError::persistence)?;
        Ok(state.tasks.remove(&id))
    }

    async fn list_project_tasks(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read_state().map_err(TaskRepositoryError::persistence)?;
        Ok(sorted(
            state
                .tasks
                .values()
                .filter(|task| task.project_id() == project_id)
                .cloned()
                .collect(),
        ))
    }

    async fn count_open_assigned_tasks(
        &self,
        project_id: ProjectId,
        email: &Email,
    ) -> TaskRepositoryResult<u64> {
        let state = self.read_state().map_err(TaskRepositoryError::persistence)?;
        let count = assigned_in(&state, project_id, email)
            .filter(|task| task.status().is_open())
            .count();
        u64::try_from(count).map_err(TaskRepositoryError::persistence)
    }
}
