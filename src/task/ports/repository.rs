//! Repository port for task persistence and lookup.

use crate::{
    identity::domain::Email,
    membership::domain::ProjectId,
    task::domain::{Task, TaskId},
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Writes check the assignee's membership in the same atomic unit as the
/// task write, so a stored task never references a user without an active
/// membership in the task's project.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the identifier
    /// exists, [`TaskRepositoryError::ProjectNotFound`] when the project is
    /// gone, or [`TaskRepositoryError::AssigneeNotActive`] when the assignee
    /// lacks an active membership.
    async fn store_task(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task and returns the stored version.
    ///
    /// The write only succeeds when the stored revision still equals
    /// `task.revision()`; the returned task carries the next revision.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist, [`TaskRepositoryError::StaleRevision`] when another writer got
    /// there first, or [`TaskRepositoryError::AssigneeNotActive`].
    async fn update_task(&self, task: &Task) -> TaskRepositoryResult<Task>;

    /// Finds a task by identifier.
    async fn find_task(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Deletes a task, returning it when it existed.
    async fn delete_task(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Lists the tasks of a project, oldest first.
    async fn list_project_tasks(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>>;

    /// Counts the tasks of a project assigned to `email` that are not
    /// cancelled.
    async fn count_open_assigned_tasks(
        &self,
        project_id: ProjectId,
        email: &Email,
    ) -> TaskRepositoryResult<u64>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The owning project was not found.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The assignee has no active membership in the task's project.
    #[error("{email} is not an active member of project {project_id}")]
    AssigneeNotActive {
        /// Task's project.
        project_id: ProjectId,
        /// Rejected assignee.
        email: Email,
    },

    /// The task changed since it was read.
    #[error("task {id} was modified concurrently (expected revision {expected})")]
    StaleRevision {
        /// Task identifier.
        id: TaskId,
        /// Revision the writer read.
        expected: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
