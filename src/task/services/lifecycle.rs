//! Service layer for task creation, mutation, and deletion.
//!
//! Every operation names its caller explicitly and checks that caller's
//! membership before touching the task. Notifications are published only
//! after the repository write returned, so subscribers never see an event
//! for a write that did not commit.

use crate::{
    error::ErrorKind,
    identity::domain::Email,
    membership::{
        domain::{AccessDenied, ProjectId, ProjectMember, ProjectRole, authorize, require_member},
        ports::{MembershipRepository, MembershipRepositoryError},
    },
    notification::{
        domain::{Notification, Topic},
        ports::EventPublisher,
    },
    task::{
        domain::{AssignmentChange, Task, TaskContent, TaskDomainError, TaskId, TaskPriority, TaskStatus},
        ports::{TaskRepository, TaskRepositoryError},
    },
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Request payload for creating or overwriting a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    title: String,
    description: Option<String>,
    due_date: Option<NaiveDate>,
    priority: TaskPriority,
    status: TaskStatus,
    assignee: Option<Email>,
}

impl TaskRequest {
    /// Creates a request with the required title and default fields.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date: None,
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
            assignee: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the assignee.
    ///
    /// Leaving the assignee unset on an update clears it.
    #[must_use]
    pub fn with_assignee(mut self, assignee: Email) -> Self {
        self.assignee = Some(assignee);
        self
    }

    fn into_parts(self) -> Result<(TaskContent, TaskStatus, Option<Email>), TaskDomainError> {
        let content = TaskContent::new(self.title, self.description, self.due_date, self.priority)?;
        Ok((content, self.status, self.assignee))
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// The caller lacks a membership or the required role.
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The requested assignee has no active membership in the project.
    #[error("assignee {email} must be an active member of project {project_id}")]
    AssigneeNotActive {
        /// Task's project.
        project_id: ProjectId,
        /// Rejected assignee.
        email: Email,
    },

    /// The task changed between read and write.
    #[error("task {0} was modified concurrently")]
    ConcurrentModification(TaskId),

    /// Task repository operation failed.
    #[error(transparent)]
    Repository(TaskRepositoryError),

    /// Membership lookup failed.
    #[error(transparent)]
    Membership(#[from] MembershipRepositoryError),
}

impl TaskLifecycleError {
    /// Returns the coarse failure category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) => ErrorKind::Validation,
            Self::AccessDenied(_) => ErrorKind::Unauthorized,
            Self::TaskNotFound(_) | Self::ProjectNotFound(_) => ErrorKind::NotFound,
            Self::AssigneeNotActive { .. } | Self::ConcurrentModification(_) => {
                ErrorKind::Conflict
            }
            Self::Repository(_) | Self::Membership(_) => ErrorKind::Internal,
        }
    }
}

impl From<TaskRepositoryError> for TaskLifecycleError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(id) => Self::TaskNotFound(id),
            TaskRepositoryError::ProjectNotFound(project_id) => Self::ProjectNotFound(project_id),
            TaskRepositoryError::AssigneeNotActive { project_id, email } => {
                Self::AssigneeNotActive { project_id, email }
            }
            TaskRepositoryError::StaleRevision { id, .. } => Self::ConcurrentModification(id),
            other @ (TaskRepositoryError::DuplicateTask(_)
            | TaskRepositoryError::Persistence(_)) => Self::Repository(other),
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<S, P, C>
where
    S: TaskRepository + MembershipRepository,
    P: EventPublisher,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    publisher: Arc<P>,
    clock: Arc<C>,
}

impl<S, P, C> TaskLifecycleService<S, P, C>
where
    S: TaskRepository + MembershipRepository,
    P: EventPublisher,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(store: Arc<S>, publisher: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            store,
            publisher,
            clock,
        }
    }

    /// Creates a task in a project. Only admins may create tasks.
    ///
    /// The new task is flagged as unseen and its assignment timestamp is
    /// the creation time.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::AccessDenied`] unless `acting` is an
    /// admin, [`TaskLifecycleError::Domain`] for invalid fields, or
    /// [`TaskLifecycleError::AssigneeNotActive`].
    pub async fn create_task(
        &self,
        project_id: ProjectId,
        acting: &Email,
        request: TaskRequest,
    ) -> TaskLifecycleResult<Task> {
        self.require_role(project_id, acting, ProjectRole::Admin)
            .await?;
        let (content, status, assignee) = request.into_parts()?;
        if let Some(email) = &assignee {
            self.require_active_assignee(project_id, email).await?;
        }

        let task = Task::create(project_id, acting.clone(), content, status, assignee, &*self.clock);
        self.store.store_task(&task).await?;
        info!(task_id = %task.id(), project_id = %project_id, created_by = %acting, "task created");

        self.publish_task(Topic::TaskCreated, &task).await;
        Ok(task)
    }

    /// Overwrites a task's fields. Only admins may update tasks.
    ///
    /// A different assignee flags the task as unseen and refreshes its
    /// assignment timestamp; the same assignee changes neither, and an
    /// absent assignee clears it without touching either.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`],
    /// [`TaskLifecycleError::AccessDenied`],
    /// [`TaskLifecycleError::Domain`],
    /// [`TaskLifecycleError::AssigneeNotActive`], or
    /// [`TaskLifecycleError::ConcurrentModification`].
    pub async fn update_task(
        &self,
        task_id: TaskId,
        acting: &Email,
        request: TaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.load_task(task_id).await?;
        self.require_role(task.project_id(), acting, ProjectRole::Admin)
            .await?;
        let (content, status, assignee) = request.into_parts()?;

        let reassigning = assignee.is_some() && assignee.as_ref() != task.assignee();
        if let Some(email) = assignee.as_ref().filter(|_| reassigning) {
            self.require_active_assignee(task.project_id(), email)
                .await?;
        }

        let change = task.apply_update(content, status, assignee, &*self.clock);
        let updated = self.store.update_task(&task).await?;
        match change {
            AssignmentChange::Reassigned => info!(
                task_id = %task_id,
                assignee = ?updated.assignee().map(Email::as_str),
                "task reassigned"
            ),
            AssignmentChange::Cleared => info!(task_id = %task_id, "task unassigned"),
            AssignmentChange::Unchanged => info!(task_id = %task_id, "task updated"),
        }

        self.publish_task(Topic::TaskUpdated, &updated).await;
        Ok(updated)
    }

    /// Overwrites a task's status. Any member may do this.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`],
    /// [`TaskLifecycleError::AccessDenied`], or
    /// [`TaskLifecycleError::ConcurrentModification`].
    pub async fn update_status(
        &self,
        task_id: TaskId,
        acting: &Email,
        status: TaskStatus,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.load_task(task_id).await?;
        self.require_any(task.project_id(), acting).await?;

        task.set_status(status);
        let updated = self.store.update_task(&task).await?;
        info!(task_id = %task_id, status = %status, "task status updated");

        self.publish_task(Topic::TaskStatusUpdated, &updated).await;
        Ok(updated)
    }

    /// Sets whether the task is still unseen. Any member may do this.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`],
    /// [`TaskLifecycleError::AccessDenied`], or
    /// [`TaskLifecycleError::ConcurrentModification`].
    pub async fn update_is_new_flag(
        &self,
        task_id: TaskId,
        acting: &Email,
        is_new: bool,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.load_task(task_id).await?;
        self.require_any(task.project_id(), acting).await?;

        task.set_is_new(is_new);
        let updated = self.store.update_task(&task).await?;
        info!(task_id = %task_id, is_new, "task unseen flag updated");

        self.publish(Notification::new_state(&updated, &*self.clock))
            .await;
        Ok(updated)
    }

    /// Returns whether the task is still unseen.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] or
    /// [`TaskLifecycleError::AccessDenied`].
    pub async fn get_is_new_flag(&self, task_id: TaskId, acting: &Email) -> TaskLifecycleResult<bool> {
        let task = self.get_task(task_id, acting).await?;
        Ok(task.is_new())
    }

    /// Deletes a task and returns it. Only admins may delete tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] or
    /// [`TaskLifecycleError::AccessDenied`].
    pub async fn delete_task(&self, task_id: TaskId, acting: &Email) -> TaskLifecycleResult<Task> {
        let task = self.load_task(task_id).await?;
        self.require_role(task.project_id(), acting, ProjectRole::Admin)
            .await?;

        let deleted = self
            .store
            .delete_task(task_id)
            .await?
            .ok_or(TaskLifecycleError::TaskNotFound(task_id))?;
        info!(task_id = %task_id, deleted_by = %acting, "task deleted");

        self.publish(Notification::deleted(task_id, deleted.project_id(), &*self.clock))
            .await;
        Ok(deleted)
    }

    /// Lists a project's tasks. Any member may do this.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::AccessDenied`] when `acting` has no
    /// membership.
    pub async fn list_tasks(
        &self,
        project_id: ProjectId,
        acting: &Email,
    ) -> TaskLifecycleResult<Vec<Task>> {
        self.require_any(project_id, acting).await?;
        Ok(self.store.list_project_tasks(project_id).await?)
    }

    /// Returns a task. Any member of its project may do this.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] or
    /// [`TaskLifecycleError::AccessDenied`].
    pub async fn get_task(&self, task_id: TaskId, acting: &Email) -> TaskLifecycleResult<Task> {
        let task = self.load_task(task_id).await?;
        self.require_any(task.project_id(), acting).await?;
        Ok(task)
    }

    async fn load_task(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.store
            .find_task(task_id)
            .await?
            .ok_or(TaskLifecycleError::TaskNotFound(task_id))
    }

    async fn require_role(
        &self,
        project_id: ProjectId,
        acting: &Email,
        required: ProjectRole,
    ) -> TaskLifecycleResult<ProjectMember> {
        let membership = self.store.find_member(project_id, acting).await?;
        authorize(required, membership).map_err(|denied| {
            warn!(project_id = %project_id, email = %acting, reason = %denied, "task operation denied");
            TaskLifecycleError::from(denied)
        })
    }

    async fn require_any(
        &self,
        project_id: ProjectId,
        acting: &Email,
    ) -> TaskLifecycleResult<ProjectMember> {
        let membership = self.store.find_member(project_id, acting).await?;
        require_member(membership).map_err(|denied| {
            warn!(project_id = %project_id, email = %acting, reason = %denied, "task operation denied");
            TaskLifecycleError::from(denied)
        })
    }

    async fn require_active_assignee(
        &self,
        project_id: ProjectId,
        email: &Email,
    ) -> TaskLifecycleResult<()> {
        let membership = self.store.find_member(project_id, email).await?;
        if membership.is_some_and(|member| member.is_active()) {
            return Ok(());
        }
        Err(TaskLifecycleError::AssigneeNotActive {
            project_id,
            email: email.clone(),
        })
    }

    async fn publish_task(&self, topic: Topic, task: &Task) {
        match Notification::with_task(topic, task, &*self.clock) {
            Ok(notification) => self.publish(notification).await,
            Err(err) => error!(task_id = %task.id(), topic = %topic, error = %err, "failed to encode notification"),
        }
    }

    async fn publish(&self, notification: Notification) {
        let topic = notification.topic();
        if let Err(err) = self.publisher.publish(notification).await {
            error!(topic = %topic, error = %err, "failed to publish notification");
        }
    }
}
