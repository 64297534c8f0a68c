//! Repository port for projects and memberships.

use crate::{
    identity::domain::Email,
    membership::domain::{InviteToken, Project, ProjectId, ProjectMember},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for membership repository operations.
pub type MembershipRepositoryResult<T> = Result<T, MembershipRepositoryError>;

/// Project and membership persistence contract.
///
/// Every method is one atomic unit against the store. At most one
/// membership exists per `(project, email)` pair and each invite token is
/// unique.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Stores a new project together with its owning membership and makes
    /// it the owner's last-visited project.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipRepositoryError::OwnerNotFound`] when the owner
    /// is not registered and [`MembershipRepositoryError::Persistence`]
    /// when storage fails; nothing is stored in either case.
    async fn create_project(
        &self,
        project: &Project,
        owner: &ProjectMember,
    ) -> MembershipRepositoryResult<()>;

    /// Finds a project by identifier.
    async fn find_project(&self, id: ProjectId) -> MembershipRepositoryResult<Option<Project>>;

    /// Persists changes to an existing project.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipRepositoryError::ProjectNotFound`] when the
    /// project does not exist.
    async fn update_project(&self, project: &Project) -> MembershipRepositoryResult<()>;

    /// Deletes a project with its memberships and tasks, and clears any
    /// user's last-visited pointer to it.
    ///
    /// Returns `false` when the project did not exist.
    async fn delete_project(&self, id: ProjectId) -> MembershipRepositoryResult<bool>;

    /// Finds the membership of `email` in `project_id`, whatever its status.
    async fn find_member(
        &self,
        project_id: ProjectId,
        email: &Email,
    ) -> MembershipRepositoryResult<Option<ProjectMember>>;

    /// Stores a new membership.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipRepositoryError::DuplicateMember`] when the pair
    /// already has a row and [`MembershipRepositoryError::ProjectNotFound`]
    /// when the project is gone.
    async fn add_member(&self, member: &ProjectMember) -> MembershipRepositoryResult<()>;

    /// Activates the pending membership holding `token` and clears the
    /// token.
    ///
    /// Returns `None` when no pending membership holds the token, which
    /// includes a token that was already redeemed.
    async fn accept_invitation(
        &self,
        token: &InviteToken,
        accepted_at: DateTime<Utc>,
    ) -> MembershipRepositoryResult<Option<ProjectMember>>;

    /// Unassigns every task of the project assigned to `email`, then deletes
    /// the membership, as one atomic unit.
    ///
    /// Returns the number of tasks that were unassigned.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipRepositoryError::MemberNotFound`] when no
    /// membership exists; no task is touched in that case.
    async fn remove_member(
        &self,
        project_id: ProjectId,
        email: &Email,
    ) -> MembershipRepositoryResult<u64>;

    /// Lists all memberships of a project, pending ones included.
    async fn list_members(
        &self,
        project_id: ProjectId,
    ) -> MembershipRepositoryResult<Vec<ProjectMember>>;

    /// Lists all memberships held by `email` across projects.
    async fn list_memberships(&self, email: &Email)
    -> MembershipRepositoryResult<Vec<ProjectMember>>;
}

/// Errors returned by membership repository implementations.
#[derive(Debug, Clone, Error)]
pub enum MembershipRepositoryError {
    /// The pair already has a membership row.
    #[error("{email} already has a membership in project {project_id}")]
    DuplicateMember {
        /// Target project.
        project_id: ProjectId,
        /// Target email.
        email: Email,
    },

    /// The project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The project owner is not a registered user.
    #[error("project owner not found: {0}")]
    OwnerNotFound(Email),

    /// The membership does not exist.
    #[error("{email} has no membership in project {project_id}")]
    MemberNotFound {
        /// Target project.
        project_id: ProjectId,
        /// Target email.
        email: Email,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl MembershipRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
