//! Project membership state machine and role-gated operations.

use crate::{
    error::ErrorKind,
    identity::{
        domain::Email,
        ports::{UserRepository, UserRepositoryError},
    },
    mail::{domain::InviteMail, ports::MailDispatcher},
    membership::{
        domain::{
            AccessDenied, InviteToken, MemberStatus, MemberView, MembershipDomainError,
            PendingMembership, Project, ProjectDescriptor, ProjectId, ProjectMember, ProjectName,
            ProjectRole, authorize, require_member,
        },
        ports::{MembershipRepository, MembershipRepositoryError},
    },
    task::ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Service-level errors for membership operations.
#[derive(Debug, Error)]
pub enum MembershipError {
    /// Input failed domain validation.
    #[error(transparent)]
    Domain(#[from] MembershipDomainError),

    /// The caller lacks a membership or the required role.
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    /// The caller's membership is still pending.
    #[error("you have not accepted the invitation to this project yet")]
    InvitationNotAccepted,

    /// The project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The user is not registered.
    #[error("user not found: {0}; they must register first")]
    UserNotFound(Email),

    /// The target has no membership in the project.
    #[error("{email} is not a member of project {project_id}")]
    MemberNotFound {
        /// Target project.
        project_id: ProjectId,
        /// Target email.
        email: Email,
    },

    /// The target already has a membership row, pending or active.
    #[error("{email} is already a member of project {project_id}")]
    AlreadyMember {
        /// Target project.
        project_id: ProjectId,
        /// Target email.
        email: Email,
    },

    /// An admin tried to remove their own membership.
    #[error("you cannot remove yourself from the project")]
    SelfRemoval,

    /// No pending membership holds the token.
    #[error("invalid invitation token")]
    InvalidToken,

    /// Membership repository operation failed.
    #[error(transparent)]
    Repository(MembershipRepositoryError),

    /// User repository operation failed.
    #[error(transparent)]
    Users(#[from] UserRepositoryError),

    /// Task repository operation failed.
    #[error(transparent)]
    Tasks(#[from] TaskRepositoryError),
}

impl MembershipError {
    /// Returns the coarse failure category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) => ErrorKind::Validation,
            Self::AccessDenied(_) | Self::InvitationNotAccepted => ErrorKind::Unauthorized,
            Self::ProjectNotFound(_)
            | Self::UserNotFound(_)
            | Self::MemberNotFound { .. }
            | Self::Users(UserRepositoryError::NotFound(_)) => ErrorKind::NotFound,
            Self::AlreadyMember { .. } | Self::SelfRemoval => ErrorKind::Conflict,
            Self::InvalidToken => ErrorKind::InvalidToken,
            Self::Repository(_) | Self::Users(_) | Self::Tasks(_) => ErrorKind::Internal,
        }
    }
}

impl From<MembershipRepositoryError> for MembershipError {
    fn from(err: MembershipRepositoryError) -> Self {
        match err {
            MembershipRepositoryError::DuplicateMember { project_id, email } => {
                Self::AlreadyMember { project_id, email }
            }
            MembershipRepositoryError::ProjectNotFound(project_id) => {
                Self::ProjectNotFound(project_id)
            }
            MembershipRepositoryError::OwnerNotFound(email) => Self::UserNotFound(email),
            MembershipRepositoryError::MemberNotFound { project_id, email } => {
                Self::MemberNotFound { project_id, email }
            }
            other @ MembershipRepositoryError::Persistence(_) => Self::Repository(other),
        }
    }
}

/// Result type for membership operations.
pub type MembershipResult<T> = Result<T, MembershipError>;

/// Owns project creation, invitations, and role checks.
#[derive(Clone)]
pub struct MembershipService<S, M, C>
where
    S: MembershipRepository + UserRepository + TaskRepository,
    M: MailDispatcher,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    mailer: Arc<M>,
    clock: Arc<C>,
}

impl<S, M, C> MembershipService<S, M, C>
where
    S: MembershipRepository + UserRepository + TaskRepository,
    M: MailDispatcher,
    C: Clock + Send + Sync,
{
    /// Creates a new membership service.
    #[must_use]
    pub const fn new(store: Arc<S>, mailer: Arc<M>, clock: Arc<C>) -> Self {
        Self {
            store,
            mailer,
            clock,
        }
    }

    /// Creates a project owned by `owner` with an active admin membership,
    /// and makes it the owner's last-visited project.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::Domain`] for an invalid name,
    /// [`MembershipError::UserNotFound`] for an unregistered owner, or a
    /// repository error.
    pub async fn create_project(
        &self,
        owner: &Email,
        name: &str,
    ) -> MembershipResult<ProjectDescriptor> {
        let project_name = ProjectName::new(name)?;
        let user = self
            .store
            .find_user(owner)
            .await?
            .ok_or_else(|| MembershipError::UserNotFound(owner.clone()))?;

        let project = Project::create(project_name, owner.clone(), &*self.clock);
        let membership = ProjectMember::owner(project.id(), owner.clone(), &*self.clock);
        self.store.create_project(&project, &membership).await?;

        info!(project_id = %project.id(), owner = %owner, "project created");
        Ok(ProjectDescriptor {
            id: project.id(),
            name: project.name().clone(),
            owner_email: owner.clone(),
            owner_name: Some(user.display_name().to_string()),
            member_count: 1,
            created_at: project.created_at(),
            role: ProjectRole::Admin,
        })
    }

    /// Invites a registered user into a project as a pending member.
    ///
    /// `role` defaults to [`ProjectRole::Employee`]. The invitation mail is
    /// requested after the membership is stored; its failure is logged.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::AccessDenied`] unless `acting` is an
    /// admin, [`MembershipError::AlreadyMember`] when `target` already has
    /// a row, [`MembershipError::UserNotFound`] when `target` is not
    /// registered, or a repository error.
    pub async fn invite_member(
        &self,
        project_id: ProjectId,
        acting: &Email,
        target: &Email,
        role: Option<ProjectRole>,
    ) -> MembershipResult<PendingMembership> {
        self.require_role(project_id, acting, ProjectRole::Admin)
            .await?;

        if self.store.find_member(project_id, target).await?.is_some() {
            return Err(MembershipError::AlreadyMember {
                project_id,
                email: target.clone(),
            });
        }
        if self.store.find_user(target).await?.is_none() {
            return Err(MembershipError::UserNotFound(target.clone()));
        }
        let project = self.load_project(project_id).await?;

        let granted = role.unwrap_or_default();
        let member = ProjectMember::invited(project_id, target.clone(), granted, &*self.clock);
        self.store.add_member(&member).await?;
        info!(project_id = %project_id, invitee = %target, role = %granted, "member invited");

        if let Some(token) = member.invite_token() {
            let invite = InviteMail {
                to: target.clone(),
                project_name: project.name().clone(),
                role: granted,
                token: token.clone(),
            };
            if let Err(err) = self.mailer.send_invite(&invite).await {
                error!(project_id = %project_id, invitee = %target, error = %err, "failed to dispatch invitation");
            }
        }

        Ok(PendingMembership {
            project_id,
            email: target.clone(),
            role: granted,
            status: MemberStatus::Pending,
            invited_at: member.joined_at(),
        })
    }

    /// Redeems an invitation token, activating its membership.
    ///
    /// A token works once; later calls fail.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::InvalidToken`] when no pending membership
    /// holds the token.
    pub async fn accept_invite(&self, token: &str) -> MembershipResult<ProjectId> {
        let invite_token = InviteToken::from_string(token);
        if invite_token.as_str().is_empty() {
            return Err(MembershipError::InvalidToken);
        }
        let accepted = self
            .store
            .accept_invitation(&invite_token, self.clock.utc())
            .await?
            .ok_or(MembershipError::InvalidToken)?;

        info!(project_id = %accepted.project_id(), member = %accepted.email(), "invitation accepted");
        Ok(accepted.project_id())
    }

    /// Removes `target` from the project after unassigning their tasks.
    ///
    /// Returns how many tasks were unassigned.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::AccessDenied`] unless `acting` is an
    /// admin, [`MembershipError::SelfRemoval`] when `target` is `acting`,
    /// or [`MembershipError::MemberNotFound`].
    pub async fn remove_member(
        &self,
        project_id: ProjectId,
        acting: &Email,
        target: &Email,
    ) -> MembershipResult<u64> {
        self.require_role(project_id, acting, ProjectRole::Admin)
            .await?;
        if acting == target {
            return Err(MembershipError::SelfRemoval);
        }

        let unassigned = self.store.remove_member(project_id, target).await?;
        info!(project_id = %project_id, member = %target, unassigned, "member removed");
        Ok(unassigned)
    }

    /// Lists the project roster with each member's open task count.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::AccessDenied`] when `acting` has no
    /// membership.
    pub async fn list_members(
        &self,
        project_id: ProjectId,
        acting: &Email,
    ) -> MembershipResult<Vec<MemberView>> {
        self.require_any(project_id, acting).await?;

        let members = self.store.list_members(project_id).await?;
        let mut views = Vec::with_capacity(members.len());
        for member in members {
            let name = self
                .store
                .find_user(member.email())
                .await?
                .map_or_else(|| member.email().to_string(), |user| user.display_name().to_string());
            let display_name = match member.status() {
                MemberStatus::Pending => format!("{name} (Pending)"),
                MemberStatus::Active => name,
            };
            let active_task_count = self
                .store
                .count_open_assigned_tasks(project_id, member.email())
                .await?;
            views.push(MemberView {
                email: member.email().clone(),
                display_name,
                role: member.role(),
                status: member.status(),
                active_task_count,
            });
        }
        Ok(views)
    }

    /// Returns the role `acting` holds in the project.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::AccessDenied`] when `acting` has no
    /// membership.
    pub async fn role_of(&self, acting: &Email, project_id: ProjectId) -> MembershipResult<ProjectRole> {
        let member = self.require_any(project_id, acting).await?;
        Ok(member.role())
    }

    /// Returns whether `email` holds at least one active membership.
    ///
    /// # Errors
    ///
    /// Returns a repository error when the lookup fails.
    pub async fn has_any_active_project(&self, email: &Email) -> MembershipResult<bool> {
        let memberships = self.store.list_memberships(email).await?;
        Ok(memberships.iter().any(ProjectMember::is_active))
    }

    /// Lists the projects in which `email` is an active member.
    ///
    /// # Errors
    ///
    /// Returns a repository error when a lookup fails.
    pub async fn list_projects(&self, email: &Email) -> MembershipResult<Vec<ProjectDescriptor>> {
        let memberships = self.store.list_memberships(email).await?;
        let mut projects = Vec::new();
        for member in memberships.into_iter().filter(ProjectMember::is_active) {
            if let Some(project) = self.store.find_project(member.project_id()).await? {
                projects.push(self.describe(&project, member.role()).await?);
            }
        }
        Ok(projects)
    }

    /// Returns a project as seen by `acting`.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::ProjectNotFound`],
    /// [`MembershipError::AccessDenied`] for non-members, or
    /// [`MembershipError::InvitationNotAccepted`] while the caller's
    /// membership is pending.
    pub async fn get_project(
        &self,
        project_id: ProjectId,
        acting: &Email,
    ) -> MembershipResult<ProjectDescriptor> {
        let project = self.load_project(project_id).await?;
        let member = self.require_any(project_id, acting).await?;
        if !member.is_active() {
            warn!(project_id = %project_id, email = %acting, "pending member denied project access");
            return Err(MembershipError::InvitationNotAccepted);
        }
        self.describe(&project, member.role()).await
    }

    /// Renames a project.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::ProjectNotFound`],
    /// [`MembershipError::AccessDenied`] unless `acting` is an admin, or
    /// [`MembershipError::Domain`] for an invalid name.
    pub async fn rename_project(
        &self,
        project_id: ProjectId,
        acting: &Email,
        name: &str,
    ) -> MembershipResult<ProjectDescriptor> {
        let mut project = self.load_project(project_id).await?;
        let member = self
            .require_role(project_id, acting, ProjectRole::Admin)
            .await?;
        project.rename(ProjectName::new(name)?);
        self.store.update_project(&project).await?;
        info!(project_id = %project_id, name = %project.name(), "project renamed");
        self.describe(&project, member.role()).await
    }

    /// Deletes a project with all its memberships and tasks.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError::ProjectNotFound`] or
    /// [`MembershipError::AccessDenied`] unless `acting` is an admin.
    pub async fn delete_project(&self, project_id: ProjectId, acting: &Email) -> MembershipResult<()> {
        self.load_project(project_id).await?;
        self.require_role(project_id, acting, ProjectRole::Admin)
            .await?;
        if !self.store.delete_project(project_id).await? {
            return Err(MembershipError::ProjectNotFound(project_id));
        }
        info!(project_id = %project_id, deleted_by = %acting, "project deleted");
        Ok(())
    }

    async fn load_project(&self, project_id: ProjectId) -> MembershipResult<Project> {
        self.store
            .find_project(project_id)
            .await?
            .ok_or(MembershipError::ProjectNotFound(project_id))
    }

    async fn require_role(
        &self,
        project_id: ProjectId,
        acting: &Email,
        required: ProjectRole,
    ) -> MembershipResult<ProjectMember> {
        let membership = self.store.find_member(project_id, acting).await?;
        authorize(required, membership).map_err(|denied| {
            warn!(project_id = %project_id, email = %acting, reason = %denied, "authorization denied");
            MembershipError::from(denied)
        })
    }

    async fn require_any(
        &self,
        project_id: ProjectId,
        acting: &Email,
    ) -> MembershipResult<ProjectMember> {
        let membership = self.store.find_member(project_id, acting).await?;
        require_member(membership).map_err(|denied| {
            warn!(project_id = %project_id, email = %acting, reason = %denied, "authorization denied");
            MembershipError::from(denied)
        })
    }

    async fn describe(
        &self,
        project: &Project,
        role: ProjectRole,
    ) -> MembershipResult<ProjectDescriptor> {
        let owner_name = self
            .store
            .find_user(project.owner())
            .await?
            .map(|user| user.display_name().to_string());
        let members = self.store.list_members(project.id()).await?;
        let active = members.iter().filter(|member| member.is_active()).count();
        let member_count =
            u64::try_from(active).map_err(MembershipRepositoryError::persistence)?;

        Ok(ProjectDescriptor {
            id: project.id(),
            name: project.name().clone(),
            owner_email: project.owner().clone(),
            owner_name,
            member_count,
            created_at: project.created_at(),
            role,
        })
    }
}
