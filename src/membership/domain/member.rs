//! Project membership entity.
//!
//! A membership is either pending, in which case it carries the invite
//! token that will activate it, or active, in which case no token exists.
//! Encoding the token inside the pending state makes a token on an active
//! row unrepresentable.

use super::{InviteToken, MemberStatus, MembershipDomainError, ProjectId, ProjectRole};
use crate::identity::domain::Email;
use chrono::{DateTime, Utc};
use mockable::Clock;

/// Acceptance state of a membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipState {
    /// Waiting for the invitee to redeem `token`.
    Pending {
        /// Single-use invitation secret.
        token: InviteToken,
    },
    /// Accepted membership.
    Active,
}

/// Link between a user and a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMember {
    project_id: ProjectId,
    email: Email,
    role: ProjectRole,
    state: MembershipState,
    joined_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMemberData {
    /// Project the membership belongs to.
    pub project_id: ProjectId,
    /// Member email.
    pub email: Email,
    /// Granted role.
    pub role: ProjectRole,
    /// Persisted status.
    pub status: MemberStatus,
    /// Persisted invite token, present only while pending.
    pub invite_token: Option<InviteToken>,
    /// Invitation or acceptance timestamp.
    pub joined_at: DateTime<Utc>,
}

impl ProjectMember {
    /// Creates the active admin membership of a project's creator.
    #[must_use]
    pub fn owner(project_id: ProjectId, email: Email, clock: &impl Clock) -> Self {
        Self {
            project_id,
            email,
            role: ProjectRole::Admin,
            state: MembershipState::Active,
            joined_at: clock.utc(),
        }
    }

    /// Creates a pending membership with a freshly generated token.
    #[must_use]
    pub fn invited(
        project_id: ProjectId,
        email: Email,
        role: ProjectRole,
        clock: &impl Clock,
    ) -> Self {
        Self {
            project_id,
            email,
            role,
            state: MembershipState::Pending {
                token: InviteToken::generate(),
            },
            joined_at: clock.utc(),
        }
    }

    /// Reconstructs a membership from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipDomainError::InconsistentInvite`] when the stored
    /// token does not agree with the stored status.
    pub fn from_persisted(data: PersistedMemberData) -> Result<Self, MembershipDomainError> {
        let state = match (data.status, data.invite_token) {
            (MemberStatus::Pending, Some(token)) => MembershipState::Pending { token },
            (MemberStatus::Active, None) => MembershipState::Active,
            (status, _) => {
                return Err(MembershipDomainError::InconsistentInvite {
                    status: status.as_str().to_owned(),
                });
            }
        };
        Ok(Self {
            project_id: data.project_id,
            email: data.email,
            role: data.role,
            state,
            joined_at: data.joined_at,
        })
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the member email.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Returns the granted role.
    #[must_use]
    pub const fn role(&self) -> ProjectRole {
        self.role
    }

    /// Returns the acceptance state.
    #[must_use]
    pub const fn state(&self) -> &MembershipState {
        &self.state
    }

    /// Returns the derived status.
    #[must_use]
    pub const fn status(&self) -> MemberStatus {
        match self.state {
            MembershipState::Pending { .. } => MemberStatus::Pending,
            MembershipState::Active => MemberStatus::Active,
        }
    }

    /// Returns whether the membership has been accepted.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, MembershipState::Active)
    }

    /// Returns the invite token while pending.
    #[must_use]
    pub const fn invite_token(&self) -> Option<&InviteToken> {
        match &self.state {
            MembershipState::Pending { token } => Some(token),
            MembershipState::Active => None,
        }
    }

    /// Returns when the member was invited or accepted.
    #[must_use]
    pub const fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    /// Activates a pending membership, consuming its token.
    ///
    /// Returns `false` without changes when the membership was already
    /// active.
    pub fn accept(&mut self, accepted_at: DateTime<Utc>) -> bool {
        if self.is_active() {
            return false;
        }
        self.state = MembershipState::Active;
        self.joined_at = accepted_at;
        true
    }
}
