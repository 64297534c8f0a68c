//! Read models returned by membership operations.

use super::{MemberStatus, ProjectId, ProjectName, ProjectRole};
use crate::identity::domain::Email;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of an invitation.
///
/// The token is deliberately absent; it only travels in the invite mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingMembership {
    /// Project the invitee was invited to.
    pub project_id: ProjectId,
    /// Invitee email.
    pub email: Email,
    /// Role that will be granted on acceptance.
    pub role: ProjectRole,
    /// Always [`MemberStatus::Pending`].
    pub status: MemberStatus,
    /// Invitation timestamp.
    pub invited_at: DateTime<Utc>,
}

/// Member row as shown in a project roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    /// Member email.
    pub email: Email,
    /// Display name, suffixed with ` (Pending)` for unaccepted invitations.
    pub display_name: String,
    /// Granted role.
    pub role: ProjectRole,
    /// Acceptance status.
    pub status: MemberStatus,
    /// Tasks in the project assigned to the member and not cancelled.
    pub active_task_count: u64,
}

/// Project summary from the caller's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    /// Project identifier.
    pub id: ProjectId,
    /// Project name.
    pub name: ProjectName,
    /// Owner email.
    pub owner_email: Email,
    /// Owner display name, when the owner is still registered.
    pub owner_name: Option<String>,
    /// Number of active members.
    pub member_count: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Role held by the caller.
    pub role: ProjectRole,
}
