//! Membership roles and statuses.

use super::{ParseMemberStatusError, ParseProjectRoleError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role held by a project member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectRole {
    /// May invite and remove members and manage tasks.
    Admin,
    /// May view and progress tasks.
    Employee,
}

impl ProjectRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Employee => "employee",
        }
    }
}

impl Default for ProjectRole {
    fn default() -> Self {
        Self::Employee
    }
}

impl TryFrom<&str> for ProjectRole {
    type Error = ParseProjectRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "admin" | "project_admin" => Ok(Self::Admin),
            "employee" | "project_employee" => Ok(Self::Employee),
            _ => Err(ParseProjectRoleError(value.to_owned())),
        }
    }
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a membership has been accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    /// Invited but not yet accepted.
    Pending,
    /// Accepted, or created as the project owner.
    Active,
}

impl MemberStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
        }
    }
}

impl TryFrom<&str> for MemberStatus {
    type Error = ParseMemberStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            _ => Err(ParseMemberStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
