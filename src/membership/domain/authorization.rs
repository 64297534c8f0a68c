//! Role checks over membership rows.

use super::{ProjectMember, ProjectRole};
use thiserror::Error;

/// Reason an authorization check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessDenied {
    /// The caller has no membership row for the project.
    #[error("you are not a member of this project")]
    NotMember,

    /// The caller is a member but holds a different role.
    #[error("only project {required}s may perform this action (caller is {actual})")]
    InsufficientRole {
        /// Role the operation requires.
        required: ProjectRole,
        /// Role the caller holds.
        actual: ProjectRole,
    },
}

/// Checks that `membership` exists and holds exactly `required`.
///
/// The membership status is not consulted: a pending admin passes an admin
/// check.
///
/// # Errors
///
/// Returns [`AccessDenied::NotMember`] when `membership` is `None` and
/// [`AccessDenied::InsufficientRole`] when the role differs.
pub fn authorize(
    required: ProjectRole,
    membership: Option<ProjectMember>,
) -> Result<ProjectMember, AccessDenied> {
    let member = require_member(membership)?;
    if member.role() != required {
        return Err(AccessDenied::InsufficientRole {
            required,
            actual: member.role(),
        });
    }
    Ok(member)
}

/// Checks that `membership` exists, whatever its role.
///
/// # Errors
///
/// Returns [`AccessDenied::NotMember`] when `membership` is `None`.
pub fn require_member(membership: Option<ProjectMember>) -> Result<ProjectMember, AccessDenied> {
    membership.ok_or(AccessDenied::NotMember)
}
