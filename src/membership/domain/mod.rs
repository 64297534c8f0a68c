//! Domain model for projects and their memberships.

mod authorization;
mod error;
mod ids;
mod member;
mod project;
mod role;
mod views;

pub use authorization::{AccessDenied, authorize, require_member};
pub use error::{MembershipDomainError, ParseMemberStatusError, ParseProjectRoleError};
pub use ids::{InviteToken, ProjectId};
pub use member::{MembershipState, PersistedMemberData, ProjectMember};
pub use project::{PersistedProjectData, Project, ProjectName};
pub use role::{MemberStatus, ProjectRole};
pub use views::{MemberView, PendingMembership, ProjectDescriptor};
