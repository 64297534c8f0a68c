//! Application services for project membership.

mod authority;

pub use authority::{MembershipError, MembershipResult, MembershipService};
