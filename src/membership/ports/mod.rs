//! Port contracts for project and membership storage.

pub mod repository;

pub use repository::{
    MembershipRepository, MembershipRepositoryError, MembershipRepositoryResult,
};
