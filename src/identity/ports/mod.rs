//! Port contracts for identity storage and credential checks.

pub mod credentials;
pub mod repository;

pub use credentials::{CredentialError, CredentialHasher};
pub use repository::{UserRepository, UserRepositoryError, UserRepositoryResult};
