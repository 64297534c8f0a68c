//! Repository port for user identities.

use crate::identity::domain::{CredentialHash, DisplayName, Email, User};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user repository operations.
pub type UserRepositoryResult<T> = Result<T, UserRepositoryError>;

/// Identity persistence contract.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a newly registered user.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::DuplicateEmail`] when the email is
    /// already registered.
    async fn store_user(&self, user: &User) -> UserRepositoryResult<()>;

    /// Sets the verified flag and returns the stored user.
    ///
    /// Only the flag is written, so concurrent changes to other columns
    /// are kept.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::NotFound`] when the user does not
    /// exist.
    async fn mark_verified(&self, email: &Email) -> UserRepositoryResult<User>;

    /// Replaces the display name and returns the stored user.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::NotFound`] when the user does not
    /// exist.
    async fn update_display_name(
        &self,
        email: &Email,
        display_name: &DisplayName,
    ) -> UserRepositoryResult<User>;

    /// Replaces the credential hash.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::NotFound`] when the user does not
    /// exist.
    async fn update_credential(
        &self,
        email: &Email,
        credential_hash: &CredentialHash,
    ) -> UserRepositoryResult<()>;

    /// Finds a user by email.
    ///
    /// Returns `None` when no user is registered under the address.
    async fn find_user(&self, email: &Email) -> UserRepositoryResult<Option<User>>;
}

/// Errors returned by user repository implementations.
#[derive(Debug, Clone, Error)]
pub enum UserRepositoryError {
    /// A user with the same email already exists.
    #[error("email already registered: {0}")]
    DuplicateEmail(Email),

    /// The user was not found.
    #[error("user not found: {0}")]
    NotFound(Email),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
