//! Repository port for one-time codes.

use crate::{
    identity::domain::Email,
    verification::domain::{OneTimeCode, VerificationCode},
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for one-time code repository operations.
pub type OneTimeCodeRepositoryResult<T> = Result<T, OneTimeCodeRepositoryError>;

/// One-time code persistence contract.
///
/// Implementations keep at most one code per email address.
#[async_trait]
pub trait OneTimeCodeRepository: Send + Sync {
    /// Stores `code`, atomically discarding any code previously held for
    /// the same email.
    ///
    /// # Errors
    ///
    /// Returns [`OneTimeCodeRepositoryError::Persistence`] when storage
    /// fails.
    async fn replace_code(&self, code: &OneTimeCode) -> OneTimeCodeRepositoryResult<()>;

    /// Returns the live code for `email`, if any.
    async fn find_code(&self, email: &Email) -> OneTimeCodeRepositoryResult<Option<OneTimeCode>>;

    /// Deletes the code for `email` if it still equals `code`.
    ///
    /// Returns `true` when a row was removed. Concurrent validators race on
    /// this call, so only one of them observes `true`.
    async fn remove_code(
        &self,
        email: &Email,
        code: &VerificationCode,
    ) -> OneTimeCodeRepositoryResult<bool>;
}

/// Errors returned by one-time code repository implementations.
#[derive(Debug, Clone, Error)]
pub enum OneTimeCodeRepositoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl OneTimeCodeRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
