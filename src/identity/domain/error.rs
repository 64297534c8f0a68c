//! Error types for identity domain validation.

use thiserror::Error;

/// Errors returned while constructing identity values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityDomainError {
    /// The email address is not of the form `local@domain.tld`.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    /// The display name is empty after trimming.
    #[error("display name must not be empty")]
    EmptyDisplayName,

    /// The display name exceeds the storage limit.
    #[error("display name exceeds {max} characters: {actual}")]
    DisplayNameTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// The raw credential is empty.
    #[error("credential must not be empty")]
    EmptyCredential,
}
