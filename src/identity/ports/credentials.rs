//! Credential hashing port.
//!
//! The hashing algorithm is an adapter decision; services only need to turn
//! a raw credential into an opaque [`CredentialHash`] and check a raw value
//! against one.

use crate::identity::domain::CredentialHash;
use thiserror::Error;

/// Hashes and verifies raw credentials.
pub trait CredentialHasher: Send + Sync {
    /// Produces a salted hash for `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Hash`] when the backend fails.
    fn hash(&self, raw: &str) -> Result<CredentialHash, CredentialError>;

    /// Returns whether `raw` matches `hash`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::MalformedHash`] when `hash` cannot be
    /// decoded by this hasher.
    fn verify(&self, raw: &str, hash: &CredentialHash) -> Result<bool, CredentialError>;
}

/// Errors returned by credential hashers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    /// Hashing failed.
    #[error("failed to hash credential: {0}")]
    Hash(String),

    /// The stored hash is not in a format the hasher understands.
    #[error("malformed credential hash: {0}")]
    MalformedHash(String),
}
