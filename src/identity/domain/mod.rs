//! Domain model for user identities.
//!
//! A user is keyed by an immutable, normalized email address. Credential
//! hashes are opaque strings produced by a
//! [`CredentialHasher`](crate::identity::ports::CredentialHasher); the domain
//! never sees raw credentials beyond validation.

mod email;
mod error;
mod user;

pub use email::{DisplayName, Email};
pub use error::IdentityDomainError;
pub use user::{CredentialHash, PersistedUserData, SessionProfile, User};
