//! Adapter implementations for identity ports.

mod argon2;

pub use self::argon2::Argon2CredentialHasher;
