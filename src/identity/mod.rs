//! User identities and account flows.
//!
//! Users are keyed by a normalized email address. Credentials are stored as
//! opaque hashes produced by a [`ports::CredentialHasher`]; the bundled
//! adapter uses Argon2id.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
