//! Argon2id credential hasher.

use crate::identity::{
    domain::CredentialHash,
    ports::{CredentialError, CredentialHasher},
};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// [`CredentialHasher`] backed by Argon2id PHC strings.
#[derive(Debug, Clone)]
pub struct Argon2CredentialHasher {
    params: Params,
}

impl Argon2CredentialHasher {
    /// Creates a hasher with the library's recommended parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Creates a hasher with explicit cost parameters.
    ///
    /// `memory_kib` is the memory cost, `iterations` the time cost and
    /// `lanes` the degree of parallelism.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Hash`] when the parameters are rejected.
    pub fn with_params(memory_kib: u32, iterations: u32, lanes: u32) -> Result<Self, CredentialError> {
        let params = Params::new(memory_kib, iterations, lanes, None)
            .map_err(|err| CredentialError::Hash(format!("invalid parameters: {err}")))?;
        Ok(Self { params })
    }

    fn engine(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, raw: &str) -> Result<CredentialHash, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let encoded = self
            .engine()
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|err| CredentialError::Hash(err.to_string()))?;
        Ok(CredentialHash::new(encoded.to_string()))
    }

    fn verify(&self, raw: &str, hash: &CredentialHash) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(hash.as_str())
            .map_err(|err| CredentialError::MalformedHash(err.to_string()))?;
        Ok(self
            .engine()
            .verify_password(raw.as_bytes(), &parsed)
            .is_ok())
    }
}
