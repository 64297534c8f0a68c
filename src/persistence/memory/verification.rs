//! [`OneTimeCodeRepository`] over the in-memory store.

use super::InMemoryStore;
use crate::{
    identity::domain::Email,
    verification::{
        domain::{OneTimeCode, VerificationCode},
        ports::{OneTimeCodeRepository, OneTimeCodeRepositoryError, OneTimeCodeRepositoryResult},
    },
};
use async_trait::async_trait;

#[async_trait]
impl OneTimeCodeRepository for InMemoryStore {
    async fn replace_code(&self, code: &OneTimeCode) -> OneTimeCodeRepositoryResult<()> {
        let mut state = self
            .write_state()
            .map_err(OneTimeCodeRepositoryError::persistence)?;
        state.codes.insert(code.email().clone(), code.clone());
        Ok(())
    }

    async fn find_code(&self, email: &Email) -> OneTimeCodeRepositoryResult<Option<OneTimeCode>> {
        let state = self
            .read_state()
            .map_err(OneTimeCodeRepositoryError::persistence)?;
        Ok(state.codes.get(email).cloned())
    }

    async fn remove_code(
        &self,
        email: &Email,
        code: &VerificationCode,
    ) -> OneTimeCodeRepositoryResult<bool> {
        let mut state = self
            .write_state()
            .map_err(OneTimeCodeRepositoryError::persistence)?;
        let matches = state
            .codes
            .get(email)
            .is_some_and(|stored| stored.code() == code);
        if matches {
            state.codes.remove(email);
        }
        Ok(matches)
    }
}
