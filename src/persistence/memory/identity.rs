//! [`UserRepository`] over the in-memory store.

use super::InMemoryStore;
use crate::identity::{
    domain::{CredentialHash, DisplayName, Email, User},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};
use async_trait::async_trait;

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn store_user(&self, user: &User) -> UserRepositoryResult<()> {
        let mut state = self.write_state().map_err(UserRepositoryError::persistence)?;
        if state.users.contains_key(user.email()) {
            return Err(UserRepositoryError::DuplicateEmail(user.email().clone()));
        }
        state.users.insert(user.email().clone(), user.clone());
        Ok(())
    }

    async fn mark_verified(&self, email: &Email) -> UserRepositoryResult<User> {
        self.modify_user(email, User::mark_verified)
    }

    async fn update_display_name(
        &self,
        email: &Email,
        display_name: &DisplayName,
    ) -> UserRepositoryResult<User> {
        self.modify_user(email, |user| user.rename(display_name.clone()))
    }

    async fn update_credential(
        &self,
        email: &Email,
        credential_hash: &CredentialHash,
    ) -> UserRepositoryResult<()> {
        self.modify_user(email, |user| {
            user.replace_credential(credential_hash.clone());
        })
        .map(drop)
    }

    async fn find_user(&self, email: &Email) -> UserRepositoryResult<Option<User>> {
        let state = self.read_state().map_err(UserRepositoryError::persistence)?;
        Ok(state.users.get(email).cloned())
    }
}

impl InMemoryStore {
    fn modify_user(
        &self,
        email: &Email,
        change: impl FnOnce(&mut User),
    ) -> UserRepositoryResult<User> {
        let mut state = self.write_state().map_err(UserRepositoryError::persistence)?;
        let Some(stored) = state.users.get_mut(email) else {
            return Err(UserRepositoryError::NotFound(email.clone()));
        };
        change(stored);
        Ok(stored.clone())
    }
}
