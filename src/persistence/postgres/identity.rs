//! [`UserRepository`] over `PostgreSQL`.

use super::{PostgresStore, models::UserRow, schema::users};
use crate::identity::{
    domain::{CredentialHash, DisplayName, Email, User},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

fn decode_updated(row: Option<UserRow>, email: Email) -> UserRepositoryResult<User> {
    row.ok_or(UserRepositoryError::NotFound(email))?
        .into_domain()
        .map_err(UserRepositoryError::persistence)
}

#[async_trait]
impl UserRepository for PostgresStore {
    async fn store_user(&self, user: &User) -> UserRepositoryResult<()> {
        let row = UserRow::from_domain(user);
        let email = user.email().clone();
        self.run_blocking(move |connection| {
            diesel::insert_into(users::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        UserRepositoryError::DuplicateEmail(email.clone())
                    }
                    _ => UserRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn mark_verified(&self, email: &Email) -> UserRepositoryResult<User> {
        let target = email.clone();
        self.run_blocking(move |connection| {
            let row = diesel::update(users::table.find(target.as_str()))
                .set(users::verified.eq(true))
                .returning(UserRow::as_returning())
                .get_result::<UserRow>(connection)
                .optional()?;
            decode_updated(row, target)
        })
        .await
    }

    async fn update_display_name(
        &self,
        email: &Email,
        display_name: &DisplayName,
    ) -> UserRepositoryResult<User> {
        let target = email.clone();
        let name = display_name.to_string();
        self.run_blocking(move |connection| {
            let row = diesel::update(users::table.find(target.as_str()))
                .set(users::display_name.eq(&name))
                .returning(UserRow::as_returning())
                .get_result::<UserRow>(connection)
                .optional()?;
            decode_updated(row, target)
        })
        .await
    }

    async fn update_credential(
        &self,
        email: &Email,
        credential_hash: &CredentialHash,
    ) -> UserRepositoryResult<()> {
        let target = email.clone();
        let hash = credential_hash.as_str().to_owned();
        self.run_blocking(move |connection| {
            let updated = diesel::update(users::table.find(target.as_str()))
                .set(users::credential_hash.eq(&hash))
                .execute(connection)?;
            if updated == 0 {
                return Err(UserRepositoryError::NotFound(target));
            }
            Ok(())
        })
        .await
    }

    async fn find_user(&self, email: &Email) -> UserRepositoryResult<Option<User>> {
        let key = email.to_string();
        self.run_blocking(move |connection| {
            let row = users::table
                .find(&key)
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()?;
            row.map(UserRow::into_domain)
                .transpose()
                .map_err(UserRepositoryError::persistence)
        })
        .await
    }
}
