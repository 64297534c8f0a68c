//! [`OneTimeCodeRepository`] over `PostgreSQL`.

use super::{PostgresStore, models::CodeRow, schema::one_time_codes};
use crate::{
    identity::domain::Email,
    verification::{
        domain::{OneTimeCode, VerificationCode},
        ports::{OneTimeCodeRepository, OneTimeCodeRepositoryError, OneTimeCodeRepositoryResult},
    },
};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;

#[async_trait]
impl OneTimeCodeRepository for PostgresStore {
    async fn replace_code(&self, code: &OneTimeCode) -> OneTimeCodeRepositoryResult<()> {
        let row = CodeRow::from_domain(code);
        self.run_blocking(move |connection| {
            diesel::insert_into(one_time_codes::table)
                .values(&row)
                .on_conflict(one_time_codes::email)
                .do_update()
                .set((
                    one_time_codes::code.eq(excluded(one_time_codes::code)),
                    one_time_codes::expires_at.eq(excluded(one_time_codes::expires_at)),
                ))
                .execute(connection)?;
            Ok(())
        })
        .await
    }

    async fn find_code(&self, email: &Email) -> OneTimeCodeRepositoryResult<Option<OneTimeCode>> {
        let key = email.to_string();
        self.run_blocking(move |connection| {
            let row = one_time_codes::table
                .find(&key)
                .select(CodeRow::as_select())
                .first::<CodeRow>(connection)
                .optional()?;
            row.map(CodeRow::into_domain)
                .transpose()
                .map_err(OneTimeCodeRepositoryError::persistence)
        })
        .await
    }

    async fn remove_code(
        &self,
        email: &Email,
        code: &VerificationCode,
    ) -> OneTimeCodeRepositoryResult<bool> {
        let key = email.to_string();
        let value = code.as_str().to_owned();
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                one_time_codes::table
                    .filter(one_time_codes::email.eq(&key))
                    .filter(one_time_codes::code.eq(&value)),
            )
            .execute(connection)?;
            Ok(deleted > 0)
        })
        .await
    }
}
