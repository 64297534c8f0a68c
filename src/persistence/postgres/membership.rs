//! [`MembershipRepository`] over `PostgreSQL`.

use super::{
    PostgresStore,
    models::{MemberRow, ProjectRow},
    schema::{project_members, projects, tasks, users},
};
use crate::{
    identity::domain::Email,
    membership::{
        domain::{InviteToken, MemberStatus, Project, ProjectId, ProjectMember},
        ports::{MembershipRepository, MembershipRepositoryError, MembershipRepositoryResult},
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

fn decode_members(rows: Vec<MemberRow>) -> MembershipRepositoryResult<Vec<ProjectMember>> {
    rows.into_iter()
        .map(|row| row.into_domain().map_err(MembershipRepositoryError::persistence))
        .collect()
}

#[async_trait]
impl MembershipRepository for PostgresStore {
    async fn create_project(
        &self,
        project: &Project,
        owner: &ProjectMember,
    ) -> MembershipRepositoryResult<()> {
        let project_row = ProjectRow::from_domain(project);
        let member_row = MemberRow::from_domain(owner);
        let owner_email = owner.email().clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, MembershipRepositoryError, _>(|tx| {
                diesel::insert_into(projects::table)
                    .values(&project_row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                            MembershipRepositoryError::OwnerNotFound(owner_email.clone())
                        }
                        _ => MembershipRepositoryError::persistence(err),
                    })?;
                diesel::insert_into(project_members::table)
                    .values(&member_row)
                    .execute(tx)?;
                diesel::update(users::table.find(owner_email.as_str()))
                    .set(users::last_project_id.eq(Some(project_row.id)))
                    .execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_project(&self, id: ProjectId) -> MembershipRepositoryResult<Option<Project>> {
        self.run_blocking(move |connection| {
            let row = projects::table
                .find(id.into_inner())
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()?;
            row.map(ProjectRow::into_domain)
                .transpose()
                .map_err(MembershipRepositoryError::persistence)
        })
        .await
    }

    async fn update_project(&self, project: &Project) -> MembershipRepositoryResult<()> {
        let row = ProjectRow::from_domain(project);
        let id = project.id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(projects::table.find(row.id))
                .set(projects::name.eq(&row.name))
                .execute(connection)?;
            if updated == 0 {
                return Err(MembershipRepositoryError::ProjectNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_project(&self, id: ProjectId) -> MembershipRepositoryResult<bool> {
        // Memberships and tasks cascade; users.last_project_id is set to NULL.
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(projects::table.find(id.into_inner())).execute(connection)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn find_member(
        &self,
        project_id: ProjectId,
        email: &Email,
    ) -> MembershipRepositoryResult<Option<ProjectMember>> {
        let key = email.to_string();
        self.run_blocking(move |connection| {
            let row = project_members::table
                .find((project_id.into_inner(), &key))
                .select(MemberRow::as_select())
                .first::<MemberRow>(connection)
                .optional()?;
            row.map(MemberRow::into_domain)
                .transpose()
                .map_err(MembershipRepositoryError::persistence)
        })
        .await
    }

    async fn add_member(&self, member: &ProjectMember) -> MembershipRepositoryResult<()> {
        let row = MemberRow::from_domain(member);
        let project_id = member.project_id();
        let email = member.email().clone();
        self.run_blocking(move |connection| {
            diesel::insert_into(project_members::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        MembershipRepositoryError::DuplicateMember {
                            project_id,
                            email: email.clone(),
                        }
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        MembershipRepositoryError::ProjectNotFound(project_id)
                    }
                    _ => MembershipRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn accept_invitation(
        &self,
        token: &InviteToken,
        accepted_at: DateTime<Utc>,
    ) -> MembershipRepositoryResult<Option<ProjectMember>> {
        let token_value = token.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = diesel::update(
                project_members::table
                    .filter(project_members::invite_token.eq(&token_value))
                    .filter(project_members::status.eq(MemberStatus::Pending.as_str())),
            )
            .set((
                project_members::status.eq(MemberStatus::Active.as_str()),
                project_members::invite_token.eq(None::<String>),
                project_members::joined_at.eq(accepted_at),
            ))
            .returning(MemberRow::as_returning())
            .get_result::<MemberRow>(connection)
            .optional()?;
            row.map(MemberRow::into_domain)
                .transpose()
                .map_err(MembershipRepositoryError::persistence)
        })
        .await
    }

    async fn remove_member(
        &self,
        project_id: ProjectId,
        email: &Email,
    ) -> MembershipRepositoryResult<u64> {
        let key = email.to_string();
        let target = email.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, MembershipRepositoryError, _>(|tx| {
                let locked = project_members::table
                    .find((project_id.into_inner(), &key))
                    .select(MemberRow::as_select())
                    .for_update()
                    .first::<MemberRow>(tx)
                    .optional()?;
                if locked.is_none() {
                    return Err(MembershipRepositoryError::MemberNotFound {
                        project_id,
                        email: target.clone(),
                    });
                }

                let unassigned = diesel::update(
                    tasks::table
                        .filter(tasks::project_id.eq(project_id.into_inner()))
                        .filter(tasks::assignee_email.eq(&key)),
                )
                .set((
                    tasks::assignee_email.eq(None::<String>),
                    tasks::revision.eq(tasks::revision + 1),
                ))
                .execute(tx)?;

                diesel::delete(project_members::table.find((project_id.into_inner(), &key)))
                    .execute(tx)?;

                u64::try_from(unassigned).map_err(MembershipRepositoryError::persistence)
            })
        })
        .await
    }

    async fn list_members(
        &self,
        project_id: ProjectId,
    ) -> MembershipRepositoryResult<Vec<ProjectMember>> {
        self.run_blocking(move |connection| {
            let rows = project_members::table
                .filter(project_members::project_id.eq(project_id.into_inner()))
                .order((project_members::joined_at.asc(), project_members::user_email.asc()))
                .select(MemberRow::as_select())
                .load::<MemberRow>(connection)?;
            decode_members(rows)
        })
        .await
    }

    async fn list_memberships(
        &self,
        email: &Email,
    ) -> MembershipRepositoryResult<Vec<ProjectMember>> {
        let key = email.to_string();
        self.run_blocking(move |connection| {
            let rows = project_members::table
                .filter(project_members::user_email.eq(&key))
                .order(project_members::joined_at.asc())
                .select(MemberRow::as_select())
                .load::<MemberRow>(connection)?;
            decode_members(rows)
        })
        .await
    }
}
