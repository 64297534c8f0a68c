//! [`TaskRepository`] over `PostgreSQL`.

use super::{
    PostgresStore,
    models::TaskRow,
    schema::{project_members, tasks},
};
use crate::{
    identity::domain::Email,
    membership::domain::{MemberStatus, ProjectId},
    task::{
        domain::{Task, TaskId, TaskStatus},
        ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Share-locks the assignee's active membership for the rest of the
/// transaction, failing when there is none.
fn lock_assignee(
    connection: &mut PgConnection,
    project_id: ProjectId,
    assignee: Option<&Email>,
) -> TaskRepositoryResult<()> {
    let Some(email) = assignee else {
        return Ok(());
    };
    let locked = project_members::table
        .find((project_id.into_inner(), email.as_str()))
        .filter(project_members::status.eq(MemberStatus::Active.as_str()))
        .select(project_members::user_email)
        .for_share()
        .first::<String>(connection)
        .optional()?;
    if locked.is_none() {
        return Err(TaskRepositoryError::AssigneeNotActive {
            project_id,
            email: email.clone(),
        });
    }
    Ok(())
}

fn decode_tasks(rows: Vec<TaskRow>) -> TaskRepositoryResult<Vec<Task>> {
    rows.into_iter()
        .map(|row| row.into_domain().map_err(TaskRepositoryError::persistence))
        .collect()
}

#[async_trait]
impl TaskRepository for PostgresStore {
    async fn store_task(&self, task: &Task) -> TaskRepositoryResult<()> {
        let row = TaskRow::from_domain(task).map_err(TaskRepositoryError::persistence)?;
        let snapshot = task.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                lock_assignee(tx, snapshot.project_id(), snapshot.assignee())?;
                diesel::insert_into(tasks::table)
                    .values(&row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TaskRepositoryError::DuplicateTask(snapshot.id())
                        }
                        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                            TaskRepositoryError::ProjectNotFound(snapshot.project_id())
                        }
                        _ => TaskRepositoryError::persistence(err),
                    })?;
                Ok(())
            })
        })
        .await
    }

    async fn update_task(&self, task: &Task) -> TaskRepositoryResult<Task> {
        let row = TaskRow::from_domain(task).map_err(TaskRepositoryError::persistence)?;
        let snapshot = task.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                lock_assignee(tx, snapshot.project_id(), snapshot.assignee())?;
                let updated = diesel::update(
                    tasks::table
                        .filter(tasks::id.eq(row.id))
                        .filter(tasks::revision.eq(row.revision)),
                )
                .set((
                    tasks::title.eq(&row.title),
                    tasks::description.eq(&row.description),
                    tasks::due_date.eq(row.due_date),
                    tasks::priority.eq(&row.priority),
                    tasks::status.eq(&row.status),
                    tasks::assignee_email.eq(&row.assignee_email),
                    tasks::is_new.eq(row.is_new),
                    tasks::last_assigned_at.eq(row.last_assigned_at),
                    tasks::revision.eq(tasks::revision + 1),
                ))
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(tx)
                .optional()?;

                if let Some(stored) = updated {
                    return stored.into_domain().map_err(TaskRepositoryError::persistence);
                }

                let exists = tasks::table
                    .find(row.id)
                    .select(tasks::id)
                    .first::<uuid::Uuid>(tx)
                    .optional()?
                    .is_some();
                if exists {
                    Err(TaskRepositoryError::StaleRevision {
                        id: snapshot.id(),
                        expected: snapshot.revision(),
                    })
                } else {
                    Err(TaskRepositoryError::NotFound(snapshot.id()))
                }
            })
        })
        .await
    }

    async fn find_task(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(TaskRow::into_domain)
                .transpose()
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn delete_task(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = diesel::delete(tasks::table.find(id.into_inner()))
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .optional()?;
            row.map(TaskRow::into_domain)
                .transpose()
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn list_project_tasks(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::project_id.eq(project_id.into_inner()))
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            decode_tasks(rows)
        })
        .await
    }

    async fn count_open_assigned_tasks(
        &self,
        project_id: ProjectId,
        email: &Email,
    ) -> TaskRepositoryResult<u64> {
        let key = email.to_string();
        self.run_blocking(move |connection| {
            let count = tasks::table
                .filter(tasks::project_id.eq(project_id.into_inner()))
                .filter(tasks::assignee_email.eq(&key))
                .filter(tasks::status.ne(TaskStatus::Cancelled.as_str()))
                .count()
                .get_result::<i64>(connection)?;
            u64::try_from(count).map_err(TaskRepositoryError::persistence)
        })
        .await
    }
}
