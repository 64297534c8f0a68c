//! Diesel row models and their domain conversions.

use super::schema::{one_time_codes, project_members, projects, tasks, users};
use crate::{
    identity::domain::{CredentialHash, DisplayName, Email, PersistedUserData, User},
    membership::domain::{
        InviteToken, MemberStatus, PersistedMemberData, PersistedProjectData, Project, ProjectId,
        ProjectMember, ProjectName, ProjectRole,
    },
    task::domain::{PersistedTaskData, Task, TaskContent, TaskId, TaskPriority, TaskStatus},
    verification::domain::{OneTimeCode, VerificationCode},
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use thiserror::Error;
use uuid::Uuid;

/// A stored row that no longer satisfies domain validation.
#[derive(Debug, Clone, Error)]
#[error("corrupt {entity} row: {message}")]
pub struct CorruptRow {
    entity: &'static str,
    message: String,
}

impl CorruptRow {
    fn new(entity: &'static str, err: impl std::fmt::Display) -> Self {
        Self {
            entity,
            message: err.to_string(),
        }
    }
}

fn email(entity: &'static str, value: String) -> Result<Email, CorruptRow> {
    Email::new(value).map_err(|err| CorruptRow::new(entity, err))
}

/// Row of the `users` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub email: String,
    pub display_name: String,
    pub credential_hash: String,
    pub verified: bool,
    pub last_project_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn from_domain(user: &User) -> Self {
        Self {
            email: user.email().to_string(),
            display_name: user.display_name().to_string(),
            credential_hash: user.credential_hash().as_str().to_owned(),
            verified: user.is_verified(),
            last_project_id: user.last_project().map(ProjectId::into_inner),
            created_at: user.created_at(),
        }
    }

    pub fn into_domain(self) -> Result<User, CorruptRow> {
        const ENTITY: &str = "user";
        Ok(User::from_persisted(PersistedUserData {
            email: email(ENTITY, self.email)?,
            display_name: DisplayName::new(self.display_name)
                .map_err(|err| CorruptRow::new(ENTITY, err))?,
            credential_hash: CredentialHash::new(self.credential_hash),
            verified: self.verified,
            last_project: self.last_project_id.map(ProjectId::from_uuid),
            created_at: self.created_at,
        }))
    }
}

/// Row of the `one_time_codes` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = one_time_codes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CodeRow {
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl CodeRow {
    pub fn from_domain(code: &OneTimeCode) -> Self {
        Self {
            email: code.email().to_string(),
            code: code.code().as_str().to_owned(),
            expires_at: code.expires_at(),
        }
    }

    pub fn into_domain(self) -> Result<OneTimeCode, CorruptRow> {
        const ENTITY: &str = "one-time code";
        let code = VerificationCode::new(self.code).map_err(|err| CorruptRow::new(ENTITY, err))?;
        Ok(OneTimeCode::from_parts(
            email(ENTITY, self.email)?,
            code,
            self.expires_at,
        ))
    }
}

/// Row of the `projects` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    pub id: Uuid,
    pub name: String,
    pub owner_email: String,
    pub created_at: DateTime<Utc>,
}

impl ProjectRow {
    pub fn from_domain(project: &Project) -> Self {
        Self {
            id: project.id().into_inner(),
            name: project.name().to_string(),
            owner_email: project.owner().to_string(),
            created_at: project.created_at(),
        }
    }

    pub fn into_domain(self) -> Result<Project, CorruptRow> {
        const ENTITY: &str = "project";
        Ok(Project::from_persisted(PersistedProjectData {
            id: ProjectId::from_uuid(self.id),
            name: ProjectName::new(self.name).map_err(|err| CorruptRow::new(ENTITY, err))?,
            owner: email(ENTITY, self.owner_email)?,
            created_at: self.created_at,
        }))
    }
}

/// Row of the `project_members` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = project_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MemberRow {
    pub project_id: Uuid,
    pub user_email: String,
    pub role: String,
    pub status: String,
    pub invite_token: Option<String>,
    pub joined_at: DateTime<Utc>,
}

impl MemberRow {
    pub fn from_domain(member: &ProjectMember) -> Self {
        Self {
            project_id: member.project_id().into_inner(),
            user_email: member.email().to_string(),
            role: member.role().as_str().to_owned(),
            status: member.status().as_str().to_owned(),
            invite_token: member.invite_token().map(|token| token.as_str().to_owned()),
            joined_at: member.joined_at(),
        }
    }

    pub fn into_domain(self) -> Result<ProjectMember, CorruptRow> {
        const ENTITY: &str = "membership";
        let data = PersistedMemberData {
            project_id: ProjectId::from_uuid(self.project_id),
            email: email(ENTITY, self.user_email)?,
            role: ProjectRole::try_from(self.role.as_str())
                .map_err(|err| CorruptRow::new(ENTITY, err))?,
            status: MemberStatus::try_from(self.status.as_str())
                .map_err(|err| CorruptRow::new(ENTITY, err))?,
            invite_token: self.invite_token.map(InviteToken::from_string),
            joined_at: self.joined_at,
        };
        ProjectMember::from_persisted(data).map_err(|err| CorruptRow::new(ENTITY, err))
    }
}

/// Row of the `tasks` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: String,
    pub status: String,
    pub created_by: String,
    pub assignee_email: Option<String>,
    pub is_new: bool,
    pub created_at: DateTime<Utc>,
    pub last_assigned_at: DateTime<Utc>,
    pub revision: i64,
}

impl TaskRow {
    pub fn from_domain(task: &Task) -> Result<Self, CorruptRow> {
        let content = task.content();
        Ok(Self {
            id: task.id().into_inner(),
            project_id: task.project_id().into_inner(),
            title: content.title().to_owned(),
            description: content.description().map(str::to_owned),
            due_date: content.due_date(),
            priority: content.priority().as_str().to_owned(),
            status: task.status().as_str().to_owned(),
            created_by: task.created_by().to_string(),
            assignee_email: task.assignee().map(ToString::to_string),
            is_new: task.is_new(),
            created_at: task.created_at(),
            last_assigned_at: task.last_assigned_at(),
            revision: revision_to_column(task.revision())?,
        })
    }

    pub fn into_domain(self) -> Result<Task, CorruptRow> {
        const ENTITY: &str = "task";
        let priority = TaskPriority::try_from(self.priority.as_str())
            .map_err(|err| CorruptRow::new(ENTITY, err))?;
        let content = TaskContent::new(self.title, self.description, self.due_date, priority)
            .map_err(|err| CorruptRow::new(ENTITY, err))?;
        Ok(Task::from_persisted(PersistedTaskData {
            id: TaskId::from_uuid(self.id),
            project_id: ProjectId::from_uuid(self.project_id),
            content,
            status: TaskStatus::try_from(self.status.as_str())
                .map_err(|err| CorruptRow::new(ENTITY, err))?,
            created_by: email(ENTITY, self.created_by)?,
            assignee: self
                .assignee_email
                .map(|value| email(ENTITY, value))
                .transpose()?,
            is_new: self.is_new,
            created_at: self.created_at,
            last_assigned_at: self.last_assigned_at,
            revision: u64::try_from(self.revision).map_err(|err| CorruptRow::new(ENTITY, err))?,
        }))
    }
}

/// Converts a domain revision to its `BIGINT` column value.
pub fn revision_to_column(revision: u64) -> Result<i64, CorruptRow> {
    i64::try_from(revision).map_err(|err| CorruptRow::new("task", err))
}
