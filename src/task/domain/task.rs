//! Task aggregate root and assignment-change rules.

use super::{TaskContent, TaskId, TaskStatus};
use crate::{identity::domain::Email, membership::domain::ProjectId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Effect an update had on a task's assignee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentChange {
    /// A different user (possibly the first) now holds the task.
    Reassigned,
    /// The assignee is the same as before.
    Unchanged,
    /// The previous assignee was removed.
    Cleared,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    project_id: ProjectId,
    #[serde(flatten)]
    content: TaskContent,
    status: TaskStatus,
    created_by: Email,
    assignee: Option<Email>,
    is_new: bool,
    created_at: DateTime<Utc>,
    last_assigned_at: DateTime<Utc>,
    revision: u64,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Persisted descriptive fields.
    pub content: TaskContent,
    /// Persisted status.
    pub status: TaskStatus,
    /// Email of the creator.
    pub created_by: Email,
    /// Email of the assignee, if any.
    pub assignee: Option<Email>,
    /// Whether the assignee has yet to acknowledge the task.
    pub is_new: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last time the assignee changed.
    pub last_assigned_at: DateTime<Utc>,
    /// Write counter used for optimistic concurrency.
    pub revision: u64,
}

impl Task {
    /// Creates a new task flagged as unseen.
    #[must_use]
    pub fn create(
        project_id: ProjectId,
        created_by: Email,
        content: TaskContent,
        status: TaskStatus,
        assignee: Option<Email>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            project_id,
            content,
            status,
            created_by,
            assignee,
            is_new: true,
            created_at: timestamp,
            last_assigned_at: timestamp,
            revision: 0,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            content: data.content,
            status: data.status,
            created_by: data.created_by,
            assignee: data.assignee,
            is_new: data.is_new,
            created_at: data.created_at,
            last_assigned_at: data.last_assigned_at,
            revision: data.revision,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the descriptive fields.
    #[must_use]
    pub const fn content(&self) -> &TaskContent {
        &self.content
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the creator's email.
    #[must_use]
    pub const fn created_by(&self) -> &Email {
        &self.created_by
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assignee(&self) -> Option<&Email> {
        self.assignee.as_ref()
    }

    /// Returns whether the assignee has yet to acknowledge the task.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.is_new
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the assignee last changed.
    #[must_use]
    pub const fn last_assigned_at(&self) -> DateTime<Utc> {
        self.last_assigned_at
    }

    /// Returns the write counter.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Overwrites content, status and assignee.
    ///
    /// Only a change of assignee to a different user sets `is_new` and
    /// refreshes `last_assigned_at`; keeping the same assignee or clearing
    /// it leaves both untouched.
    pub fn apply_update(
        &mut self,
        content: TaskContent,
        status: TaskStatus,
        assignee: Option<Email>,
        clock: &impl Clock,
    ) -> AssignmentChange {
        self.content = content;
        self.status = status;

        let change = match (&self.assignee, &assignee) {
            (Some(_), None) => AssignmentChange::Cleared,
            (None, None) => AssignmentChange::Unchanged,
            (Some(current), Some(next)) if current == next => AssignmentChange::Unchanged,
            (_, Some(_)) => AssignmentChange::Reassigned,
        };

        self.assignee = assignee;
        if change == AssignmentChange::Reassigned {
            self.is_new = true;
            self.last_assigned_at = clock.utc();
        }
        change
    }

    /// Overwrites the status.
    pub const fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    /// Overwrites the unseen flag.
    pub const fn set_is_new(&mut self, is_new: bool) {
        self.is_new = is_new;
    }

    /// Removes the assignee without touching the assignment timestamps.
    pub fn unassign(&mut self) {
        self.assignee = None;
    }

    /// Advances the write counter after a successful store write.
    pub const fn bump_revision(&mut self) {
        self.revision += 1;
    }
}
