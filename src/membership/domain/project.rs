//! Project aggregate.

use super::{MembershipDomainError, ProjectId};
use crate::identity::domain::Email;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated project name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectName(String);

impl ProjectName {
    /// Longest project name accepted by storage.
    pub const MAX_LENGTH: usize = 100;

    /// Creates a validated project name.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipDomainError::EmptyProjectName`] for blank input
    /// and [`MembershipDomainError::ProjectNameTooLong`] past
    /// [`Self::MAX_LENGTH`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, MembershipDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MembershipDomainError::EmptyProjectName);
        }
        let length = trimmed.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(MembershipDomainError::ProjectNameTooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared workspace owning members and tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: ProjectName,
    owner: Email,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProjectData {
    /// Persisted project identifier.
    pub id: ProjectId,
    /// Persisted name.
    pub name: ProjectName,
    /// Email of the creating user.
    pub owner: Email,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new project owned by `owner`.
    #[must_use]
    pub fn create(name: ProjectName, owner: Email, clock: &impl Clock) -> Self {
        Self {
            id: ProjectId::new(),
            name,
            owner,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            owner: data.owner,
            created_at: data.created_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the project name.
    #[must_use]
    pub const fn name(&self) -> &ProjectName {
        &self.name
    }

    /// Returns the owner's email.
    #[must_use]
    pub const fn owner(&self) -> &Email {
        &self.owner
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Replaces the project name.
    pub fn rename(&mut self, name: ProjectName) {
        self.name = name;
    }
}
