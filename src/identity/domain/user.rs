//! User aggregate.

use super::{DisplayName, Email};
use crate::membership::domain::ProjectId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque hashed credential.
///
/// The wrapped value is whatever the configured hasher produced (for example
/// a PHC string); `Debug` redacts it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialHash(String);

impl CredentialHash {
    /// Wraps a hasher-produced value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the encoded hash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialHash(<redacted>)")
    }
}

/// Registered user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    email: Email,
    display_name: DisplayName,
    credential_hash: CredentialHash,
    verified: bool,
    last_project: Option<ProjectId>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUserData {
    /// Persisted email key.
    pub email: Email,
    /// Persisted display name.
    pub display_name: DisplayName,
    /// Persisted credential hash.
    pub credential_hash: CredentialHash,
    /// Whether the email has been verified.
    pub verified: bool,
    /// Last project the user opened, if any.
    pub last_project: Option<ProjectId>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates an unverified user.
    #[must_use]
    pub fn register(
        email: Email,
        display_name: DisplayName,
        credential_hash: CredentialHash,
        clock: &impl Clock,
    ) -> Self {
        Self {
            email,
            display_name,
            credential_hash,
            verified: false,
            last_project: None,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a user from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            email: data.email,
            display_name: data.display_name,
            credential_hash: data.credential_hash,
            verified: data.verified,
            last_project: data.last_project,
            created_at: data.created_at,
        }
    }

    /// Returns the email key.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Returns the display name.
    #[must_use]
    pub const fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Returns the stored credential hash.
    #[must_use]
    pub const fn credential_hash(&self) -> &CredentialHash {
        &self.credential_hash
    }

    /// Returns whether the email has been verified.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.verified
    }

    /// Returns the last project the user opened.
    #[must_use]
    pub const fn last_project(&self) -> Option<ProjectId> {
        self.last_project
    }

    /// Returns the registration timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Marks the email as verified.
    pub const fn mark_verified(&mut self) {
        self.verified = true;
    }

    /// Replaces the display name.
    pub fn rename(&mut self, display_name: DisplayName) {
        self.display_name = display_name;
    }

    /// Replaces the credential hash.
    pub fn replace_credential(&mut self, credential_hash: CredentialHash) {
        self.credential_hash = credential_hash;
    }

    /// Records the project the user most recently opened.
    pub const fn record_project_visit(&mut self, project_id: ProjectId) {
        self.last_project = Some(project_id);
    }

    /// Forgets the last-visited project.
    pub const fn clear_project_visit(&mut self) {
        self.last_project = None;
    }
}

/// Profile returned after a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProfile {
    /// Authenticated email.
    pub email: Email,
    /// Current display name.
    pub display_name: DisplayName,
    /// Whether the email has been verified.
    pub verified: bool,
    /// Last project the user opened.
    pub last_project: Option<ProjectId>,
    /// Whether the user holds at least one active membership.
    pub has_active_project: bool,
}
