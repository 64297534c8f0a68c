//! Error types for membership domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing membership values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MembershipDomainError {
    /// The project name is empty after trimming.
    #[error("project name must not be empty")]
    EmptyProjectName,

    /// The project name exceeds the storage limit.
    #[error("project name exceeds {max} characters: {actual}")]
    ProjectNameTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// A persisted membership carries a token without being pending, or is
    /// pending without a token.
    #[error("membership status '{status}' is inconsistent with its invite token")]
    InconsistentInvite {
        /// Persisted status value.
        status: String,
    },
}

/// Error returned while parsing project roles.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown project role: {0}")]
pub struct ParseProjectRoleError(pub String);

/// Error returned while parsing membership statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown membership status: {0}")]
pub struct ParseMemberStatusError(pub String);
