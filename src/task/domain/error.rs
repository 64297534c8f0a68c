//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the storage limit.
    #[error("task title exceeds {max} characters: {actual}")]
    TitleTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// The task description exceeds the storage limit.
    #[error("task description exceeds {max} characters: {actual}")]
    DescriptionTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Length that was supplied.
        actual: usize,
    },
}

/// Error returned while parsing task statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);
