//! Notification topics.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Channel a notification is published on.
///
/// The serialized form is the event type name carried in payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Topic {
    /// A task was created.
    TaskCreated,
    /// A task's fields were overwritten.
    TaskUpdated,
    /// A task's status changed.
    TaskStatusUpdated,
    /// A task's unseen flag changed.
    TaskNewState,
    /// A task was deleted.
    TaskDeleted,
}

impl Topic {
    /// Every topic, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::TaskCreated,
        Self::TaskUpdated,
        Self::TaskStatusUpdated,
        Self::TaskNewState,
        Self::TaskDeleted,
    ];

    /// Returns the subscription name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskCreated => "task-created",
            Self::TaskUpdated => "task-updated",
            Self::TaskStatusUpdated => "task-status-updated",
            Self::TaskNewState => "task-new-state",
            Self::TaskDeleted => "task-deleted",
        }
    }

    /// Returns the event type name.
    #[must_use]
    pub const fn event_type(self) -> &'static str {
        match self {
            Self::TaskCreated => "TASK_CREATED",
            Self::TaskUpdated => "TASK_UPDATED",
            Self::TaskStatusUpdated => "TASK_STATUS_UPDATED",
            Self::TaskNewState => "TASK_NEW_STATE",
            Self::TaskDeleted => "TASK_DELETED",
        }
    }
}

/// Error returned while parsing topic names.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown topic: {0}")]
pub struct ParseTopicError(pub String);

impl TryFrom<&str> for Topic {
    type Error = ParseTopicError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value
            .trim()
            .trim_start_matches("/topic/")
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|topic| topic.as_str() == normalized)
            .ok_or_else(|| ParseTopicError(value.to_owned()))
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
