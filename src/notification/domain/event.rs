//! Notification envelope.

use super::Topic;
use crate::{
    membership::domain::ProjectId,
    task::domain::{Task, TaskId},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Fact published after a task mutation committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "eventType")]
    topic: Topic,
    project_id: ProjectId,
    payload: Value,
    timestamp: DateTime<Utc>,
}

impl Notification {
    /// Creates a notification with an arbitrary payload.
    #[must_use]
    pub fn new(topic: Topic, project_id: ProjectId, payload: Value, clock: &impl Clock) -> Self {
        Self {
            topic,
            project_id,
            payload,
            timestamp: clock.utc(),
        }
    }

    /// Creates a notification whose payload is the full task.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] when the task cannot be encoded.
    pub fn with_task(topic: Topic, task: &Task, clock: &impl Clock) -> Result<Self, serde_json::Error> {
        let payload = serde_json::to_value(task)?;
        Ok(Self::new(topic, task.project_id(), payload, clock))
    }

    /// Creates a [`Topic::TaskNewState`] notification carrying only the
    /// task id and flag.
    #[must_use]
    pub fn new_state(task: &Task, clock: &impl Clock) -> Self {
        let payload = json!({ "id": task.id(), "isNew": task.is_new() });
        Self::new(Topic::TaskNewState, task.project_id(), payload, clock)
    }

    /// Creates a [`Topic::TaskDeleted`] notification carrying only the id.
    #[must_use]
    pub fn deleted(id: TaskId, project_id: ProjectId, clock: &impl Clock) -> Self {
        Self::new(Topic::TaskDeleted, project_id, json!(id), clock)
    }

    /// Returns the topic.
    #[must_use]
    pub const fn topic(&self) -> Topic {
        self.topic
    }

    /// Returns the event type name.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        self.topic.event_type()
    }

    /// Returns the project the event concerns.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the payload.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Returns the publication timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
