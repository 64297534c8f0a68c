//! Publisher that keeps every notification in memory.

use crate::notification::{
    domain::{Notification, Topic},
    ports::{EventPublisher, PublishError},
};
use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};

/// Records published notifications in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    published: Arc<RwLock<Vec<Notification>>>,
}

impl RecordingPublisher {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything published so far.
    #[must_use]
    pub fn published(&self) -> Vec<Notification> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the topics published so far, in order.
    #[must_use]
    pub fn topics(&self) -> Vec<Topic> {
        self.published().iter().map(Notification::topic).collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, notification: Notification) -> Result<(), PublishError> {
        self.published
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
        Ok(())
    }
}
