//! Publishing port.

use crate::notification::domain::{Notification, Topic};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Hands notifications to subscribers.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes `notification` on its topic.
    ///
    /// Having no subscribers is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when the channel cannot accept the event.
    async fn publish(&self, notification: Notification) -> Result<(), PublishError>;
}

/// Errors returned by event publishers.
#[derive(Debug, Clone, Error)]
pub enum PublishError {
    /// The publisher has no channel for the topic.
    #[error("no channel for topic {0}")]
    UnknownTopic(Topic),

    /// Delivery infrastructure failed.
    #[error("delivery failed: {0}")]
    Delivery(Arc<dyn std::error::Error + Send + Sync>),
}

impl PublishError {
    /// Wraps a delivery error.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery(Arc::new(err))
    }
}
