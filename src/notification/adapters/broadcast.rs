//! In-process fan-out over tokio broadcast channels.

use crate::notification::{
    domain::{Notification, Topic},
    ports::{EventPublisher, PublishError},
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::broadcast;
use tracing::trace;

/// One broadcast channel per topic.
///
/// Every receiver sees each event published after it subscribed. Receivers
/// that fall more than `capacity` events behind skip the oldest ones; the
/// fan-out never buffers beyond that.
#[derive(Debug, Clone)]
pub struct BroadcastFanout {
    channels: HashMap<Topic, broadcast::Sender<Notification>>,
}

impl BroadcastFanout {
    /// Creates channels for every topic, each buffering `capacity` events.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let channels = Topic::ALL
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity.max(1)).0))
            .collect();
        Self { channels }
    }

    /// Registers a new listener on `topic`.
    ///
    /// Returns `None` only if the topic has no channel, which cannot happen
    /// for fan-outs built with [`Self::new`].
    #[must_use]
    pub fn subscribe(&self, topic: Topic) -> Option<broadcast::Receiver<Notification>> {
        self.channels.get(&topic).map(broadcast::Sender::subscribe)
    }

    /// Returns the number of live listeners on `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.channels
            .get(&topic)
            .map_or(0, broadcast::Sender::receiver_count)
    }
}

#[async_trait]
impl EventPublisher for BroadcastFanout {
    async fn publish(&self, notification: Notification) -> Result<(), PublishError> {
        let topic = notification.topic();
        let sender = self
            .channels
            .get(&topic)
            .ok_or(PublishError::UnknownTopic(topic))?;
        match sender.send(notification) {
            Ok(receivers) => trace!(topic = %topic, receivers, "notification fanned out"),
            Err(_) => trace!(topic = %topic, "notification dropped, no subscribers"),
        }
        Ok(())
    }
}
