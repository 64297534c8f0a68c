//! Port contracts for notification delivery.

pub mod publisher;

pub use publisher::{EventPublisher, PublishError};
