//! Notification values.

mod event;
mod topic;

pub use event::Notification;
pub use topic::{ParseTopicError, Topic};
