//! Adapter implementations for the publishing port.

pub mod broadcast;
pub mod memory;

pub use broadcast::BroadcastFanout;
pub use memory::RecordingPublisher;
