//! Task lifecycle notifications and their fan-out.
//!
//! Delivery is best-effort and at-most-once: publishers hand a
//! [`domain::Notification`] to an [`ports::EventPublisher`] after the
//! originating write committed, and a failed or unobserved delivery never
//! affects that write.

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
