//! Trellis: collaborative project and task management core.
//!
//! The crate holds the domain rules and service layer behind a team task
//! board. Users register and verify their email with one-time codes,
//! create projects, invite colleagues by email, and assign tasks to
//! active members. Every task change is fanned out to subscribers.
//!
//! # Architecture
//!
//! Each bounded context follows the hexagonal layout:
//!
//! - **Domain**: validated types and aggregates with no infrastructure
//! - **Ports**: async traits for storage, mail and event delivery
//! - **Adapters**: concrete port implementations
//! - **Services**: orchestration of domain rules over the ports
//!
//! # Modules
//!
//! - [`identity`]: accounts, credentials and sessions
//! - [`verification`]: one-time email verification codes
//! - [`membership`]: projects, invitations and role checks
//! - [`task`]: task lifecycle and assignment
//! - [`notification`]: topic-based event fan-out
//! - [`mail`]: outbound mail rendering and delivery
//! - [`persistence`]: in-memory and `PostgreSQL` stores

pub mod clock;
pub mod config;
pub mod error;
pub mod identity;
pub mod mail;
pub mod membership;
pub mod notification;
pub mod persistence;
pub mod task;
pub mod telemetry;
pub mod verification;
