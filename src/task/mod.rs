//! Task lifecycle management.
//!
//! Tasks belong to a project and may be assigned to one of its active
//! members. This module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Orchestration services in [`services`]
//!
//! Storage adapters live in [`crate::persistence`] because member removal
//! must unassign tasks in the same transaction.

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
