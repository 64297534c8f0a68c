//! Storage adapters implementing every repository port.
//!
//! A single store value implements the identity, verification, membership,
//! and task ports so that operations spanning several aggregates (removing
//! a member and unassigning their tasks, deleting a project with its rows)
//! run as one atomic unit.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::{PgPool, PostgresStore};
