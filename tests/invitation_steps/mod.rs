//! Step definitions for project invitation scenarios.

pub mod given;
