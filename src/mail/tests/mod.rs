//! Unit tests for the mail module.
