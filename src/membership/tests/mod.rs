//! Unit tests for the membership module.
