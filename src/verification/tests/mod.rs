//! Unit tests for one-time verification codes.
