//! One-time verification codes.
//!
//! Codes are short numeric strings bound to an email address. At most one
//! live code exists per address: issuing a new code replaces the previous
//! one. A stored code is consumed on the first matching validation or on
//! the first validation attempt after it expired; a mismatching attempt
//! before expiry leaves it in place.

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
