//! Error taxonomy shared by every service boundary.
//!
//! Each service keeps its own `thiserror` enum with precise variants. The
//! boundary layer only needs the coarse [`ErrorKind`] to pick a stable
//! external status, so every service error exposes a `kind()` accessor that
//! maps onto this enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse failure category surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A project, task, user, or membership does not exist.
    NotFound,
    /// The caller has no membership, or the wrong role.
    Unauthorized,
    /// The request clashes with existing state.
    Conflict,
    /// Email or credential did not authenticate.
    InvalidCredential,
    /// Invitation token is unknown or already consumed.
    InvalidToken,
    /// Verification code is unknown, expired, or wrong.
    InvalidCode,
    /// Input failed domain validation.
    Validation,
    /// Storage or collaborator failure.
    Internal,
}

impl ErrorKind {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::Conflict => "conflict",
            Self::InvalidCredential => "invalid_credential",
            Self::InvalidToken => "invalid_token",
            Self::InvalidCode => "invalid_code",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
