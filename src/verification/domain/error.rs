//! Error types for verification code validation.

use thiserror::Error;

/// Errors returned while constructing verification values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationDomainError {
    /// The code contains something other than ASCII digits.
    #[error("verification code must be numeric: '{0}'")]
    NonNumericCode(String),

    /// The configured width is outside the supported range.
    #[error("code width must be between {min} and {max} digits, got {actual}")]
    UnsupportedWidth {
        /// Smallest accepted width.
        min: u8,
        /// Largest accepted width.
        max: u8,
        /// Width that was supplied.
        actual: u8,
    },

    /// The configured lifetime is not positive.
    #[error("code lifetime must be positive")]
    NonPositiveLifetime,

    /// The configured lifetime exceeds the supported maximum.
    #[error("code lifetime must be at most {max_minutes} minutes, got {actual_minutes}")]
    LifetimeTooLong {
        /// Longest accepted lifetime in minutes.
        max_minutes: i64,
        /// Lifetime that was supplied, in minutes.
        actual_minutes: i64,
    },

    /// The expiry instant cannot be represented.
    #[error("code expiry is out of range")]
    ExpiryOutOfRange,
}
