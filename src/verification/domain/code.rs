//! Verification code values and the stored code record.

use super::VerificationDomainError;
use crate::identity::domain::Email;
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-width numeric code.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Wraps an existing code.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationDomainError::NonNumericCode`] when the value is
    /// empty or contains non-digit characters.
    pub fn new(value: impl Into<String>) -> Result<Self, VerificationDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(VerificationDomainError::NonNumericCode(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Draws a uniformly random, zero-padded code as wide as `policy`
    /// requires.
    #[must_use]
    pub fn generate(policy: CodePolicy) -> Self {
        let digits = policy.digits();
        let upper = 10_u64.pow(u32::from(digits));
        let value = rand::thread_rng().gen_range(0..upper);
        Self(format!("{value:0width$}", width = usize::from(digits)))
    }

    /// Returns the code digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether `candidate` equals this code, ignoring surrounding
    /// whitespace.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate.trim()
    }
}

impl fmt::Debug for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerificationCode(<redacted>)")
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Width and lifetime applied to newly issued codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePolicy {
    digits: u8,
    ttl: Duration,
}

impl CodePolicy {
    /// Narrowest supported code.
    pub const MIN_DIGITS: u8 = 4;
    /// Widest supported code.
    pub const MAX_DIGITS: u8 = 9;
    /// Longest supported lifetime, one week.
    pub const MAX_TTL_MINUTES: i64 = 7 * 24 * 60;

    /// Creates a validated policy.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationDomainError`] when the width is outside
    /// [`Self::MIN_DIGITS`]..=[`Self::MAX_DIGITS`] or the lifetime is not
    /// within `(0, MAX_TTL_MINUTES]`.
    pub fn new(digits: u8, ttl: Duration) -> Result<Self, VerificationDomainError> {
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits) {
            return Err(VerificationDomainError::UnsupportedWidth {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
                actual: digits,
            });
        }
        if ttl <= Duration::zero() {
            return Err(VerificationDomainError::NonPositiveLifetime);
        }
        if ttl > Duration::minutes(Self::MAX_TTL_MINUTES) {
            return Err(VerificationDomainError::LifetimeTooLong {
                max_minutes: Self::MAX_TTL_MINUTES,
                actual_minutes: ttl.num_minutes(),
            });
        }
        Ok(Self { digits, ttl })
    }

    /// Returns the code width.
    #[must_use]
    pub const fn digits(&self) -> u8 {
        self.digits
    }

    /// Returns the code lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for CodePolicy {
    fn default() -> Self {
        Self {
            digits: 6,
            ttl: Duration::minutes(15),
        }
    }
}

/// Stored code bound to an email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneTimeCode {
    email: Email,
    code: VerificationCode,
    expires_at: DateTime<Utc>,
}

impl OneTimeCode {
    /// Issues a fresh random code for `email` under `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationDomainError::ExpiryOutOfRange`] when the clock
    /// is so close to the end of the calendar that the expiry overflows.
    pub fn issue(
        email: Email,
        policy: CodePolicy,
        clock: &impl Clock,
    ) -> Result<Self, VerificationDomainError> {
        let expires_at = clock
            .utc()
            .checked_add_signed(policy.ttl())
            .ok_or(VerificationDomainError::ExpiryOutOfRange)?;
        Ok(Self {
            email,
            code: VerificationCode::generate(policy),
            expires_at,
        })
    }

    /// Reconstructs a stored code.
    #[must_use]
    pub const fn from_parts(email: Email, code: VerificationCode, expires_at: DateTime<Utc>) -> Self {
        Self {
            email,
            code,
            expires_at,
        }
    }

    /// Returns the bound email address.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Returns the code.
    #[must_use]
    pub const fn code(&self) -> &VerificationCode {
        &self.code
    }

    /// Returns the expiry instant.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns whether the code has lapsed at `now`.
    ///
    /// The expiry instant itself is still within the lifetime.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
