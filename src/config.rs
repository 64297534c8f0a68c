//! Runtime configuration read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `DATABASE_URL` | unset (in-memory store) |
//! | `DATABASE_MAX_CONNECTIONS` | `10` |
//! | `TRELLIS_CODE_TTL_MINUTES` | `15` |
//! | `TRELLIS_CODE_DIGITS` | `6` |
//! | `TRELLIS_FRONTEND_URL` | `http://localhost:5173` |
//! | `TRELLIS_MAIL_FROM` | `no-reply@trellis.local` |
//! | `TRELLIS_EVENT_CAPACITY` | `256` |
//! | `TRELLIS_LOG_JSON` | `false` |

use crate::verification::domain::{CodePolicy, VerificationDomainError};
use chrono::Duration;
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CODE_TTL_MINUTES: i64 = 15;
const DEFAULT_CODE_DIGITS: u8 = 6;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_MAIL_FROM: &str = "no-reply@trellis.local";
const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable holds a value that cannot be used.
    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The one-time-code settings do not form a valid policy.
    #[error("invalid one-time-code settings: {0}")]
    CodePolicy(#[from] VerificationDomainError),
}

/// Settings for the trellis daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrellisConfig {
    /// `PostgreSQL` URL; `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Upper bound of the connection pool.
    pub max_connections: u32,
    /// One-time-code lifetime in minutes.
    pub code_ttl_minutes: i64,
    /// One-time-code width.
    pub code_digits: u8,
    /// Base URL used in invitation links.
    pub frontend_url: String,
    /// Sender address for outgoing mail.
    pub mail_from: String,
    /// Per-topic event buffer.
    pub event_capacity: usize,
    /// Emit logs as JSON lines.
    pub log_json: bool,
}

impl Default for TrellisConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            code_ttl_minutes: DEFAULT_CODE_TTL_MINUTES,
            code_digits: DEFAULT_CODE_DIGITS,
            frontend_url: DEFAULT_FRONTEND_URL.to_owned(),
            mail_from: DEFAULT_MAIL_FROM.to_owned(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            log_json: false,
        }
    }
}

impl TrellisConfig {
    /// Loads `.env` when present, then reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is malformed or out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is the normal production case.
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for unset
    /// or blank variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is malformed or out of range.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let config = Self {
            database_url: read("DATABASE_URL"),
            max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                read("DATABASE_MAX_CONNECTIONS"),
                DEFAULT_MAX_CONNECTIONS,
            )?,
            code_ttl_minutes: parse_or(
                "TRELLIS_CODE_TTL_MINUTES",
                read("TRELLIS_CODE_TTL_MINUTES"),
                DEFAULT_CODE_TTL_MINUTES,
            )?,
            code_digits: parse_or(
                "TRELLIS_CODE_DIGITS",
                read("TRELLIS_CODE_DIGITS"),
                DEFAULT_CODE_DIGITS,
            )?,
            frontend_url: read("TRELLIS_FRONTEND_URL")
                .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_owned()),
            mail_from: read("TRELLIS_MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_owned()),
            event_capacity: parse_or(
                "TRELLIS_EVENT_CAPACITY",
                read("TRELLIS_EVENT_CAPACITY"),
                DEFAULT_EVENT_CAPACITY,
            )?,
            log_json: read("TRELLIS_LOG_JSON")
                .map(|value| parse_flag("TRELLIS_LOG_JSON", value))
                .transpose()?
                .unwrap_or(false),
        };
        config.validate()?;
        Ok(config)
    }

    /// Returns the one-time-code policy described by these settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CodePolicy`] for an unsupported width or a
    /// lifetime outside one minute to one week, and [`ConfigError::Invalid`] for a lifetime
    /// too large to represent.
    pub fn code_policy(&self) -> Result<CodePolicy, ConfigError> {
        let ttl = Duration::try_minutes(self.code_ttl_minutes).ok_or_else(|| {
            ConfigError::Invalid {
                name: "TRELLIS_CODE_TTL_MINUTES",
                value: self.code_ttl_minutes.to_string(),
                reason: "out of range".to_owned(),
            }
        })?;
        Ok(CodePolicy::new(self.code_digits, ttl)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: "DATABASE_MAX_CONNECTIONS",
                value: self.max_connections.to_string(),
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid {
                name: "TRELLIS_EVENT_CAPACITY",
                value: self.event_capacity.to_string(),
                reason: "must be at least 1".to_owned(),
            });
        }
        self.code_policy().map(|_| ())
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let Some(value) = raw else {
        return Ok(default);
    };
    value.parse().map_err(|err: T::Err| ConfigError::Invalid {
        name,
        reason: err.to_string(),
        value,
    })
}

fn parse_flag(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value,
            reason: "expected a boolean".to_owned(),
        }),
    }
}
