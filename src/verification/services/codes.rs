//! Issuing and redeeming one-time codes.

use crate::{
    error::ErrorKind,
    identity::domain::Email,
    mail::ports::MailDispatcher,
    verification::{
        domain::{CodePolicy, OneTimeCode, VerificationDomainError},
        ports::{OneTimeCodeRepository, OneTimeCodeRepositoryError},
    },
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

/// Service-level errors for verification code operations.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// The code could not be issued under the active policy.
    #[error(transparent)]
    Domain(#[from] VerificationDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] OneTimeCodeRepositoryError),
}

impl VerificationError {
    /// Returns the coarse failure category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) | Self::Repository(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for verification code operations.
pub type VerificationResult<T> = Result<T, VerificationError>;

/// Issues codes, mails them, and validates them.
#[derive(Clone)]
pub struct OneTimeCodeService<S, M, C>
where
    S: OneTimeCodeRepository,
    M: MailDispatcher,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    mailer: Arc<M>,
    clock: Arc<C>,
    policy: CodePolicy,
}

impl<S, M, C> OneTimeCodeService<S, M, C>
where
    S: OneTimeCodeRepository,
    M: MailDispatcher,
    C: Clock + Send + Sync,
{
    /// Creates a service issuing six-digit codes valid for fifteen minutes.
    #[must_use]
    pub fn new(store: Arc<S>, mailer: Arc<M>, clock: Arc<C>) -> Self {
        Self {
            store,
            mailer,
            clock,
            policy: CodePolicy::default(),
        }
    }

    /// Replaces the code width and lifetime.
    #[must_use]
    pub fn with_policy(mut self, policy: CodePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the active policy.
    #[must_use]
    pub const fn policy(&self) -> CodePolicy {
        self.policy
    }

    /// Issues a new code for `email`, discarding any previous one, and
    /// requests its delivery.
    ///
    /// Delivery failures are logged and do not fail the call. Returns the
    /// expiry of the new code.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError::Domain`] when the expiry cannot be
    /// represented and [`VerificationError::Repository`] when the code
    /// cannot be stored.
    pub async fn generate_code(&self, email: &Email) -> VerificationResult<DateTime<Utc>> {
        let issued = OneTimeCode::issue(email.clone(), self.policy, &*self.clock)?;
        self.store.replace_code(&issued).await?;
        info!(email = %email, expires_at = %issued.expires_at(), "verification code issued");

        if let Err(err) = self.mailer.send_code(email, issued.code()).await {
            error!(email = %email, error = %err, "failed to dispatch verification code");
        }
        Ok(issued.expires_at())
    }

    /// Checks `candidate` against the live code for `email`.
    ///
    /// An expired code is deleted and rejected. A matching code is deleted
    /// and accepted exactly once, even under concurrent attempts. A
    /// mismatching code is rejected and kept, so the user may retry until
    /// it expires.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError::Repository`] when storage fails.
    pub async fn validate_code(&self, email: &Email, candidate: &str) -> VerificationResult<bool> {
        let Some(stored) = self.store.find_code(email).await? else {
            debug!(email = %email, "no verification code on record");
            return Ok(false);
        };

        if stored.is_expired_at(self.clock.utc()) {
            self.store.remove_code(email, stored.code()).await?;
            info!(email = %email, "expired verification code discarded");
            return Ok(false);
        }

        if !stored.code().matches(candidate) {
            debug!(email = %email, "verification code mismatch");
            return Ok(false);
        }

        let consumed = self.store.remove_code(email, stored.code()).await?;
        if consumed {
            info!(email = %email, "verification code redeemed");
        }
        Ok(consumed)
    }
}
