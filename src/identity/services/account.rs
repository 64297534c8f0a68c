//! Registration, verification, and credential management.

use crate::{
    error::ErrorKind,
    identity::{
        domain::{DisplayName, Email, IdentityDomainError, SessionProfile, User},
        ports::{CredentialError, CredentialHasher, UserRepository, UserRepositoryError},
    },
    mail::ports::MailDispatcher,
    membership::{
        domain::ProjectMember,
        ports::{MembershipRepository, MembershipRepositoryError},
    },
    verification::{
        domain::CodePolicy,
        ports::OneTimeCodeRepository,
        services::{OneTimeCodeService, VerificationError},
    },
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Service-level errors for account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Input failed domain validation.
    #[error(transparent)]
    Domain(#[from] IdentityDomainError),

    /// The email is already registered.
    #[error("email already in use: {0}")]
    EmailInUse(Email),

    /// The user is not registered.
    #[error("user not found: {0}")]
    UserNotFound(Email),

    /// Unknown email or wrong credential.
    #[error("invalid email or password")]
    InvalidCredential,

    /// The verification code is missing, expired, or wrong.
    #[error("invalid or expired verification code")]
    InvalidCode,

    /// The new credential equals the current one.
    #[error("new password must differ from the current password")]
    SameCredential,

    /// Credential hashing failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// User repository operation failed.
    #[error(transparent)]
    Repository(UserRepositoryError),

    /// Code storage failed.
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// Membership lookup failed.
    #[error(transparent)]
    Membership(#[from] MembershipRepositoryError),
}

impl AccountError {
    /// Returns the coarse failure category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) => ErrorKind::Validation,
            Self::EmailInUse(_) | Self::SameCredential => ErrorKind::Conflict,
            Self::UserNotFound(_) => ErrorKind::NotFound,
            Self::InvalidCredential => ErrorKind::InvalidCredential,
            Self::InvalidCode => ErrorKind::InvalidCode,
            Self::Credential(_)
            | Self::Repository(_)
            | Self::Verification(_)
            | Self::Membership(_) => ErrorKind::Internal,
        }
    }
}

impl From<UserRepositoryError> for AccountError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::DuplicateEmail(email) => Self::EmailInUse(email),
            UserRepositoryError::NotFound(email) => Self::UserNotFound(email),
            other @ UserRepositoryError::Persistence(_) => Self::Repository(other),
        }
    }
}

/// Result type for account operations.
pub type AccountResult<T> = Result<T, AccountError>;

/// Account flows built on the identity store and one-time codes.
pub struct AccountService<S, H, M, C>
where
    S: UserRepository + OneTimeCodeRepository + MembershipRepository,
    H: CredentialHasher,
    M: MailDispatcher,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    hasher: Arc<H>,
    codes: OneTimeCodeService<S, M, C>,
    clock: Arc<C>,
}

impl<S, H, M, C> AccountService<S, H, M, C>
where
    S: UserRepository + OneTimeCodeRepository + MembershipRepository,
    H: CredentialHasher,
    M: MailDispatcher,
    C: Clock + Send + Sync,
{
    /// Creates an account service issuing codes under the default policy.
    #[must_use]
    pub fn new(store: Arc<S>, hasher: Arc<H>, mailer: Arc<M>, clock: Arc<C>) -> Self {
        let codes = OneTimeCodeService::new(Arc::clone(&store), mailer, Arc::clone(&clock));
        Self {
            store,
            hasher,
            codes,
            clock,
        }
    }

    /// Replaces the verification code policy.
    #[must_use]
    pub fn with_code_policy(mut self, policy: CodePolicy) -> Self {
        self.codes = self.codes.with_policy(policy);
        self
    }

    /// Returns the underlying code service.
    #[must_use]
    pub const fn codes(&self) -> &OneTimeCodeService<S, M, C> {
        &self.codes
    }

    /// Registers an unverified user and sends a verification code.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Domain`] for a malformed email, blank name
    /// or empty credential, and [`AccountError::EmailInUse`] when the
    /// address is taken.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        raw_credential: &str,
    ) -> AccountResult<User> {
        let address = Email::new(email)?;
        let display_name = DisplayName::new(name)?;
        if raw_credential.is_empty() {
            return Err(IdentityDomainError::EmptyCredential.into());
        }
        if self.store.find_user(&address).await?.is_some() {
            return Err(AccountError::EmailInUse(address));
        }

        let hash = self.hasher.hash(raw_credential)?;
        let user = User::register(address, display_name, hash, &*self.clock);
        self.store.store_user(&user).await?;
        info!(email = %user.email(), "user registered");

        self.codes.generate_code(user.email()).await?;
        Ok(user)
    }

    /// Redeems a verification code and marks the user verified.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidCode`] when the code is rejected and
    /// [`AccountError::UserNotFound`] when the user no longer exists.
    pub async fn verify(&self, email: &Email, code: &str) -> AccountResult<User> {
        if !self.codes.validate_code(email, code).await? {
            warn!(email = %email, "verification rejected");
            return Err(AccountError::InvalidCode);
        }
        let user = self.store.mark_verified(email).await?;
        info!(email = %email, "user verified");
        Ok(user)
    }

    /// Issues a fresh code, invalidating the previous one.
    ///
    /// Returns the new code's expiry.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::UserNotFound`] for unregistered addresses.
    pub async fn resend_code(&self, email: &Email) -> AccountResult<DateTime<Utc>> {
        self.load_user(email).await?;
        Ok(self.codes.generate_code(email).await?)
    }

    /// Checks a credential and returns the session profile.
    ///
    /// Unknown addresses and wrong credentials fail identically.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidCredential`] when authentication
    /// fails.
    pub async fn authenticate(
        &self,
        email: &str,
        raw_credential: &str,
    ) -> AccountResult<SessionProfile> {
        let address = Email::new(email).map_err(|_| AccountError::InvalidCredential)?;
        let Some(user) = self.store.find_user(&address).await? else {
            warn!(email = %address, "authentication failed");
            return Err(AccountError::InvalidCredential);
        };
        if !self.hasher.verify(raw_credential, user.credential_hash())? {
            warn!(email = %address, "authentication failed");
            return Err(AccountError::InvalidCredential);
        }

        let memberships = self.store.list_memberships(&address).await?;
        info!(email = %address, "user authenticated");
        Ok(SessionProfile {
            email: user.email().clone(),
            display_name: user.display_name().clone(),
            verified: user.is_verified(),
            last_project: user.last_project(),
            has_active_project: memberships.iter().any(ProjectMember::is_active),
        })
    }

    /// Replaces the user's display name.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Domain`] for a blank name and
    /// [`AccountError::UserNotFound`].
    pub async fn update_display_name(&self, email: &Email, name: &str) -> AccountResult<User> {
        let display_name = DisplayName::new(name)?;
        let user = self
            .store
            .update_display_name(email, &display_name)
            .await?;
        info!(email = %email, "display name updated");
        Ok(user)
    }

    /// Replaces the user's credential after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidCredential`] when `current` is wrong,
    /// [`AccountError::SameCredential`] when `new` equals `current`, and
    /// [`AccountError::Domain`] when `new` is empty.
    pub async fn change_password(
        &self,
        email: &Email,
        current: &str,
        new: &str,
    ) -> AccountResult<()> {
        let user = self.load_user(email).await?;
        if !self.hasher.verify(current, user.credential_hash())? {
            warn!(email = %email, "password change rejected");
            return Err(AccountError::InvalidCredential);
        }
        if new.is_empty() {
            return Err(IdentityDomainError::EmptyCredential.into());
        }
        if new == current {
            return Err(AccountError::SameCredential);
        }

        let hash = self.hasher.hash(new)?;
        self.store.update_credential(user.email(), &hash).await?;
        info!(email = %email, "password changed");
        Ok(())
    }

    async fn load_user(&self, email: &Email) -> AccountResult<User> {
        self.store
            .find_user(email)
            .await?
            .ok_or_else(|| AccountError::UserNotFound(email.clone()))
    }
}
