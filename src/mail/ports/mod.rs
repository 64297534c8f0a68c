//! Port contracts for outbound mail.

use crate::{
    identity::domain::Email,
    mail::domain::{InviteMail, OutgoingMail},
    verification::domain::VerificationCode,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for mail operations.
pub type MailResult<T> = Result<T, MailError>;

/// Sends the messages the core needs.
///
/// Callers treat failures as non-fatal: they log and carry on.
#[async_trait]
pub trait MailDispatcher: Send + Sync {
    /// Sends a verification code to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`MailError`] when the message cannot be rendered or handed
    /// off.
    async fn send_code(&self, to: &Email, code: &VerificationCode) -> MailResult<()>;

    /// Sends a project invitation.
    ///
    /// # Errors
    ///
    /// Returns [`MailError`] when the message cannot be rendered or handed
    /// off.
    async fn send_invite(&self, invite: &InviteMail) -> MailResult<()>;
}

/// Delivers rendered messages.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Delivers `mail`.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Transport`] when delivery fails.
    async fn deliver(&self, mail: OutgoingMail) -> MailResult<()>;
}

/// Errors returned by mail dispatchers and transports.
#[derive(Debug, Clone, Error)]
pub enum MailError {
    /// A template failed to render.
    #[error("failed to render mail template '{template}': {message}")]
    Render {
        /// Template name.
        template: String,
        /// Renderer message.
        message: String,
    },

    /// The transport rejected the message.
    #[error("mail transport failed: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl MailError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
