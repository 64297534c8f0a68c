//! Fire-and-forget dispatch on the tokio runtime.

use crate::{
    identity::domain::Email,
    mail::{
        domain::InviteMail,
        ports::{MailDispatcher, MailResult},
    },
    verification::domain::VerificationCode,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

/// Runs each send of the wrapped dispatcher as a detached task.
///
/// Calls return as soon as the task is spawned; delivery failures are only
/// logged. Must be used from within a tokio runtime.
pub struct BackgroundMailDispatcher<D> {
    inner: Arc<D>,
}

impl<D> BackgroundMailDispatcher<D> {
    /// Wraps `inner`.
    #[must_use]
    pub const fn new(inner: Arc<D>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<D> MailDispatcher for BackgroundMailDispatcher<D>
where
    D: MailDispatcher + 'static,
{
    async fn send_code(&self, to: &Email, code: &VerificationCode) -> MailResult<()> {
        let inner = Arc::clone(&self.inner);
        let recipient = to.clone();
        let owned_code = code.clone();
        tokio::spawn(async move {
            match inner.send_code(&recipient, &owned_code).await {
                Ok(()) => debug!(email = %recipient, "verification mail sent"),
                Err(err) => error!(email = %recipient, error = %err, "verification mail failed"),
            }
        });
        Ok(())
    }

    async fn send_invite(&self, invite: &InviteMail) -> MailResult<()> {
        let inner = Arc::clone(&self.inner);
        let owned_invite = invite.clone();
        tokio::spawn(async move {
            match inner.send_invite(&owned_invite).await {
                Ok(()) => debug!(email = %owned_invite.to, "invitation mail sent"),
                Err(err) => {
                    error!(email = %owned_invite.to, error = %err, "invitation mail failed");
                }
            }
        });
        Ok(())
    }
}
