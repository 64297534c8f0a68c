//! Dispatcher that keeps sent mail in memory.

use crate::{
    identity::domain::Email,
    mail::{
        domain::InviteMail,
        ports::{MailDispatcher, MailResult},
    },
    verification::domain::VerificationCode,
};
use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};

/// Message captured by [`RecordingMailDispatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMail {
    /// A verification code.
    Code {
        /// Recipient.
        to: Email,
        /// Code sent.
        code: VerificationCode,
    },
    /// A project invitation.
    Invite(InviteMail),
}

/// Records every message instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailDispatcher {
    sent: Arc<RwLock<Vec<SentMail>>>,
}

impl RecordingMailDispatcher {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the most recent code sent to `email`.
    #[must_use]
    pub fn last_code_for(&self, email: &Email) -> Option<VerificationCode> {
        self.sent().into_iter().rev().find_map(|mail| match mail {
            SentMail::Code { to, code } if &to == email => Some(code),
            _ => None,
        })
    }

    /// Returns the most recent invitation sent to `email`.
    #[must_use]
    pub fn last_invite_for(&self, email: &Email) -> Option<InviteMail> {
        self.sent().into_iter().rev().find_map(|mail| match mail {
            SentMail::Invite(invite) if &invite.to == email => Some(invite),
            _ => None,
        })
    }

    fn record(&self, mail: SentMail) {
        self.sent
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(mail);
    }
}

#[async_trait]
impl MailDispatcher for RecordingMailDispatcher {
    async fn send_code(&self, to: &Email, code: &VerificationCode) -> MailResult<()> {
        self.record(SentMail::Code {
            to: to.clone(),
            code: code.clone(),
        });
        Ok(())
    }

    async fn send_invite(&self, invite: &InviteMail) -> MailResult<()> {
        self.record(SentMail::Invite(invite.clone()));
        Ok(())
    }
}
