//! Transport that writes mail to the log.

use crate::mail::{
    domain::OutgoingMail,
    ports::{MailResult, MailTransport},
};
use async_trait::async_trait;
use tracing::{debug, info};

/// Logs each message instead of sending it.
///
/// Bodies, which include codes and invite links, are logged at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn deliver(&self, mail: OutgoingMail) -> MailResult<()> {
        info!(from = %mail.from, to = %mail.to, subject = %mail.subject, "mail handed to log transport");
        debug!(to = %mail.to, body = %mail.body, "mail body");
        Ok(())
    }
}
