//! Mail message values.

use crate::{
    identity::domain::Email,
    membership::domain::{InviteToken, ProjectName, ProjectRole},
};

/// Invitation to be mailed to a prospective member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteMail {
    /// Invitee address.
    pub to: Email,
    /// Name of the project the invitee may join.
    pub project_name: ProjectName,
    /// Role granted on acceptance.
    pub role: ProjectRole,
    /// Token redeemed by the acceptance link.
    pub token: InviteToken,
}

/// Fully rendered message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: Email,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}
