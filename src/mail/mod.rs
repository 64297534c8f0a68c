//! Outbound mail for verification codes and project invitations.
//!
//! Services talk to a [`ports::MailDispatcher`]. The bundled
//! [`adapters::TemplateMailer`] renders messages with `minijinja` and hands
//! them to a [`ports::MailTransport`]; wrapping any dispatcher in
//! [`adapters::BackgroundMailDispatcher`] moves delivery off the caller's
//! path.

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
