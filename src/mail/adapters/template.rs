//! Template-driven mail composition.

use crate::{
    identity::domain::Email,
    mail::{
        domain::{InviteMail, OutgoingMail},
        ports::{MailDispatcher, MailError, MailResult, MailTransport},
    },
    verification::domain::VerificationCode,
};
use async_trait::async_trait;
use minijinja::{Environment, Value, context};

const CODE_SUBJECT: &str = "code_subject";
const CODE_BODY: &str = "code_body";
const INVITE_SUBJECT: &str = "invite_subject";
const INVITE_BODY: &str = "invite_body";

const TEMPLATES: [(&str, &str); 4] = [
    (CODE_SUBJECT, "Trellis verification code"),
    (
        CODE_BODY,
        "Your verification code is: {{ code }}\n\nThis code expires in {{ ttl_minutes }} minutes.",
    ),
    (INVITE_SUBJECT, "You've been invited to join {{ project }}"),
    (
        INVITE_BODY,
        "You have been invited to join {{ project }} as {{ role }}.\n\n\
         Accept the invitation here: {{ link }}",
    ),
];

/// Renders messages and hands them to a [`MailTransport`].
pub struct TemplateMailer<T> {
    environment: Environment<'static>,
    transport: T,
    from: String,
    frontend_url: String,
    code_ttl_minutes: i64,
}

impl<T: MailTransport> TemplateMailer<T> {
    /// Creates a mailer sending from `from` and linking invitations to
    /// `frontend_url`.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Render`] when a bundled template fails to
    /// compile.
    pub fn new(
        transport: T,
        from: impl Into<String>,
        frontend_url: impl Into<String>,
    ) -> MailResult<Self> {
        let mut environment = Environment::new();
        for (name, source) in TEMPLATES {
            environment
                .add_template(name, source)
                .map_err(|err| render_error(name, &err))?;
        }
        Ok(Self {
            environment,
            transport,
            from: from.into(),
            frontend_url: frontend_url.into().trim_end_matches('/').to_owned(),
            code_ttl_minutes: 15,
        })
    }

    /// Sets the lifetime quoted in verification mails.
    #[must_use]
    pub fn with_code_ttl_minutes(mut self, minutes: i64) -> Self {
        self.code_ttl_minutes = minutes;
        self
    }

    /// Returns the link that redeems `token`.
    #[must_use]
    pub fn invite_link(&self, token: &str) -> String {
        format!("{}/accept-invite?token={token}", self.frontend_url)
    }

    /// Renders the verification mail for `to`.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Render`] when rendering fails.
    pub fn compose_code(&self, to: &Email, code: &VerificationCode) -> MailResult<OutgoingMail> {
        let values = context! {
            code => code.as_str(),
            ttl_minutes => self.code_ttl_minutes,
        };
        self.compose(to, CODE_SUBJECT, CODE_BODY, &values)
    }

    /// Renders the invitation mail.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Render`] when rendering fails.
    pub fn compose_invite(&self, invite: &InviteMail) -> MailResult<OutgoingMail> {
        let values = context! {
            project => invite.project_name.as_str(),
            role => invite.role.as_str(),
            link => self.invite_link(invite.token.as_str()),
        };
        self.compose(&invite.to, INVITE_SUBJECT, INVITE_BODY, &values)
    }

    fn compose(
        &self,
        to: &Email,
        subject_template: &str,
        body_template: &str,
        values: &Value,
    ) -> MailResult<OutgoingMail> {
        Ok(OutgoingMail {
            from: self.from.clone(),
            to: to.clone(),
            subject: self.render(subject_template, values)?,
            body: self.render(body_template, values)?,
        })
    }

    fn render(&self, name: &str, values: &Value) -> MailResult<String> {
        self.environment
            .get_template(name)
            .and_then(|template| template.render(values))
            .map_err(|err| render_error(name, &err))
    }
}

fn render_error(template: &str, err: &minijinja::Error) -> MailError {
    MailError::Render {
        template: template.to_owned(),
        message: err.to_string(),
    }
}

#[async_trait]
impl<T: MailTransport> MailDispatcher for TemplateMailer<T> {
    async fn send_code(&self, to: &Email, code: &VerificationCode) -> MailResult<()> {
        let mail = self.compose_code(to, code)?;
        self.transport.deliver(mail).await
    }

    async fn send_invite(&self, invite: &InviteMail) -> MailResult<()> {
        let mail = self.compose_invite(invite)?;
        self.transport.deliver(mail).await
    }
}
