use std::sync::Arc;

use portfolio_core_contact_contracts::{ContactSendMessageError, ContactService};
use portfolio_email_contracts::{ContentType, Email, EmailService};
use portfolio_models::{
    contact::{validate, ContactMessage},
    email_address::{EmailAddress, EmailAddressWithName},
};
use portfolio_templates_contracts::{ContactMessageTemplate, TemplateService};
use tracing::{info, warn};

pub const SUBJECT_PREFIX: &str = "Portfolio Contact: ";

#[derive(Debug, Clone)]
pub struct ContactServiceImpl<Email, Template> {
    pub email: Email,
    pub template: Template,
    pub config: ContactServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ContactServiceConfig {
    /// Fixed recipient of every relayed message.
    pub recipient: Arc<EmailAddressWithName>,
}

impl<EmailS, TemplateS> ContactService for ContactServiceImpl<EmailS, TemplateS>
where
    EmailS: EmailService,
    TemplateS: TemplateService,
{
    async fn send_message(&self, message: ContactMessage) -> Result<(), ContactSendMessageError> {
        let errors = validate(&message);
        if !errors.is_empty() {
            return Err(ContactSendMessageError::Invalid(errors));
        }

        let reply_to = reply_to(&message);
        let subject = format!("{SUBJECT_PREFIX}{}", message.subject);
        let body = self.template.render(&ContactMessageTemplate {
            name: message.name,
            email: message.email,
            subject: message.subject,
            message: message.message,
        })?;

        let email = Email {
            recipient: (*self.config.recipient).clone(),
            subject,
            body,
            content_type: ContentType::Html,
            reply_to,
        };

        if !self.email.send(email).await? {
            return Err(ContactSendMessageError::Send);
        }

        info!("relayed contact message");

        Ok(())
    }
}

fn reply_to(message: &ContactMessage) -> Option<EmailAddressWithName> {
    message
        .email
        .trim()
        .parse::<EmailAddress>()
        .inspect_err(|err| warn!(email = %message.email, "not using sender as reply-to: {err}"))
        .ok()
        .map(|address| address.with_name(&message.name))
}
