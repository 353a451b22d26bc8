use anyhow::ensure;
use clap::Subcommand;
use portfolio_config::Config;
use portfolio_email_contracts::{ContentType, Email, EmailService};
use portfolio_models::email_address::EmailAddressWithName;
use portfolio_utils::portfolio_version;
use tracing::info;

use crate::email;

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    /// Send a test email through the configured smtp server
    Test {
        /// Defaults to the contact form recipient
        recipient: Option<EmailAddressWithName>,
    },
}

impl EmailCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            Self::Test { recipient } => {
                let recipient = recipient.unwrap_or_else(|| config.contact.recipient.clone());
                send_test_email(&config, recipient).await
            }
        }
    }
}

async fn send_test_email(config: &Config, recipient: EmailAddressWithName) -> anyhow::Result<()> {
    let email_service = email::connect(&config.email).await?;

    info!(%recipient, "Sending test email");
    let accepted = email_service
        .send(Email {
            recipient,
            subject: "Portfolio contact relay test".into(),
            body: format!(
                "This message was sent by portfolio {} to check that contact form \
                 messages can be delivered.",
                portfolio_version()
            ),
            content_type: ContentType::Text,
            reply_to: None,
        })
        .await?;

    ensure!(accepted, "Smtp server rejected the test email");

    Ok(())
}
