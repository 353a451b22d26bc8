use std::sync::Arc;

use anyhow::bail;
use clap::Args;
use portfolio_config::Config;
use portfolio_extern_impl::{
    http::HttpClient,
    mail_relay::{MailRelayApiServiceConfig, MailRelayApiServiceImpl},
};
use portfolio_form::{ContactFormConfig, ContactFormController, SubmitOutcome};
use portfolio_models::contact::ContactField;
use url::Url;

#[derive(Debug, Args)]
pub struct ContactCommand {
    /// Full name of the sender
    #[arg(long)]
    name: String,
    /// Gmail address of the sender
    #[arg(long)]
    email: String,
    /// Subject line of the message
    #[arg(long)]
    subject: String,
    /// Message text, at least 10 characters
    #[arg(long)]
    message: String,
    /// Url of the mail relay endpoint [default: form.endpoint]
    #[arg(long)]
    endpoint: Option<Url>,
}

impl ContactCommand {
    /// Submit a message through the contact form, exactly like a visitor of
    /// the site would.
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        let endpoint = self.endpoint.unwrap_or(config.form.endpoint);
        let relay = MailRelayApiServiceImpl::new(
            MailRelayApiServiceConfig {
                endpoint: Arc::new(endpoint),
            },
            HttpClient::new(config.form.request_timeout.into())?,
        );

        let mut form = ContactFormController::new(
            relay,
            ContactFormConfig {
                status_reset_delay: config.form.status_reset_delay.into(),
            },
        );
        form.update_field(ContactField::Name, self.name);
        form.update_field(ContactField::Email, self.email);
        form.update_field(ContactField::Subject, self.subject);
        form.update_field(ContactField::Message, self.message);

        let outcome = form.submit().await;
        let banner = form.banner().unwrap_or_default();

        match outcome {
            SubmitOutcome::Sent => {
                println!("{banner}");
                Ok(())
            }
            SubmitOutcome::Failed => bail!("{banner}"),
            SubmitOutcome::Invalid(errors) => {
                for (field, error) in errors.iter() {
                    eprintln!("{field}: {error}");
                }
                bail!("Invalid contact message");
            }
        }
    }
}
