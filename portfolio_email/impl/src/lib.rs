use anyhow::{anyhow, Context};
use lettre::{
    message::{header, MessageBuilder},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use portfolio_email_contracts::{ContentType, Email, EmailService};
use portfolio_models::email_address::EmailAddressWithName;
use portfolio_utils::Apply;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct EmailServiceImpl {
    from: EmailAddressWithName,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

/// Credentials which take precedence over the ones embedded in the smtp url.
#[derive(Debug, Clone)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: String,
}

impl EmailServiceImpl {
    pub async fn new(
        url: &str,
        from: EmailAddressWithName,
        credentials: Option<SmtpCredentials>,
    ) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(url)
            .context("Invalid smtp url")?
            .apply_map(credentials, |builder, SmtpCredentials { username, password }| {
                builder.credentials(Credentials::new(username, password))
            })
            .build();

        Ok(Self { from, transport })
    }

    fn build_message(&self, email: Email) -> anyhow::Result<Message> {
        Message::builder()
            .from(self.from.0.clone())
            .to(email.recipient.into_single_line().0)
            .apply_map(
                email.reply_to.map(|x| x.into_single_line().0),
                MessageBuilder::reply_to,
            )
            .subject(email.subject)
            .header(match email.content_type {
                ContentType::Text => header::ContentType::TEXT_PLAIN,
                ContentType::Html => header::ContentType::TEXT_HTML,
            })
            .body(email.body)
            .context("Failed to build email message")
    }
}

impl EmailService for EmailServiceImpl {
    async fn send(&self, email: Email) -> anyhow::Result<bool> {
        let recipient = email.recipient.to_string();
        let message = self.build_message(email)?;

        let response = self.transport.send(message).await?;
        debug!(%recipient, code = %response.code(), "smtp server accepted email");

        Ok(response.is_positive())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        self.transport
            .test_connection()
            .await?
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping smtp server"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn make_sut() -> EmailServiceImpl {
        EmailServiceImpl::new(
            "smtp://localhost:2525",
            "Portfolio <noreply@example.com>".parse().unwrap(),
            Some(SmtpCredentials {
                username: "user".into(),
                password: "pass".into(),
            }),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn build_html_message() {
        // Arrange
        let sut = make_sut().await;

        // Act
        let message = sut
            .build_message(Email {
                recipient: "owner@example.com".parse().unwrap(),
                subject: "Portfolio Contact: Hi".into(),
                body: "<h3>Hello</h3>".into(),
                content_type: ContentType::Html,
                reply_to: Some("jane@gmail.com".parse().unwrap()),
            })
            .unwrap();

        // Assert
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("From: Portfolio <noreply@example.com>\r\n"));
        assert!(formatted.contains("To: owner@example.com\r\n"));
        assert!(formatted.contains("Reply-To: jane@gmail.com\r\n"));
        assert!(formatted.contains("Subject: Portfolio Contact: Hi\r\n"));
        assert!(formatted.contains("Content-Type: text/html; charset=utf-8\r\n"));
        assert!(formatted.contains("<h3>Hello</h3>"));
    }

    #[tokio::test]
    async fn multi_line_reply_to_name() {
        // Arrange
        let sut = make_sut().await;
        let reply_to = EmailAddressWithName(lettre::message::Mailbox::new(
            Some("Jane\r\n\r\nInjected Body".into()),
            "jane@gmail.com".parse().unwrap(),
        ));

        // Act
        let message = sut
            .build_message(Email {
                recipient: "owner@example.com".parse().unwrap(),
                subject: "Portfolio Contact: Hi".into(),
                body: "<h3>Hello</h3>".into(),
                content_type: ContentType::Html,
                reply_to: Some(reply_to),
            })
            .unwrap();

        // Assert
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("Reply-To: Jane Injected Body <jane@gmail.com>\r\n"));
        assert!(!formatted.contains("\r\nInjected Body"));
    }

    #[tokio::test]
    async fn build_text_message_without_reply_to() {
        // Arrange
        let sut = make_sut().await;

        // Act
        let message = sut
            .build_message(Email {
                recipient: "owner@example.com".parse().unwrap(),
                subject: "Email Deliverability Test".into(),
                body: "It works".into(),
                content_type: ContentType::Text,
                reply_to: None,
            })
            .unwrap();

        // Assert
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(!formatted.contains("Reply-To:"));
        assert!(formatted.contains("Content-Type: text/plain; charset=utf-8\r\n"));
    }

    #[tokio::test]
    async fn invalid_url() {
        let result = EmailServiceImpl::new(
            "not a url",
            "noreply@example.com".parse().unwrap(),
            None,
        )
        .await;
        assert!(result.is_err());
    }
}
