use std::sync::Arc;

use portfolio_extern_contracts::mail_relay::MailRelayApiService;
use portfolio_models::contact::ContactMessage;
use tracing::debug;
use url::Url;

use crate::http::HttpClient;

#[derive(Debug, Clone)]
pub struct MailRelayApiServiceImpl {
    config: MailRelayApiServiceConfig,
    client: HttpClient,
}

#[derive(Debug, Clone)]
pub struct MailRelayApiServiceConfig {
    pub endpoint: Arc<Url>,
}

impl MailRelayApiServiceImpl {
    pub fn new(config: MailRelayApiServiceConfig, client: HttpClient) -> Self {
        Self { config, client }
    }
}

impl MailRelayApiService for MailRelayApiServiceImpl {
    async fn send_message(&self, message: &ContactMessage) -> anyhow::Result<bool> {
        let response = self
            .client
            .post((*self.config.endpoint).clone())
            .json(message)
            .send()
            .await?;

        let status = response.status();
        debug!(%status, endpoint = %self.config.endpoint, "mail relay responded");

        Ok(status.is_success())
    }
}
