use std::sync::Arc;

use portfolio_api_rest::RestServer;
use portfolio_config::Config;
use portfolio_core_contact_impl::{ContactServiceConfig, ContactServiceImpl};
use portfolio_core_health_impl::{HealthServiceConfig, HealthServiceImpl};
use portfolio_email_contracts::EmailService;
use portfolio_templates_impl::TemplateServiceImpl;
use tracing::{info, warn};

use crate::email;

pub async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Connecting to smtp server");
    let email = email::connect(&config.email).await?;
    if let Err(err) = email.ping().await {
        warn!("Smtp server is not reachable, contact messages will fail: {err:#}");
    }

    let template = TemplateServiceImpl::new()?;

    let server = RestServer {
        health: HealthServiceImpl::new(
            email.clone(),
            HealthServiceConfig {
                cache_ttl: config.health.cache_ttl.into(),
            },
        ),
        contact: ContactServiceImpl {
            email,
            template,
            config: ContactServiceConfig {
                recipient: Arc::new(config.contact.recipient),
            },
        },
    };

    info!(
        "Starting http server on {}:{}",
        config.http.host, config.http.port
    );
    server.serve(config.http.host, config.http.port).await
}
