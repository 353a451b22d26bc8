use std::{sync::Arc, time::Duration};

use portfolio_core_health_contracts::{HealthService, HealthStatus};
use portfolio_email_contracts::EmailService;
use tokio::{sync::RwLock, time::Instant};
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct HealthServiceImpl<Email> {
    email: Email,
    config: HealthServiceConfig,
    state: Arc<State>,
}

#[derive(Debug, Clone)]
pub struct HealthServiceConfig {
    pub cache_ttl: Duration,
}

#[derive(Debug, Default)]
struct State {
    cache: RwLock<Option<CachedStatus>>,
}

#[derive(Debug)]
struct CachedStatus {
    status: HealthStatus,
    expires_at: Instant,
}

impl CachedStatus {
    fn fresh(cache: &Option<Self>, now: Instant) -> Option<HealthStatus> {
        cache
            .as_ref()
            .filter(|cached| now < cached.expires_at)
            .map(|cached| cached.status)
    }
}

impl<Email> HealthServiceImpl<Email> {
    pub fn new(email: Email, config: HealthServiceConfig) -> Self {
        Self {
            email,
            config,
            state: Default::default(),
        }
    }
}

impl<Email: EmailService> HealthServiceImpl<Email> {
    async fn check(&self) -> HealthStatus {
        let email = match self.email.ping().await {
            Ok(()) => true,
            Err(err) => {
                error!("Failed to ping smtp server: {err:#}");
                false
            }
        };

        HealthStatus { email }
    }
}

impl<Email> HealthService for HealthServiceImpl<Email>
where
    Email: EmailService,
{
    async fn get_status(&self) -> HealthStatus {
        let now = Instant::now();
        if let Some(status) = CachedStatus::fresh(&*self.state.cache.read().await, now) {
            return status;
        }

        // Concurrent callers wait for the first one to refresh the entry.
        let mut cache = self.state.cache.write().await;
        if let Some(status) = CachedStatus::fresh(&cache, now) {
            return status;
        }

        let status = self.check().await;
        match cache.as_ref().map(|cached| cached.status) {
            Some(previous) if previous.email && !status.email => warn!("smtp server went down"),
            Some(previous) if !previous.email && status.email => info!("smtp server recovered"),
            _ => {}
        }

        *cache = Some(CachedStatus {
            status,
            expires_at: now + self.config.cache_ttl,
        });

        status
    }
}
