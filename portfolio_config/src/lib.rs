use std::{collections::HashMap, net::IpAddr, path::Path};

use anyhow::Context;
use config::{Environment, File, FileFormat};
use portfolio_models::email_address::EmailAddressWithName;
use serde::Deserialize;
use url::Url;

pub use duration::Duration;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

/// Prefix of environment variables overriding config values, e.g.
/// `PORTFOLIO__EMAIL__SMTP_URL`.
pub const ENV_PREFIX: &str = "PORTFOLIO";

/// Legacy environment variables holding the smtp credentials.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("EMAIL_USER", "email.username"),
    ("EMAIL_PASS", "email.password"),
];

/// Load the config files in order, then apply overrides from the process
/// environment.
pub fn load(paths: &[impl AsRef<Path>]) -> anyhow::Result<Config> {
    load_with_env(paths, std::env::vars().collect())
}

pub fn load_with_env(
    paths: &[impl AsRef<Path>],
    env: HashMap<String, String>,
) -> anyhow::Result<Config> {
    let builder = paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(Some(env.clone())),
        );

    LEGACY_ENV
        .iter()
        .filter_map(|&(var, key)| env.get(var).map(|value| (key, value)))
        .try_fold(builder, |builder, (key, value)| {
            builder.set_override(key, value.as_str())
        })?
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub email: EmailConfig,
    pub contact: ContactConfig,
    pub health: HealthConfig,
    pub form: FormConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct EmailConfig {
    pub smtp_url: String,
    pub from: EmailAddressWithName,
    pub username: Option<String>,
    pub password: Option<Secret>,
}

impl EmailConfig {
    /// Explicit smtp credentials, if both username and password are set.
    pub fn credentials(&self) -> Option<(String, String)> {
        self.username
            .clone()
            .zip(self.password.as_ref().map(|password| password.0.clone()))
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    pub recipient: EmailAddressWithName,
}

#[derive(Debug, Deserialize)]
pub struct HealthConfig {
    pub cache_ttl: Duration,
}

#[derive(Debug, Deserialize)]
pub struct FormConfig {
    pub endpoint: Url,
    pub status_reset_delay: Duration,
    pub request_timeout: Duration,
}

#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Secret(pub String);

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[redacted]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_paths() -> [&'static Path; 1] {
        [Path::new(DEFAULT_CONFIG_PATH)]
    }

    #[test]
    fn load_default_config() {
        let config = load_with_env(&default_paths(), HashMap::new()).unwrap();

        assert_eq!(config.http.port, 8000);
        assert_eq!(*config.form.status_reset_delay, std::time::Duration::from_secs(3));
        assert_eq!(config.form.endpoint.path(), "/api/send-email");
        assert_eq!(config.email.credentials(), None);
    }

    #[test]
    fn env_overrides() {
        let env = HashMap::from([
            ("PORTFOLIO__HTTP__PORT".into(), "9000".into()),
            (
                "PORTFOLIO__EMAIL__SMTP_URL".into(),
                "smtps://smtp.gmail.com".into(),
            ),
            ("UNRELATED".into(), "value".into()),
        ]);

        let config = load_with_env(&default_paths(), env).unwrap();

        assert_eq!(config.http.port, 9000);
        assert_eq!(config.email.smtp_url, "smtps://smtp.gmail.com");
    }

    #[test]
    fn legacy_credentials() {
        let env = HashMap::from([
            ("EMAIL_USER".into(), "owner@gmail.com".into()),
            ("EMAIL_PASS".into(), "app-password".into()),
        ]);

        let config = load_with_env(&default_paths(), env).unwrap();

        assert_eq!(
            config.email.credentials(),
            Some(("owner@gmail.com".into(), "app-password".into()))
        );
        assert!(!format!("{config:?}").contains("app-password"));
    }

    #[test]
    fn missing_file() {
        let result = load_with_env(&[Path::new("/does/not/exist.toml")], HashMap::new());
        assert!(result.is_err());
    }
}
