//! Application configuration
//!
//! Values come from built-in defaults, then an optional `worldforge.toml`, then
//! `WORLDFORGE_*` environment variables (e.g. `WORLDFORGE_SERVER_PORT`).

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

const ENV_PREFIX: &str = "WORLDFORGE";
const CONFIG_FILE: &str = "worldforge";

#[derive(Clone, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub server_host: String,
    pub server_port: u16,

    /// HS256 signing secret for access tokens
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub access_token_expire_minutes: i64,

    /// Upper bound for a single provider HTTP call
    pub llm_request_timeout_secs: u64,

    /// Attribution sent to OpenRouter
    pub app_name: String,
    pub app_url: String,

    pub huggingface_max_retries: u32,
    pub huggingface_initial_backoff_ms: u64,
}

impl AppConfig {
    /// Load configuration from `worldforge.toml` (optional) and the environment
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true)),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: AppConfig = builder
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 3000_i64)?
            .set_default("jwt_issuer", "worldforge")?
            .set_default("access_token_expire_minutes", 30_i64)?
            .set_default("llm_request_timeout_secs", 60_i64)?
            .set_default("app_name", "WorldForge")?
            .set_default("app_url", "http://localhost:3000")?
            .set_default("huggingface_max_retries", 3_i64)?
            .set_default("huggingface_initial_backoff_ms", 5000_i64)?
            .build()
            .context("Failed to read configuration sources")?
            .try_deserialize()
            .context("Invalid configuration (is WORLDFORGE_JWT_SECRET set?)")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            bail!("WORLDFORGE_JWT_SECRET must not be empty");
        }
        if self.access_token_expire_minutes <= 0 {
            bail!("access_token_expire_minutes must be positive");
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server_host
            .parse()
            .with_context(|| format!("Invalid server_host '{}'", self.server_host))?;
        Ok(SocketAddr::new(ip, self.server_port))
    }

    pub fn llm_request_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_request_timeout_secs)
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("access_token_expire_minutes", &self.access_token_expire_minutes)
            .field("llm_request_timeout_secs", &self.llm_request_timeout_secs)
            .field("app_name", &self.app_name)
            .field("app_url", &self.app_url)
            .field("huggingface_max_retries", &self.huggingface_max_retries)
            .field(
                "huggingface_initial_backoff_ms",
                &self.huggingface_initial_backoff_ms,
            )
            .finish()
    }
}

#[cfg(test)]
impl AppConfig {
    /// Fixed configuration for in-process tests
    pub fn for_tests() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            jwt_secret: "test-secret".to_string(),
            jwt_issuer: "worldforge".to_string(),
            access_token_expire_minutes: 30,
            llm_request_timeout_secs: 5,
            app_name: "WorldForge".to_string(),
            app_url: "http://localhost:3000".to_string(),
            huggingface_max_retries: 0,
            huggingface_initial_backoff_ms: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply() {
        let config =
            AppConfig::from_builder(Config::builder().set_override("jwt_secret", "s3cret").unwrap())
                .unwrap();

        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.jwt_issuer, "worldforge");
        assert_eq!(config.access_token_expire_minutes, 30);
        assert_eq!(config.huggingface_max_retries, 3);
        assert_eq!(config.llm_request_timeout(), Duration::from_secs(60));
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_missing_secret_fails() {
        assert!(AppConfig::from_builder(Config::builder()).is_err());

        let blank = Config::builder().set_override("jwt_secret", "  ").unwrap();
        assert!(AppConfig::from_builder(blank).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", AppConfig::for_tests());
        assert!(!rendered.contains("test-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
