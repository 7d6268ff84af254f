//! Application configuration.
//!
//! The YAML file is read, `${VAR}` / `$VAR` placeholders are filled from the
//! environment, and the result is deserialized into [`AppConfig`]. Sections
//! and fields that are absent fall back to the functions in [`defaults`].
//! [`validate_config`] produces a report instead of failing on the first
//! problem so `bandstand validate` can show everything at once.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub server: ServerSection,
    pub database: DatabaseConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payments: Option<PaymentsConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppSection {
    #[serde(default = "default_app_name")]
    pub name: String,
    /// Public origin of the site. Payment and e-mail redirects are built from it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
    /// Connections go through a transaction pooler; disables the statement cache.
    #[serde(default = "default_pooler")]
    pub pooler: bool,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
    #[serde(default = "default_health_check_interval")]
    pub health_check_interval_seconds: u64,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_seconds)
    }

    /// `host:port/database` portion of the URL, for logs.
    pub fn redacted_target(&self) -> String {
        match url::Url::parse(&self.url) {
            Ok(parsed) => format!(
                "{}:{}{}",
                parsed.host_str().unwrap_or("unknown"),
                parsed.port().unwrap_or(5432),
                parsed.path()
            ),
            Err(_) => "unparseable url".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentsConfig {
    pub secret_key: String,
    #[serde(default = "default_payments_api_base")]
    pub api_base: String,
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default = "default_product_name")]
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}
