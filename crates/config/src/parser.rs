use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());

    let config = parse_config(&content)?;
    info!("Configuration loaded successfully");
    Ok(config)
}

/// Substitute environment variables in `content` and parse it as YAML.
pub fn parse_config(content: &str) -> Result<AppConfig> {
    let substituted = substitution::substitute_env_vars(content)?;
    debug!("Environment variable substitution completed");

    serde_yaml::from_str(&substituted).with_context(|| "Failed to parse YAML configuration")
}

/// Configuration written by `bandstand init`.
///
/// Secrets are left as placeholders so the file can be committed and filled
/// from the environment at load time.
#[instrument]
pub fn generate_default_config() -> AppConfig {
    AppConfig {
        app: AppSection::default(),
        server: ServerSection::default(),
        database: DatabaseConfig {
            url: "${DATABASE_URL}".to_string(),
            max_connections: default_max_connections(),
            acquire_timeout_seconds: default_acquire_timeout(),
            pooler: default_pooler(),
            retry_delay_ms: default_retry_delay_ms(),
            run_migrations: default_run_migrations(),
            health_check_interval_seconds: default_health_check_interval(),
        },
        auth: Some(AuthConfig {
            url: "${SUPABASE_URL}".to_string(),
            anon_key: "${SUPABASE_ANON_KEY}".to_string(),
        }),
        payments: Some(PaymentsConfig {
            secret_key: "${STRIPE_SECRET_KEY}".to_string(),
            api_base: default_payments_api_base(),
            default_currency: default_currency(),
            product_name: default_product_name(),
            product_description: None,
        }),
        logging: LoggingConfig::default(),
        metrics: Some(MetricsConfig {
            port: default_metrics_port(),
        }),
    }
}

#[instrument(skip(config))]
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &AppConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    fs::write(path, yaml).with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_sample_parses() {
        std::env::set_var(
            "BANDSTAND_SAMPLE_DATABASE_URL",
            "postgres://app:pw@localhost:6543/postgres",
        );
        std::env::set_var("BANDSTAND_SAMPLE_SUPABASE_URL", "https://project.supabase.co");
        std::env::set_var("BANDSTAND_SAMPLE_SUPABASE_ANON_KEY", "anon");
        std::env::set_var("BANDSTAND_SAMPLE_STRIPE_SECRET_KEY", "sk_test_sample");

        let sample = include_str!("../../../deploy/bandstand.yaml")
            .replace("${DATABASE_URL}", "${BANDSTAND_SAMPLE_DATABASE_URL}")
            .replace("${SUPABASE_URL}", "${BANDSTAND_SAMPLE_SUPABASE_URL}")
            .replace("${SUPABASE_ANON_KEY}", "${BANDSTAND_SAMPLE_SUPABASE_ANON_KEY}")
            .replace("${STRIPE_SECRET_KEY}", "${BANDSTAND_SAMPLE_STRIPE_SECRET_KEY}");

        let config = parse_config(&sample).unwrap();
        assert_eq!(config.database.url, "postgres://app:pw@localhost:6543/postgres");
        assert!(config.database.pooler);

        let report = validate_config(&config);
        assert!(report.is_valid(), "{:?}", report.errors);
    }

    #[test]
    fn test_generated_default_round_trips_through_file() {
        let dir = std::env::temp_dir().join(format!("bandstand-config-{}", std::process::id()));
        let path = dir.join("bandstand.yaml");

        save_config(&generate_default_config(), &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("${DATABASE_URL}"));

        let loaded: AppConfig = serde_yaml::from_str(&text).unwrap();
        assert_eq!(loaded.server.http_port, 3000);
        assert_eq!(loaded.metrics.map(|m| m.port), Some(9090));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = load_config("/nonexistent/bandstand.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
