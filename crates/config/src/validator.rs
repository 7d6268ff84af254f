use crate::*;
use thiserror::Error;
use url::Url;

const LOG_FORMATS: [&str; 3] = ["pretty", "json", "compact"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Application name is required")]
    MissingAppName,

    #[error("{field} is not a valid URL: {message}")]
    InvalidUrl { field: String, message: String },

    #[error("{field} must use one of the schemes: {expected}")]
    InvalidScheme { field: String, expected: String },

    #[error("{field} must be a positive integer")]
    InvalidPositiveInteger { field: String },

    #[error("{field} is required")]
    MissingField { field: String },

    #[error("Invalid log format: {0}. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("Invalid currency '{0}': must be a three-letter ISO code")]
    InvalidCurrency(String),

    #[error("metrics.port {port} collides with server.http_port")]
    PortConflict { port: u16 },

    #[error("Environment variable '{var}' is missing or invalid: {message}")]
    InvalidEnvVar { var: String, message: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            defaults_applied: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }

    fn note_default<T: PartialEq + ToString>(&mut self, field: &str, value: &T, default: T) {
        if *value == default {
            self.add_default(field, &value.to_string());
        }
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_config(config: &AppConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_app(&config.app, &mut report);
    validate_server(&config.server, &mut report);
    validate_database(&config.database, &mut report);

    match &config.auth {
        Some(auth) => validate_auth(auth, &mut report),
        None => report.add_warning("auth", "Not configured; login and signup routes are disabled"),
    }

    match &config.payments {
        Some(payments) => validate_payments(payments, &mut report),
        None => report.add_warning("payments", "Not configured; checkout route is disabled"),
    }

    if !LOG_FORMATS.contains(&config.logging.format.to_lowercase().as_str()) {
        report.add_error(ValidationError::InvalidLogFormat(config.logging.format.clone()));
    }
    report.note_default("logging.format", &config.logging.format, default_log_format());

    if let Some(metrics) = &config.metrics {
        if metrics.port == 0 {
            report.add_error(ValidationError::InvalidPositiveInteger {
                field: "metrics.port".to_string(),
            });
        } else if metrics.port == config.server.http_port {
            report.add_error(ValidationError::PortConflict { port: metrics.port });
        }
    }

    report
}

/// Flags a value that still carries a `${VAR}` placeholder. Returns true when
/// the value is usable for further checks.
fn check_resolved(field: &str, value: &str, report: &mut ValidationReport) -> bool {
    let unresolved = unresolved_env_vars(value);
    if unresolved.is_empty() {
        return true;
    }
    for var in unresolved {
        report.add_error(ValidationError::InvalidEnvVar {
            var,
            message: format!("{} still contains a placeholder", field),
        });
    }
    false
}

fn check_required(field: &str, value: &str, report: &mut ValidationReport) -> bool {
    if value.trim().is_empty() {
        report.add_error(ValidationError::MissingField {
            field: field.to_string(),
        });
        return false;
    }
    check_resolved(field, value, report)
}

fn check_url(field: &str, value: &str, schemes: &[&str], report: &mut ValidationReport) {
    if !check_required(field, value, report) {
        return;
    }
    match Url::parse(value) {
        Ok(parsed) if schemes.contains(&parsed.scheme()) => {}
        Ok(_) => report.add_error(ValidationError::InvalidScheme {
            field: field.to_string(),
            expected: schemes.join(", "),
        }),
        Err(e) => report.add_error(ValidationError::InvalidUrl {
            field: field.to_string(),
            message: e.to_string(),
        }),
    }
}

fn validate_app(app: &AppSection, report: &mut ValidationReport) {
    if app.name.trim().is_empty() {
        report.add_error(ValidationError::MissingAppName);
    }
    check_url("app.base_url", &app.base_url, &["http", "https"], report);
    report.note_default("app.base_url", &app.base_url, default_base_url());

    if app.base_url.ends_with('/') {
        report.add_warning(
            "app.base_url",
            "Trailing slash will produce double slashes in redirect URLs",
        );
    }
}

fn validate_server(server: &ServerSection, report: &mut ValidationReport) {
    if server.http_port == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "server.http_port".to_string(),
        });
    } else if server.http_port < 1024 {
        report.add_warning("server.http_port", "Ports below 1024 usually need elevated privileges");
    }
    report.note_default("server.host", &server.host, default_host());
    report.note_default("server.http_port", &server.http_port, default_http_port());
}

fn validate_database(db: &DatabaseConfig, report: &mut ValidationReport) {
    check_url("database.url", &db.url, &["postgres", "postgresql"], report);

    if db.max_connections == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "database.max_connections".to_string(),
        });
    }
    if db.acquire_timeout_seconds == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "database.acquire_timeout_seconds".to_string(),
        });
    }
    if db.health_check_interval_seconds == 0 {
        report.add_error(ValidationError::InvalidPositiveInteger {
            field: "database.health_check_interval_seconds".to_string(),
        });
    }

    if db.retry_delay_ms == 0 {
        report.add_warning(
            "database.retry_delay_ms",
            "A zero delay retries a transient failure immediately, before the pooler has recovered",
        );
    }
    if !db.pooler {
        report.add_warning(
            "database.pooler",
            "Statement caching is enabled; this fails behind a transaction pooler",
        );
    }

    report.note_default("database.max_connections", &db.max_connections, default_max_connections());
    report.note_default(
        "database.acquire_timeout_seconds",
        &db.acquire_timeout_seconds,
        default_acquire_timeout(),
    );
    report.note_default("database.retry_delay_ms", &db.retry_delay_ms, default_retry_delay_ms());
}

fn validate_auth(auth: &AuthConfig, report: &mut ValidationReport) {
    check_url("auth.url", &auth.url, &["http", "https"], report);
    check_required("auth.anon_key", &auth.anon_key, report);
}

fn validate_payments(payments: &PaymentsConfig, report: &mut ValidationReport) {
    if check_required("payments.secret_key", &payments.secret_key, report)
        && !payments.secret_key.starts_with("sk_")
    {
        report.add_warning("payments.secret_key", "Expected a secret key starting with 'sk_'");
    }
    check_url("payments.api_base", &payments.api_base, &["http", "https"], report);

    let currency = &payments.default_currency;
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        report.add_error(ValidationError::InvalidCurrency(currency.clone()));
    }
    report.note_default("payments.default_currency", currency, default_currency());

    if payments.product_name.trim().is_empty() {
        report.add_error(ValidationError::MissingField {
            field: "payments.product_name".to_string(),
        });
    }
}
