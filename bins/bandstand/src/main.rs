//! Bandstand CLI and Server Binary
//!
//! Entry point for the application. Provides commands for initializing and
//! validating configuration, applying migrations, and starting the server.

mod app;

use accounts::SupabaseAuth;
use anyhow::{Context, Result};
use app::{build_router, AuthSurface, CheckoutSurface, Surfaces};
use cli::{Cli, Commands, LogFormatArg};
use config::{
    generate_default_config, load_config, save_config, validate_config, AppConfig,
    DatabaseConfig, ValidationReport,
};
use instrument::{
    DatabaseSettings, InstrumentService, InstrumentStore, PostgresInstrumentStore, RetryPolicy,
    RetryingStore,
};
use observability::{init_logging, init_metrics, LogFormat};
use payments::{Product, StripeCheckout};
use server::{
    spawn_health_probe, validate_ports_available, HealthState, HttpServer, Server, ServerConfig,
    ShutdownController,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const SERVICE_NAME: &str = "bandstand";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Start {
            config,
            http,
            log_format,
        } => start_command(config, http, log_format).await,
        Commands::Validate { config } => {
            init_logging(SERVICE_NAME, LogFormat::Pretty)?;
            info!("Executing 'validate' command");
            validate_command(config)
        }
        Commands::Init { output, force } => {
            init_logging(SERVICE_NAME, LogFormat::Pretty)?;
            info!("Executing 'init' command");
            init_command(output, force)
        }
        Commands::Migrate { config } => {
            init_logging(SERVICE_NAME, LogFormat::Pretty)?;
            info!("Executing 'migrate' command");
            migrate_command(config).await
        }
    }
}

fn database_settings(db: &DatabaseConfig) -> DatabaseSettings {
    DatabaseSettings {
        url: db.url.clone(),
        max_connections: db.max_connections,
        acquire_timeout: db.acquire_timeout(),
        pooler: db.pooler,
    }
}

/// Log the report and fail if it carries errors.
fn enforce_report(report: &ValidationReport) -> Result<()> {
    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message, "Configuration warning");
    }

    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot start due to configuration errors");
    }
    Ok(())
}

fn resolve_log_format(config: &AppConfig, cli_override: Option<LogFormatArg>) -> LogFormat {
    let requested = cli_override
        .map(|f| f.as_str())
        .unwrap_or(config.logging.format.as_str());
    // An invalid configured value is reported by validation right after.
    LogFormat::parse(requested).unwrap_or_default()
}

fn auth_surface(config: &AppConfig) -> Option<AuthSurface> {
    let auth = config.auth.as_ref()?;
    Some(AuthSurface {
        provider: Arc::new(SupabaseAuth::new(&auth.url, &auth.anon_key)),
        secure_cookies: config.app.base_url.starts_with("https://"),
    })
}

fn checkout_surface(config: &AppConfig) -> Option<CheckoutSurface> {
    let payments = config.payments.as_ref()?;
    let product = Product {
        name: payments.product_name.clone(),
        description: payments.product_description.clone(),
    };
    Some(CheckoutSurface {
        provider: Arc::new(StripeCheckout::new(
            &payments.api_base,
            &payments.secret_key,
            &config.app.base_url,
            product,
        )),
        default_currency: payments.default_currency.clone(),
    })
}

async fn start_command(
    config_path: PathBuf,
    http_override: Option<u16>,
    log_format: Option<LogFormatArg>,
) -> Result<()> {
    let mut config = load_config(&config_path)?;
    init_logging(SERVICE_NAME, resolve_log_format(&config, log_format))?;
    info!(path = ?config_path, "Configuration loaded");

    if let Some(port) = http_override {
        debug!(port, "HTTP port overridden from command line");
        config.server.http_port = port;
    }

    enforce_report(&validate_config(&config))?;

    if let Some(metrics) = &config.metrics {
        init_metrics(metrics.port)?;
    }

    let server_config = ServerConfig::new(config.server.host.clone(), config.server.http_port);
    validate_ports_available(&server_config).await?;

    let target = config.database.redacted_target();
    info!(database = %target, pooler = config.database.pooler, "Connecting to database");
    let postgres = PostgresInstrumentStore::connect(database_settings(&config.database)).await?;
    if config.database.run_migrations {
        postgres.run_migrations().await?;
    }

    let store = Arc::new(RetryingStore::new(
        postgres,
        RetryPolicy::with_delay(config.database.retry_delay()),
    ));

    let shutdown = ShutdownController::with_signals();
    let health = Arc::new(HealthState::new(config.app.name.clone()));

    let probe_store = store.clone();
    let probe = spawn_health_probe(
        health.clone(),
        "postgres",
        target,
        config.database.health_check_interval(),
        shutdown.child_token(),
        move || {
            let store = probe_store.clone();
            async move { store.ping().await.map_err(|e| e.to_string()) }
        },
    );

    let router = build_router(Surfaces {
        instruments: InstrumentService::new(store.clone()),
        health,
        auth: auth_surface(&config),
        checkout: checkout_surface(&config),
    });

    info!(
        app = %config.app.name,
        http_port = config.server.http_port,
        auth = config.auth.is_some(),
        payments = config.payments.is_some(),
        "Starting server"
    );

    let server = HttpServer::new(server_config, router);
    let outcome = server.run(shutdown.token()).await;

    // The server can also stop on a serve error; make sure the probe stops too.
    shutdown.shutdown();
    if let Err(e) = probe.await {
        warn!(error = %e, "Health probe task ended abnormally");
    }
    store.inner().close().await;

    outcome?;
    info!("Shutdown complete");
    Ok(())
}

async fn migrate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let config = load_config(&config_path)?;
    enforce_report(&validate_config(&config))?;

    info!(database = %config.database.redacted_target(), "Applying migrations");
    let store = PostgresInstrumentStore::connect(database_settings(&config.database)).await?;
    let result = store.run_migrations().await;
    store.close().await;
    result?;

    println!("[ok] Migrations applied");
    Ok(())
}

fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    info!(path = ?config_path.as_ref(), "Validating configuration");

    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "Failed to load configuration");
            anyhow::bail!(e);
        }
    };

    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("App: {} ({})", config.app.name, config.app.base_url);
    println!("HTTP: {}:{}", config.server.host, config.server.http_port);
    println!("Database: {}", config.database.redacted_target());
    println!("Auth: {}", enabled(config.auth.is_some()));
    println!("Payments: {}", enabled(config.payments.is_some()));

    Ok(())
}

fn enabled(on: bool) -> &'static str {
    if on {
        "enabled"
    } else {
        "disabled"
    }
}

fn init_command<P: AsRef<Path>>(output_path: P, force: bool) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    if output_path.exists() && !force {
        anyhow::bail!(
            "{:?} already exists; pass --force to overwrite",
            output_path
        );
    }

    save_config(&generate_default_config(), output_path)
        .with_context(|| format!("Failed to initialize {:?}", output_path))?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("Next steps:");
    println!("  1. Set DATABASE_URL, SUPABASE_URL, SUPABASE_ANON_KEY and STRIPE_SECRET_KEY");
    println!(
        "  2. Run 'bandstand validate --config {:?}' to check configuration",
        output_path
    );
    println!(
        "  3. Run 'bandstand start --config {:?}' to start the server",
        output_path
    );

    Ok(())
}
