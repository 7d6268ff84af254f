//! PostgreSQL implementation of the `InstrumentStore` trait.
//!
//! The store owns a swappable connection pool so the retry wrapper can cycle
//! it. The handle always holds an open pool: a disconnect installs a fresh,
//! lazily connecting pool before closing the stale one. When the database
//! sits behind a transaction-mode pooler, server-side statement caching is
//! disabled on every connection.

use crate::db::models::{store_error, InstrumentRow};
use crate::error::{InstrumentError, InstrumentResult};
use crate::store::{InstrumentStore, Reconnect};
use crate::types::{Instrument, InstrumentId, ListOrder};
use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Connection settings for the instrument database.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// Connections go through a pooling proxy; disable the statement cache.
    pub pooler: bool,
}

impl DatabaseSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
            pooler: true,
        }
    }

    fn connect_options(&self) -> InstrumentResult<PgConnectOptions> {
        let options = PgConnectOptions::from_str(&self.url)
            .map_err(|e| store_error("Invalid database url", e))?;

        Ok(if self.pooler {
            options.statement_cache_capacity(0)
        } else {
            options
        })
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
    }
}

/// PostgreSQL-backed instrument store over the `instruments` table.
#[derive(Debug)]
pub struct PostgresInstrumentStore {
    pool: RwLock<PgPool>,
    settings: DatabaseSettings,
    options: PgConnectOptions,
}

impl PostgresInstrumentStore {
    /// Connect and build the pool.
    pub async fn connect(settings: DatabaseSettings) -> InstrumentResult<Self> {
        let options = settings.connect_options()?;
        let pool = settings
            .pool_options()
            .connect_with(options.clone())
            .await
            .map_err(|e| store_error("Failed to connect to database", e))?;

        info!(
            host = options.get_host(),
            port = options.get_port(),
            max_connections = settings.max_connections,
            statement_cache = !settings.pooler,
            "Connected to PostgreSQL"
        );

        Ok(Self::from_pool(pool, settings, options))
    }

    fn from_pool(pool: PgPool, settings: DatabaseSettings, options: PgConnectOptions) -> Self {
        Self {
            pool: RwLock::new(pool),
            settings,
            options,
        }
    }

    fn lazy_pool(&self) -> PgPool {
        self.settings
            .pool_options()
            .connect_lazy_with(self.options.clone())
    }

    /// Get a handle to the current connection pool.
    pub fn pool(&self) -> PgPool {
        self.pool.read().clone()
    }

    pub fn settings(&self) -> &DatabaseSettings {
        &self.settings
    }

    /// Run the migration SQL to create tables.
    pub async fn run_migrations(&self) -> InstrumentResult<()> {
        let migration_sql = include_str!("../../../../migrations/001_create_instruments.sql");
        sqlx::raw_sql(migration_sql)
            .execute(&self.pool())
            .await
            .map_err(|e| store_error("Migration failed", e))?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Close every connection. Called once on shutdown.
    pub async fn close(&self) {
        self.pool().close().await;
        info!("Database pool closed");
    }
}

#[async_trait]
impl InstrumentStore for PostgresInstrumentStore {
    #[instrument(skip(self))]
    async fn list(&self, order: ListOrder) -> InstrumentResult<Vec<Instrument>> {
        let sql = match order {
            ListOrder::Id => "SELECT id, name FROM instruments ORDER BY id ASC",
            ListOrder::Name => "SELECT id, name FROM instruments ORDER BY name ASC, id ASC",
        };

        let rows = sqlx::query_as::<_, InstrumentRow>(sql)
            .fetch_all(&self.pool())
            .await
            .map_err(|e| store_error("Failed to list instruments", e))?;

        debug!(count = rows.len(), "Listed instruments");
        Ok(rows.into_iter().map(InstrumentRow::to_domain).collect())
    }

    #[instrument(skip(self))]
    async fn create(&self, name: String) -> InstrumentResult<Instrument> {
        let row = sqlx::query_as::<_, InstrumentRow>(
            "INSERT INTO instruments (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&name)
        .fetch_one(&self.pool())
        .await
        .map_err(|e| store_error("Failed to create instrument", e))?;

        debug!(id = row.id, "Created instrument");
        Ok(row.to_domain())
    }

    #[instrument(skip(self))]
    async fn update(&self, id: InstrumentId, name: String) -> InstrumentResult<Instrument> {
        let row = sqlx::query_as::<_, InstrumentRow>(
            "UPDATE instruments SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(id.value())
        .bind(&name)
        .fetch_optional(&self.pool())
        .await
        .map_err(|e| store_error("Failed to update instrument", e))?;

        row.map(InstrumentRow::to_domain)
            .ok_or(InstrumentError::NotFound(id))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: InstrumentId) -> InstrumentResult<()> {
        let result = sqlx::query("DELETE FROM instruments WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool())
            .await
            .map_err(|e| store_error("Failed to delete instrument", e))?;

        if result.rows_affected() == 0 {
            return Err(InstrumentError::NotFound(id));
        }
        Ok(())
    }

    async fn ping(&self) -> InstrumentResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool())
            .await
            .map_err(|e| store_error("Database ping failed", e))?;
        Ok(())
    }
}

#[async_trait]
impl Reconnect for PostgresInstrumentStore {
    async fn disconnect(&self) {
        warn!("Cycling database pool");
        let fresh = self.lazy_pool();
        let stale = std::mem::replace(&mut *self.pool.write(), fresh);
        stale.close().await;
    }

    /// Open a connection through the current pool. A failure leaves the pool
    /// in place so later calls connect on demand once the database is back.
    async fn connect(&self) -> InstrumentResult<()> {
        self.pool()
            .acquire()
            .await
            .map_err(|e| store_error("Failed to reconnect to database", e))?;
        info!("Database pool re-established");
        Ok(())
    }
}
