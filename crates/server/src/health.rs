//! Health check endpoints and background dependency probes

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Connection status to a dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub service: String,
    pub address: String,
    pub connected: bool,
    pub latency_ms: Option<u64>,
    pub error: Option<String>,
}

impl ConnectionStatus {
    /// Build a status from the outcome of a probe.
    pub fn from_probe(
        service: impl Into<String>,
        address: impl Into<String>,
        latency: Duration,
        outcome: std::result::Result<(), String>,
    ) -> Self {
        let (connected, error) = match outcome {
            Ok(()) => (true, None),
            Err(e) => (false, Some(e)),
        };

        Self {
            service: service.into(),
            address: address.into(),
            connected,
            latency_ms: Some(latency.as_millis() as u64),
            error,
        }
    }
}

/// Shared state for health checks
///
/// Typically wrapped in `Arc<HealthState>` when used with Axum.
#[derive(Clone)]
pub struct HealthState {
    pub service_name: String,
    pub start_time: Instant,
    pub connections: Arc<tokio::sync::RwLock<Vec<ConnectionStatus>>>,
}

impl HealthState {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            start_time: Instant::now(),
            connections: Arc::new(tokio::sync::RwLock::new(Vec::new())),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub async fn update_connection(&self, status: ConnectionStatus) {
        let mut connections = self.connections.write().await;
        connections.retain(|c| c.service != status.service);
        connections.push(status);
    }

    pub async fn get_connections(&self) -> Vec<ConnectionStatus> {
        self.connections.read().await.clone()
    }

    pub async fn is_healthy(&self) -> bool {
        self.connections.read().await.iter().all(|c| c.connected)
    }
}

/// Simple liveness handler without state
pub async fn simple_health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Detailed health check with dependencies; 503 while any is down.
pub async fn detailed_health_handler(
    State(state): State<Arc<HealthState>>,
) -> (StatusCode, Json<Value>) {
    let connections = state.get_connections().await;

    let all_healthy = connections.iter().all(|c| c.connected);
    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let health = json!({
        "status": if all_healthy { "healthy" } else { "degraded" },
        "service": state.service_name,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
        "uptime_seconds": state.uptime_seconds(),
        "connections": connections,
        "healthy": all_healthy,
    });

    (status_code, Json(health))
}

/// Create health check router
///
/// - `GET /health` - liveness
/// - `GET /health/detailed` - dependency status
pub fn health_routes(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/health", get(simple_health_handler))
        .route("/health/detailed", get(detailed_health_handler))
        .with_state(state)
}

/// Run `probe` now and then every `interval`, recording each outcome under
/// `service` until `shutdown` is cancelled.
pub fn spawn_health_probe<F, Fut>(
    state: Arc<HealthState>,
    service: impl Into<String>,
    address: impl Into<String>,
    interval: Duration,
    shutdown: CancellationToken,
    probe: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<(), String>> + Send,
{
    let service = service.into();
    let address = address.into();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!(%service, "Health probe stopped");
                    return;
                }
                _ = ticker.tick() => {}
            }

            let started = Instant::now();
            let outcome = probe().await;
            if let Err(ref e) = outcome {
                warn!(%service, error = %e, "Health probe failed");
            }
            let status =
                ConnectionStatus::from_probe(&service, &address, started.elapsed(), outcome);
            state.update_connection(status).await;
        }
    })
}
