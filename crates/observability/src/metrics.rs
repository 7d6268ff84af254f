//! Prometheus metrics infrastructure
//!
//! This module installs the Prometheus exporter and provides the HTTP
//! request metric set used by the server middleware.

use metrics::{counter, gauge, histogram, Gauge, Histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Initialize the Prometheus metrics exporter
///
/// This starts an HTTP listener on the specified port that exposes metrics
/// at the `/metrics` endpoint.
///
/// # Example
///
/// ```ignore
/// observability::metrics::init_metrics(9090)?;
/// // Metrics available at http://localhost:9090/metrics
/// ```
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// HTTP request metrics for one server.
///
/// # Metrics
///
/// * `server_requests_total{server, method, status}` - Requests processed
/// * `server_request_duration_seconds{server}` - Request duration histogram
/// * `server_requests_in_flight{server}` - Requests currently being handled
#[derive(Clone)]
pub struct ServerMetrics {
    request_duration: Histogram,
    in_flight: Gauge,
    server_name: String,
}

impl ServerMetrics {
    /// Create metrics for a specific server (e.g. "http").
    pub fn new(server_name: &str) -> Self {
        let name = server_name.to_string();

        Self {
            request_duration: histogram!(
                "server_request_duration_seconds",
                "server" => name.clone()
            ),
            in_flight: gauge!("server_requests_in_flight", "server" => name.clone()),
            server_name: name,
        }
    }

    /// Record a completed request.
    pub fn record_request(&self, method: &str, status_code: u16, duration: Duration) {
        counter!(
            "server_requests_total",
            "server" => self.server_name.clone(),
            "method" => method.to_string(),
            "status" => status_code.to_string()
        )
        .increment(1);
        self.request_duration.record(duration.as_secs_f64());
    }

    /// Begin tracking a request; the returned guard records it when dropped.
    pub fn start_request(&self, method: impl Into<String>) -> RequestMetricsGuard<'_> {
        RequestMetricsGuard::new(self, method)
    }

    /// Get the server name
    pub fn server_name(&self) -> &str {
        &self.server_name
    }
}

/// Records a request's duration and status when dropped, including when the
/// handler future is cancelled mid-flight.
pub struct RequestMetricsGuard<'a> {
    metrics: &'a ServerMetrics,
    method: String,
    start: Instant,
    status_code: u16,
}

impl<'a> RequestMetricsGuard<'a> {
    fn new(metrics: &'a ServerMetrics, method: impl Into<String>) -> Self {
        metrics.in_flight.increment(1.0);
        Self {
            metrics,
            method: method.into(),
            start: Instant::now(),
            // Overwritten once a response exists; a dropped future counts as 499.
            status_code: 499,
        }
    }

    /// Set the status code (call before drop)
    pub fn set_status(&mut self, code: u16) {
        self.status_code = code;
    }
}

impl Drop for RequestMetricsGuard<'_> {
    fn drop(&mut self) {
        self.metrics.in_flight.decrement(1.0);
        self.metrics
            .record_request(&self.method, self.status_code, self.start.elapsed());
    }
}
