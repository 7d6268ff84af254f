//! Server configuration
//!
//! Bind settings for the single HTTP listener.

use crate::error::{Result, ServerError};
use std::net::SocketAddr;

/// Default port assignments.
pub mod ports {
    /// HTTP port for the web application
    pub const HTTP: u16 = 3000;
    /// Prometheus exporter port, when metrics are enabled
    pub const METRICS: u16 = 9090;
}

/// HTTP bind configuration.
///
/// # Example
///
/// ```
/// use server::config::ServerConfig;
///
/// let config = ServerConfig::new("127.0.0.1", 3000);
/// assert_eq!(config.http_addr().unwrap().port(), 3000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// HTTP port; 0 asks the OS for an ephemeral port
    pub http_port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, http_port: u16) -> Self {
        Self {
            host: host.into(),
            http_port,
        }
    }

    /// Loopback config on an ephemeral port, for tests.
    pub fn ephemeral() -> Self {
        Self::new("127.0.0.1", 0)
    }

    /// Get HTTP socket address
    pub fn http_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.http_port)
            .parse()
            .map_err(|_| ServerError::InvalidAddress(format!("{}:{}", self.host, self.http_port)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("0.0.0.0", ports::HTTP)
    }
}
