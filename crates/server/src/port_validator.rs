//! Port validation utilities
//!
//! Checking a port before binding is inherently racy: another process can
//! take it in between. These checks give early feedback on startup; the
//! actual bind remains the source of truth.

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};

/// Validate that the configured HTTP port can be bound right now.
pub async fn validate_ports_available(config: &ServerConfig) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.http_port);

    match TcpListener::bind(&addr).await {
        Ok(listener) => {
            let local_addr = listener
                .local_addr()
                .map_err(|e| ServerError::bind(addr.clone(), e))?;
            drop(listener);

            info!(%local_addr, "HTTP port is available");
            Ok(())
        }
        Err(e) => {
            error!("HTTP port {} is NOT available: {}", config.http_port, e);
            Err(ServerError::port_in_use(config.http_port, e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_port_in_use_detected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = ServerConfig::new("127.0.0.1", port);
        let result = validate_ports_available(&config).await;
        assert!(matches!(result, Err(ServerError::PortInUse { .. })));

        drop(listener);
        assert!(validate_ports_available(&config).await.is_ok());
    }
}
