//! Server infrastructure for Bandstand
//!
//! This crate provides the HTTP server with lifecycle management, graceful
//! shutdown and health endpoints.
//!
//! # Architecture
//!
//! Servers implement the [`Server`] trait, which provides a consistent
//! interface for running and monitoring them. The [`ServerExt`] trait
//! adds `spawn()` for running one on a background task.
//!
//! Shutdown coordination uses `CancellationToken` from `tokio_util`, allowing
//! hierarchical shutdown where cancelling a parent token automatically cancels
//! all child tokens.
//!
//! # Quick Start
//!
//! ```ignore
//! use server::{HttpServer, Server, ServerConfig, ShutdownController};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let shutdown = ShutdownController::with_signals();
//!     let server = HttpServer::new(ServerConfig::default(), app_router());
//!     server.run(shutdown.token()).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`] - Bind configuration and default ports
//! - [`traits`] - `Server` and `ServerExt` traits
//! - [`http`] - HTTP server using Axum
//! - [`middleware`] - Request metrics
//! - [`health`] - Health endpoints and dependency probes
//! - [`shutdown`] - Graceful shutdown utilities

pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod middleware;
pub mod port_validator;
pub mod shutdown;
pub mod traits;

pub use config::{ports, ServerConfig};
pub use error::{Result, ServerError};
pub use health::{health_routes, spawn_health_probe, ConnectionStatus, HealthState};
pub use http::HttpServer;
pub use port_validator::validate_ports_available;
pub use shutdown::ShutdownController;
pub use traits::{Server, ServerExt};
