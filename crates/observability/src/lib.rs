//! Observability infrastructure for Bandstand
//!
//! This crate provides:
//! - Structured logging via tracing
//! - Prometheus metrics
//! - HTTP request metric helpers
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! // Initialize logging
//! init_logging("bandstand", LogFormat::Pretty)?;
//!
//! // Initialize metrics (optional)
//! observability::metrics::init_metrics(9090)?;
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat, DEFAULT_FILTER};
pub use metrics::{init_metrics, RequestMetricsGuard, ServerMetrics};
