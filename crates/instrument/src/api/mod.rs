//! HTTP API for instrument management.
//!
//! ## Modules
//!
//! - `handlers` - Axum handlers and the error-to-response mapping
//! - `routes` - Router for `/api/instruments`
//! - `models` - Request/response types

pub mod handlers;
pub mod models;
pub mod routes;

pub use handlers::{ApiError, InstrumentApiState};
pub use models::ErrorResponse;
pub use routes::instrument_routes;
