//! Axum route definitions for the instrument API.

use crate::api::handlers::{self, InstrumentApiState};
use axum::routing::{get, put};
use axum::Router;
use std::sync::Arc;

/// Create all instrument routes.
///
/// # Routes
///
/// - `GET /api/instruments[?order=id|name]` - List instruments
/// - `POST /api/instruments` - Create from `{name}`
/// - `PUT /api/instruments` - Rename from `{id, name}`
/// - `DELETE /api/instruments` - Delete from `{id}`
/// - `PUT /api/instruments/:id` - Rename from `{name}`
/// - `DELETE /api/instruments/:id` - Delete, 204 on success
pub fn instrument_routes(state: Arc<InstrumentApiState>) -> Router {
    Router::new()
        .route(
            "/api/instruments",
            get(handlers::list_instruments)
                .post(handlers::create_instrument)
                .put(handlers::update_instrument)
                .delete(handlers::delete_instrument),
        )
        .route(
            "/api/instruments/:id",
            put(handlers::update_instrument_by_id).delete(handlers::delete_instrument_by_id),
        )
        .with_state(state)
}
