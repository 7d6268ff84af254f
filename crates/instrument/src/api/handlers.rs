//! HTTP request handlers for the instrument API.

use crate::api::models::*;
use crate::error::InstrumentError;
use crate::service::InstrumentService;
use crate::types::{Instrument, InstrumentId};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};

/// Message returned when a request body is not valid JSON.
pub const INVALID_REQUEST_DATA: &str = "Invalid request data";

/// Shared state for instrument API handlers.
pub struct InstrumentApiState {
    pub service: InstrumentService,
}

impl InstrumentApiState {
    pub fn new(service: InstrumentService) -> Arc<Self> {
        Arc::new(Self { service })
    }
}

/// Store operation a request performed, used for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn failure_message(&self) -> &'static str {
        match self {
            Operation::List => "Failed to fetch instruments",
            Operation::Create => "Failed to create instrument",
            Operation::Update => "Failed to update instrument",
            Operation::Delete => "Failed to delete instrument",
        }
    }
}

/// An `InstrumentError` tagged with the operation that produced it.
#[derive(Debug)]
pub struct ApiError {
    pub operation: Operation,
    pub source: InstrumentError,
}

impl ApiError {
    fn new(operation: Operation, source: InstrumentError) -> Self {
        Self { operation, source }
    }

    fn bad_body(operation: Operation, rejection: JsonRejection) -> Self {
        warn!(?operation, "Rejected request body: {}", rejection.body_text());
        Self::new(operation, InstrumentError::validation(INVALID_REQUEST_DATA))
    }
}

/// Validation errors are shown to the caller verbatim; store failures are
/// logged with their diagnostic code and reported generically.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.source {
            InstrumentError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            InstrumentError::InvalidId(_) => (StatusCode::BAD_REQUEST, self.source.to_string()),
            InstrumentError::NotFound(_) => (StatusCode::NOT_FOUND, self.source.to_string()),
            other => {
                error!(
                    operation = ?self.operation,
                    code = other.code().unwrap_or("none"),
                    error = %other,
                    "Instrument request failed"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    self.operation.failure_message().to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn parse_path_id(operation: Operation, raw: &str) -> ApiResult<InstrumentId> {
    raw.parse().map_err(|e| ApiError::new(operation, e))
}

/// GET /api/instruments
pub async fn list_instruments(
    State(state): State<Arc<InstrumentApiState>>,
    Query(params): Query<ListInstrumentsParams>,
) -> ApiResult<Json<Vec<Instrument>>> {
    let order = params
        .list_order()
        .map_err(|e| ApiError::new(Operation::List, e))?;

    state
        .service
        .list(order)
        .await
        .map(Json)
        .map_err(|e| ApiError::new(Operation::List, e))
}

/// POST /api/instruments
pub async fn create_instrument(
    State(state): State<Arc<InstrumentApiState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Instrument>> {
    let op = Operation::Create;
    let Json(body) = body.map_err(|e| ApiError::bad_body(op, e))?;

    state
        .service
        .create(InstrumentBody(&body).name())
        .await
        .map(Json)
        .map_err(|e| ApiError::new(op, e))
}

/// PUT /api/instruments (id in body)
pub async fn update_instrument(
    State(state): State<Arc<InstrumentApiState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Instrument>> {
    let op = Operation::Update;
    let Json(body) = body.map_err(|e| ApiError::bad_body(op, e))?;
    let body = InstrumentBody(&body);
    let id = body.id().map_err(|e| ApiError::new(op, e))?;

    state
        .service
        .update(id, body.name())
        .await
        .map(Json)
        .map_err(|e| ApiError::new(op, e))
}

/// PUT /api/instruments/:id
pub async fn update_instrument_by_id(
    State(state): State<Arc<InstrumentApiState>>,
    Path(raw_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Instrument>> {
    let op = Operation::Update;
    let id = parse_path_id(op, &raw_id)?;
    let Json(body) = body.map_err(|e| ApiError::bad_body(op, e))?;

    state
        .service
        .update(id, InstrumentBody(&body).name())
        .await
        .map(Json)
        .map_err(|e| ApiError::new(op, e))
}

/// DELETE /api/instruments (id in body)
pub async fn delete_instrument(
    State(state): State<Arc<InstrumentApiState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let op = Operation::Delete;
    let Json(body) = body.map_err(|e| ApiError::bad_body(op, e))?;
    let id = InstrumentBody(&body).id().map_err(|e| ApiError::new(op, e))?;

    state
        .service
        .delete(id)
        .await
        .map_err(|e| ApiError::new(op, e))?;

    Ok(Json(MessageResponse {
        message: "Instrument deleted".to_string(),
    }))
}

/// DELETE /api/instruments/:id
pub async fn delete_instrument_by_id(
    State(state): State<Arc<InstrumentApiState>>,
    Path(raw_id): Path<String>,
) -> ApiResult<StatusCode> {
    let op = Operation::Delete;
    let id = parse_path_id(op, &raw_id)?;

    state
        .service
        .delete(id)
        .await
        .map_err(|e| ApiError::new(op, e))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_maps_to_400_with_message() {
        let (status, body) = render(ApiError::new(
            Operation::Create,
            InstrumentError::validation("Name is required and must be a string"),
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert_eq!(body.error, "Name is required and must be a string");
    }

    #[tokio::test]
    async fn test_store_error_is_generic_500() {
        let (status, body) = render(ApiError::new(
            Operation::Update,
            InstrumentError::store_with_code("password authentication failed for user", "28P01"),
        ))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Failed to update instrument");
    }

    #[tokio::test]
    async fn test_not_found_maps_to_404() {
        let (status, _) = render(ApiError::new(
            Operation::Delete,
            InstrumentError::NotFound(InstrumentId::new(3)),
        ))
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
