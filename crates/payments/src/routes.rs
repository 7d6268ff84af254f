use crate::checkout::CheckoutRequest;
use crate::error::PaymentError;
use crate::provider::PaymentProvider;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::error;

pub const CHECKOUT_FAILED: &str = "Error creating checkout session";

pub struct CheckoutState {
    pub provider: Arc<dyn PaymentProvider>,
    pub default_currency: String,
}

impl CheckoutState {
    pub fn new(provider: Arc<dyn PaymentProvider>, default_currency: &str) -> Arc<Self> {
        Arc::new(Self {
            provider,
            default_currency: default_currency.to_string(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            PaymentError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            other => {
                error!(error = %other, "Error creating checkout session");
                (StatusCode::INTERNAL_SERVER_ERROR, CHECKOUT_FAILED.to_string())
            }
        };

        let body = ErrorResponse {
            success: false,
            error: message,
        };
        (status, Json(body)).into_response()
    }
}

/// POST /api/checkout
pub async fn create_checkout(
    State(state): State<Arc<CheckoutState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, PaymentError> {
    let Json(body) = body.map_err(|e| PaymentError::validation(e.body_text()))?;
    let request = CheckoutRequest::from_body(&body, &state.default_currency)?;

    let session = state.provider.create_checkout_session(&request).await?;

    Ok(Json(CheckoutResponse {
        session_id: session.id,
        url: session.url,
    }))
}

pub fn checkout_routes(state: Arc<CheckoutState>) -> Router {
    Router::new()
        .route("/api/checkout", post(create_checkout))
        .with_state(state)
}
