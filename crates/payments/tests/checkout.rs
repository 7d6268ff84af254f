//! Checkout route driven through the router with a recording provider.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use payments::{
    checkout_routes, CheckoutRequest, CheckoutSession, CheckoutState, PaymentProvider,
    PaymentResult,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Default)]
struct RecordingProvider {
    requests: Mutex<Vec<CheckoutRequest>>,
}

#[async_trait]
impl PaymentProvider for RecordingProvider {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> PaymentResult<CheckoutSession> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        Ok(CheckoutSession {
            id: format!("cs_test_{}", requests.len()),
            url: Some("https://checkout.stripe.com/c/pay/cs_test".to_string()),
        })
    }
}

async fn post(provider: Arc<RecordingProvider>, body: &str) -> (StatusCode, Value) {
    let app = checkout_routes(CheckoutState::new(provider, "usd"));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/checkout")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn checkout_uses_default_currency() {
    let provider = Arc::new(RecordingProvider::default());

    let (status, body) = post(provider.clone(), r#"{"amount": 2000}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], "cs_test_1");
    assert_eq!(body["url"], "https://checkout.stripe.com/c/pay/cs_test");
    assert_eq!(
        provider.requests.lock().unwrap().as_slice(),
        &[CheckoutRequest {
            amount: 2000,
            currency: "usd".to_string()
        }]
    );
}

#[tokio::test]
async fn explicit_currency_is_normalized() {
    let provider = Arc::new(RecordingProvider::default());

    let (status, _) = post(provider.clone(), r#"{"amount": 150, "currency": "JPY"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(provider.requests.lock().unwrap()[0].currency, "jpy");
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let provider = Arc::new(RecordingProvider::default());

    let (status, body) = post(provider.clone(), "{amount: 2000").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(provider.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn bad_currency_is_rejected() {
    let provider = Arc::new(RecordingProvider::default());

    let (status, body) = post(provider.clone(), r#"{"amount": 100, "currency": "euro"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Currency must be a three-letter code");
    assert!(provider.requests.lock().unwrap().is_empty());
}
