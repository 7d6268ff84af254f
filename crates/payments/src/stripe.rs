//! [`PaymentProvider`] over the Stripe Checkout API.

use crate::checkout::CheckoutRequest;
use crate::error::{PaymentError, PaymentResult};
use crate::provider::{CheckoutSession, PaymentProvider};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, instrument, warn};

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Placeholder the provider replaces with the real session id on redirect.
pub const SESSION_ID_TEMPLATE: &str = "{CHECKOUT_SESSION_ID}";

/// Product shown on the hosted checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct StripeCheckout {
    api_base: String,
    secret_key: String,
    site_url: String,
    product: Product,
    client: reqwest::Client,
}

impl std::fmt::Debug for StripeCheckout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeCheckout")
            .field("api_base", &self.api_base)
            .field("site_url", &self.site_url)
            .field("product", &self.product)
            .finish_non_exhaustive()
    }
}

impl StripeCheckout {
    /// `site_url` is the public origin the customer returns to afterwards.
    pub fn new(api_base: &str, secret_key: &str, site_url: &str, product: Product) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
            site_url: site_url.trim_end_matches('/').to_string(),
            product,
            client: reqwest::Client::new(),
        }
    }

    pub fn success_url(&self) -> String {
        format!("{}/success?session_id={}", self.site_url, SESSION_ID_TEMPLATE)
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/cancel", self.site_url)
    }

    /// Form fields for a single-item card payment.
    pub fn form_fields(&self, request: &CheckoutRequest) -> Vec<(String, String)> {
        let item = "line_items[0]";
        let mut fields = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            (format!("{item}[quantity]"), "1".to_string()),
            (format!("{item}[price_data][currency]"), request.currency.clone()),
            (format!("{item}[price_data][unit_amount]"), request.amount.to_string()),
            (
                format!("{item}[price_data][product_data][name]"),
                self.product.name.clone(),
            ),
            ("success_url".to_string(), self.success_url()),
            ("cancel_url".to_string(), self.cancel_url()),
        ];
        if let Some(description) = &self.product.description {
            fields.push((
                format!("{item}[price_data][product_data][description]"),
                description.clone(),
            ));
        }
        fields
    }
}

fn provider_message(body: &Value) -> Option<String> {
    body.pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl PaymentProvider for StripeCheckout {
    #[instrument(skip_all, fields(amount = request.amount, currency = %request.currency))]
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> PaymentResult<CheckoutSession> {
        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&self.form_fields(request))
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            let message = provider_message(&body).unwrap_or_else(|| status.to_string());
            warn!(status = status.as_u16(), %message, "Checkout session rejected");
            return Err(PaymentError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let session: CheckoutSession = response
            .json()
            .await
            .map_err(|e| PaymentError::Serialization(e.to_string()))?;
        info!(session_id = %session.id, "Checkout session created");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn checkout() -> StripeCheckout {
        StripeCheckout::new(
            DEFAULT_API_BASE,
            "sk_test_123",
            "https://bandstand.example/",
            Product {
                name: "Instrument Purchase".to_string(),
                description: Some("Musical instrument purchase".to_string()),
            },
        )
    }

    fn field<'a>(fields: &'a [(String, String)], key: &str) -> Option<&'a str> {
        fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_redirect_urls() {
        let stripe = checkout();
        assert_eq!(
            stripe.success_url(),
            "https://bandstand.example/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(stripe.cancel_url(), "https://bandstand.example/cancel");
    }

    #[test]
    fn test_form_fields() {
        let request = CheckoutRequest::new(2500, "usd").unwrap();
        let fields = checkout().form_fields(&request);

        assert_eq!(field(&fields, "mode"), Some("payment"));
        assert_eq!(field(&fields, "payment_method_types[0]"), Some("card"));
        assert_eq!(field(&fields, "line_items[0][quantity]"), Some("1"));
        assert_eq!(field(&fields, "line_items[0][price_data][unit_amount]"), Some("2500"));
        assert_eq!(field(&fields, "line_items[0][price_data][currency]"), Some("usd"));
        assert_eq!(
            field(&fields, "line_items[0][price_data][product_data][name]"),
            Some("Instrument Purchase")
        );
        assert_eq!(
            field(&fields, "line_items[0][price_data][product_data][description]"),
            Some("Musical instrument purchase")
        );
    }

    #[test]
    fn test_description_is_optional() {
        let mut stripe = checkout();
        stripe.product.description = None;
        let fields = stripe.form_fields(&CheckoutRequest::new(100, "eur").unwrap());
        assert!(field(&fields, "line_items[0][price_data][product_data][description]").is_none());
    }

    #[test]
    fn test_provider_message() {
        let body = json!({
            "error": {"type": "invalid_request_error", "message": "Invalid currency: xyz"}
        });
        assert_eq!(provider_message(&body).as_deref(), Some("Invalid currency: xyz"));
        assert_eq!(provider_message(&json!({})), None);
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_transport_error() {
        let stripe = StripeCheckout::new(
            "http://127.0.0.1:1",
            "sk_test_123",
            "http://localhost:3000",
            Product {
                name: "x".to_string(),
                description: None,
            },
        );
        let request = CheckoutRequest::new(100, "usd").unwrap();
        assert_matches!(
            stripe.create_checkout_session(&request).await,
            Err(PaymentError::Transport(_))
        );
    }
}
