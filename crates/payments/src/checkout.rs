use crate::error::{PaymentError, PaymentResult};
use serde_json::Value;

pub const INVALID_AMOUNT: &str = "Amount must be a positive integer";
pub const INVALID_CURRENCY: &str = "Currency must be a three-letter code";

/// A validated one-item checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Minor units (cents for usd).
    pub amount: u64,
    /// Lowercase ISO 4217 code.
    pub currency: String,
}

impl CheckoutRequest {
    pub fn new(amount: u64, currency: &str) -> PaymentResult<Self> {
        if amount == 0 {
            return Err(PaymentError::validation(INVALID_AMOUNT));
        }
        Ok(Self {
            amount,
            currency: normalize_currency(currency)?,
        })
    }

    /// Build from a raw JSON body, `currency` falling back to `default_currency`.
    pub fn from_body(body: &Value, default_currency: &str) -> PaymentResult<Self> {
        let amount = body
            .get("amount")
            .and_then(Value::as_u64)
            .ok_or_else(|| PaymentError::validation(INVALID_AMOUNT))?;

        let currency = match body.get("currency") {
            None | Some(Value::Null) => default_currency,
            Some(Value::String(code)) => code.as_str(),
            Some(_) => return Err(PaymentError::validation(INVALID_CURRENCY)),
        };

        Self::new(amount, currency)
    }
}

fn normalize_currency(code: &str) -> PaymentResult<String> {
    let code = code.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_lowercase())
    } else {
        Err(PaymentError::validation(INVALID_CURRENCY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_defaults_currency() {
        let req = CheckoutRequest::from_body(&json!({"amount": 2500}), "usd").unwrap();
        assert_eq!(req, CheckoutRequest { amount: 2500, currency: "usd".to_string() });
    }

    #[test]
    fn test_currency_is_lowercased() {
        let body = json!({"amount": 100, "currency": "EUR"});
        let req = CheckoutRequest::from_body(&body, "usd").unwrap();
        assert_eq!(req.currency, "eur");
    }

    #[test]
    fn test_rejects_bad_amounts() {
        for body in [
            json!({}),
            json!({"amount": 0}),
            json!({"amount": -5}),
            json!({"amount": 12.5}),
            json!({"amount": "100"}),
        ] {
            assert_matches!(
                CheckoutRequest::from_body(&body, "usd"),
                Err(PaymentError::Validation(msg)) if msg == INVALID_AMOUNT
            );
        }
    }

    #[test]
    fn test_rejects_bad_currency() {
        for currency in [json!("dollars"), json!("u$d"), json!(840), json!("")] {
            assert_matches!(
                CheckoutRequest::from_body(&json!({"amount": 100, "currency": currency}), "usd"),
                Err(PaymentError::Validation(msg)) if msg == INVALID_CURRENCY
            );
        }
    }
}
