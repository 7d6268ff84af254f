//! API request/response models.

use crate::error::{InstrumentError, InstrumentResult};
use crate::types::{InstrumentId, ListOrder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query parameters for listing instruments.
#[derive(Debug, Default, Deserialize)]
pub struct ListInstrumentsParams {
    pub order: Option<String>,
}

impl ListInstrumentsParams {
    pub fn list_order(&self) -> InstrumentResult<ListOrder> {
        match self.order.as_deref() {
            None | Some("") => Ok(ListOrder::default()),
            Some(order) => order.parse(),
        }
    }
}

/// Body-level fields of a create/update/delete request.
///
/// Bodies are taken as raw JSON so that a non-text `name` is reported as a
/// validation failure rather than a deserialization error.
#[derive(Debug, Clone, Copy)]
pub struct InstrumentBody<'a>(pub &'a Value);

impl<'a> InstrumentBody<'a> {
    /// The `name` field, when present and a string.
    pub fn name(&self) -> Option<&'a str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// The `id` field, as a decimal string or a bare integer.
    pub fn id(&self) -> InstrumentResult<InstrumentId> {
        match self.0.get("id") {
            Some(Value::String(text)) => text.parse(),
            Some(Value::Number(number)) => number
                .as_i64()
                .map(InstrumentId::new)
                .ok_or_else(|| InstrumentError::InvalidId(number.to_string())),
            Some(other) => Err(InstrumentError::InvalidId(other.to_string())),
            None => Err(InstrumentError::InvalidId("missing".to_string())),
        }
    }
}

/// Plain confirmation message.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
