//! Error types for the instrument crate.

use crate::types::InstrumentId;
use thiserror::Error;

/// Result type alias for instrument operations.
pub type InstrumentResult<T> = Result<T, InstrumentError>;

/// SQLSTATE codes raised when a pooling proxy hands a session a connection
/// whose server-side prepared statements do not match the client's cache.
///
/// - `42P05`: duplicate_prepared_statement ("prepared statement already exists")
/// - `26000`: invalid_sql_statement_name ("prepared statement does not exist")
pub const TRANSIENT_STORE_CODES: &[&str] = &["42P05", "26000"];

/// Errors that can occur in instrument operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstrumentError {
    /// Malformed client input (missing or blank name, for instance).
    #[error("{0}")]
    Validation(String),

    /// Identifier text that does not parse as a 64-bit integer.
    #[error("Invalid instrument id: {0}")]
    InvalidId(String),

    /// No row with the given id.
    #[error("Instrument not found: {0}")]
    NotFound(InstrumentId),

    /// Backing store failure, with the driver's SQLSTATE code when one exists.
    #[error("Storage error: {message}")]
    Store {
        message: String,
        code: Option<String>,
    },

    /// Failure talking to the instrument HTTP API.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl InstrumentError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a store error without a diagnostic code.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store {
            message: msg.into(),
            code: None,
        }
    }

    /// Create a store error carrying the driver's diagnostic code.
    pub fn store_with_code(msg: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Store {
            message: msg.into(),
            code: Some(code.into()),
        }
    }

    /// The store's diagnostic code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Store { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// True for the prepared-statement conflicts that a reconnect clears.
    pub fn is_transient(&self) -> bool {
        self.code()
            .map(|code| TRANSIENT_STORE_CODES.contains(&code))
            .unwrap_or(false)
    }

    /// True for errors caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidId(_))
    }
}

impl From<serde_json::Error> for InstrumentError {
    fn from(err: serde_json::Error) -> Self {
        InstrumentError::Serialization(err.to_string())
    }
}
