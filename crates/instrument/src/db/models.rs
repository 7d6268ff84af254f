//! Database row models for instruments.
//!
//! These structs map directly to PostgreSQL table rows and handle
//! conversion to the domain types in `crate::types`.

use crate::error::InstrumentError;
use crate::types::{Instrument, InstrumentId};
use sqlx::FromRow;

/// Database row for an instrument.
#[derive(Debug, Clone, FromRow)]
pub struct InstrumentRow {
    pub id: i64,
    pub name: String,
}

impl InstrumentRow {
    /// Convert database row to domain type.
    pub fn to_domain(self) -> Instrument {
        Instrument {
            id: InstrumentId::new(self.id),
            name: self.name,
        }
    }
}

/// Wrap a driver error, keeping the server's SQLSTATE code when there is one.
pub fn store_error(context: &str, err: sqlx::Error) -> InstrumentError {
    let code = err
        .as_database_error()
        .and_then(|db| db.code())
        .map(|code| code.into_owned());

    let message = format!("{}: {}", context, err);
    match code {
        Some(code) => InstrumentError::store_with_code(message, code),
        None => InstrumentError::store(message),
    }
}
