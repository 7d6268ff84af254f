//! Instrument service - validation in front of the store.

use crate::error::{InstrumentError, InstrumentResult};
use crate::store::InstrumentStore;
use crate::types::{Instrument, InstrumentId, ListOrder};
use std::sync::Arc;
use tracing::{info, instrument};

/// Message returned when a name is missing, not text, or blank.
pub const NAME_REQUIRED: &str = "Name is required and must be a string";

/// Check a candidate instrument name.
///
/// `None` covers both a missing field and a non-text JSON value.
pub fn validate_name(name: Option<&str>) -> InstrumentResult<String> {
    match name {
        Some(name) if !name.trim().is_empty() => Ok(name.to_string()),
        _ => Err(InstrumentError::validation(NAME_REQUIRED)),
    }
}

/// High-level service for managing instruments.
///
/// Every store call goes through here so that invalid names never reach the
/// database. The store is usually a `RetryingStore` around the Postgres
/// adapter, but any `InstrumentStore` works.
#[derive(Clone)]
pub struct InstrumentService {
    store: Arc<dyn InstrumentStore>,
}

impl InstrumentService {
    pub fn new(store: Arc<dyn InstrumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn InstrumentStore> {
        &self.store
    }

    pub async fn list(&self, order: ListOrder) -> InstrumentResult<Vec<Instrument>> {
        self.store.list(order).await
    }

    #[instrument(skip(self))]
    pub async fn create(&self, name: Option<&str>) -> InstrumentResult<Instrument> {
        let name = validate_name(name)?;
        let instrument = self.store.create(name).await?;
        info!(id = %instrument.id, "Instrument created");
        Ok(instrument)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: InstrumentId,
        name: Option<&str>,
    ) -> InstrumentResult<Instrument> {
        let name = validate_name(name)?;
        self.store.update(id, name).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: InstrumentId) -> InstrumentResult<()> {
        self.store.delete(id).await?;
        info!(%id, "Instrument deleted");
        Ok(())
    }

    pub async fn ping(&self) -> InstrumentResult<()> {
        self.store.ping().await
    }
}
