//! Instrument storage traits and implementations.
//!
//! This module defines the `InstrumentStore` trait that abstracts away storage details,
//! plus the `Reconnect` trait used by the retry wrapper to cycle a store's connections.
//! The Postgres adapter lives in `crate::db`.

use crate::error::{InstrumentError, InstrumentResult};
use crate::types::{Instrument, InstrumentId, ListOrder};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Trait for instrument storage.
///
/// Implementations assign ids on `create`; ids are never reused or changed.
/// `update` and `delete` on a missing id fail with `InstrumentError::NotFound`.
///
/// # Example
///
/// ```ignore
/// use instrument::{InstrumentStore, ListOrder};
///
/// async fn example(store: &dyn InstrumentStore) -> instrument::InstrumentResult<()> {
///     let piano = store.create("Grand Piano".to_string()).await?;
///     let all = store.list(ListOrder::Name).await?;
///     assert!(all.contains(&piano));
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait InstrumentStore: Send + Sync {
    /// List every instrument in the requested order.
    async fn list(&self, order: ListOrder) -> InstrumentResult<Vec<Instrument>>;

    /// Insert a new instrument; the store assigns the id.
    async fn create(&self, name: String) -> InstrumentResult<Instrument>;

    /// Replace the name of an existing instrument.
    async fn update(&self, id: InstrumentId, name: String) -> InstrumentResult<Instrument>;

    /// Delete an instrument by id.
    async fn delete(&self, id: InstrumentId) -> InstrumentResult<()>;

    /// Cheap liveness probe.
    async fn ping(&self) -> InstrumentResult<()> {
        Ok(())
    }
}

/// Connection cycling used by `RetryingStore` after a transient failure.
#[async_trait]
pub trait Reconnect: Send + Sync {
    /// Release every pooled connection.
    async fn disconnect(&self);

    /// Re-establish the connection pool.
    async fn connect(&self) -> InstrumentResult<()>;
}

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<InstrumentId, String>,
    last_id: i64,
}

/// In-memory implementation of InstrumentStore.
///
/// This is useful for testing and development. For production,
/// use `PostgresInstrumentStore`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInstrumentStore {
    table: Arc<RwLock<Table>>,
}

impl InMemoryInstrumentStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose identity sequence starts after `last_id`.
    pub fn starting_after(last_id: i64) -> Self {
        let store = Self::new();
        store.table.write().last_id = last_id;
        store
    }

    /// Get the number of instruments in the store.
    pub fn len(&self) -> usize {
        self.table.read().rows.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.table.read().rows.is_empty()
    }
}

#[async_trait]
impl InstrumentStore for InMemoryInstrumentStore {
    async fn list(&self, order: ListOrder) -> InstrumentResult<Vec<Instrument>> {
        let table = self.table.read();
        let mut results: Vec<Instrument> = table
            .rows
            .iter()
            .map(|(id, name)| Instrument::new(*id, name.clone()))
            .collect();

        if order == ListOrder::Name {
            results.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        }

        Ok(results)
    }

    async fn create(&self, name: String) -> InstrumentResult<Instrument> {
        let mut table = self.table.write();
        let next = table
            .last_id
            .checked_add(1)
            .ok_or_else(|| InstrumentError::store("identity sequence exhausted"))?;
        table.last_id = next;

        let id = InstrumentId::new(next);
        table.rows.insert(id, name.clone());
        Ok(Instrument { id, name })
    }

    async fn update(&self, id: InstrumentId, name: String) -> InstrumentResult<Instrument> {
        let mut table = self.table.write();
        match table.rows.get_mut(&id) {
            Some(existing) => {
                *existing = name.clone();
                Ok(Instrument { id, name })
            }
            None => Err(InstrumentError::NotFound(id)),
        }
    }

    async fn delete(&self, id: InstrumentId) -> InstrumentResult<()> {
        self.table
            .write()
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(InstrumentError::NotFound(id))
    }
}

#[async_trait]
impl Reconnect for InMemoryInstrumentStore {
    async fn disconnect(&self) {}

    async fn connect(&self) -> InstrumentResult<()> {
        Ok(())
    }
}
