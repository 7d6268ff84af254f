//! Client-side instrument list with optimistic mutations.
//!
//! Changes are applied to the local rows before the API call resolves:
//!
//! - **create** inserts a placeholder row under a temporary key, swapped for
//!   the server record on success and dropped on failure
//! - **rename / remove** capture a `Snapshot` of every row first, restore it
//!   wholesale on failure and discard it on success
//!
//! The view never merges concurrent edits; the last write to reach the store wins.

use crate::client::InstrumentApi;
use crate::error::{InstrumentError, InstrumentResult};
use crate::service::validate_name;
use crate::types::{Instrument, InstrumentId, ListOrder};
use chrono::Utc;
use tracing::{debug, warn};

/// Identity of a row in the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKey {
    /// Confirmed by the server.
    Saved(InstrumentId),
    /// Awaiting a create response; keyed by a timestamp-derived value.
    Pending(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub key: RowKey,
    pub name: String,
}

impl From<Instrument> for ListRow {
    fn from(instrument: Instrument) -> Self {
        Self {
            key: RowKey::Saved(instrument.id),
            name: instrument.name,
        }
    }
}

/// Full copy of the rows taken before a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    rows: Vec<ListRow>,
}

/// Local state of the instrument list.
#[derive(Debug, Clone, Default)]
pub struct InstrumentListView {
    rows: Vec<ListRow>,
    error: Option<String>,
    last_pending: i64,
}

impl InstrumentListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every row with server data, skipping blank names.
    pub fn replace_all(&mut self, instruments: Vec<Instrument>) {
        self.rows = instruments
            .into_iter()
            .filter(|i| !i.name.trim().is_empty())
            .map(ListRow::from)
            .collect();
    }

    pub fn rows(&self) -> &[ListRow] {
        &self.rows
    }

    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.name.as_str()).collect()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            rows: self.rows.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.rows = snapshot.rows;
    }

    /// Append a placeholder row and return its temporary key.
    ///
    /// Keys come from the wall clock in milliseconds, bumped so that two
    /// placeholders created in the same millisecond never collide.
    pub fn insert_placeholder(&mut self, name: impl Into<String>) -> i64 {
        let key = Utc::now().timestamp_millis().max(self.last_pending + 1);
        self.last_pending = key;
        self.rows.push(ListRow {
            key: RowKey::Pending(key),
            name: name.into(),
        });
        key
    }

    /// Swap a placeholder for the server's record.
    pub fn confirm_placeholder(&mut self, key: i64, instrument: Instrument) -> bool {
        match self.position(RowKey::Pending(key)) {
            Some(index) => {
                self.rows[index] = ListRow::from(instrument);
                true
            }
            None => false,
        }
    }

    pub fn drop_placeholder(&mut self, key: i64) -> bool {
        self.remove_key(RowKey::Pending(key))
    }

    pub fn rename(&mut self, id: InstrumentId, name: impl Into<String>) -> bool {
        match self.position(RowKey::Saved(id)) {
            Some(index) => {
                self.rows[index].name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: InstrumentId) -> bool {
        self.remove_key(RowKey::Saved(id))
    }

    fn position(&self, key: RowKey) -> Option<usize> {
        self.rows.iter().position(|row| row.key == key)
    }

    fn remove_key(&mut self, key: RowKey) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.key != key);
        self.rows.len() != before
    }
}

/// Drives an `InstrumentListView` through an `InstrumentApi`.
pub struct OptimisticList<A> {
    api: A,
    view: InstrumentListView,
    order: ListOrder,
}

impl<A: InstrumentApi> OptimisticList<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            view: InstrumentListView::new(),
            order: ListOrder::Id,
        }
    }

    pub fn with_order(mut self, order: ListOrder) -> Self {
        self.order = order;
        self
    }

    pub fn view(&self) -> &InstrumentListView {
        &self.view
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetch the full list from the server.
    pub async fn load(&mut self) -> InstrumentResult<()> {
        match self.api.list(self.order).await {
            Ok(instruments) => {
                self.view.replace_all(instruments);
                self.view.clear_error();
                Ok(())
            }
            Err(err) => Err(self.fail("Failed to fetch instruments", err)),
        }
    }

    /// Add an instrument. Blank names are rejected without a request.
    pub async fn add(&mut self, name: &str) -> InstrumentResult<Instrument> {
        let name = validate_name(Some(name))?;
        let key = self.view.insert_placeholder(name.clone());

        match self.api.create(name).await {
            Ok(instrument) => {
                self.view.confirm_placeholder(key, instrument.clone());
                self.view.clear_error();
                debug!(id = %instrument.id, "Placeholder confirmed");
                Ok(instrument)
            }
            Err(err) => {
                self.view.drop_placeholder(key);
                Err(self.fail("Failed to create instrument", err))
            }
        }
    }

    pub async fn rename(&mut self, id: InstrumentId, name: &str) -> InstrumentResult<Instrument> {
        let name = validate_name(Some(name))?;
        let snapshot = self.view.snapshot();
        self.view.rename(id, name.clone());

        match self.api.update(id, name).await {
            Ok(instrument) => {
                self.view.clear_error();
                Ok(instrument)
            }
            Err(err) => {
                self.view.restore(snapshot);
                Err(self.fail("Failed to update instrument", err))
            }
        }
    }

    pub async fn remove(&mut self, id: InstrumentId) -> InstrumentResult<()> {
        let snapshot = self.view.snapshot();
        self.view.remove(id);

        match self.api.delete(id).await {
            Ok(()) => {
                self.view.clear_error();
                Ok(())
            }
            Err(err) => {
                self.view.restore(snapshot);
                Err(self.fail("Failed to delete instrument", err))
            }
        }
    }

    fn fail(&mut self, message: &str, err: InstrumentError) -> InstrumentError {
        warn!(error = %err, "{}", message);
        self.view.set_error(message);
        err
    }
}
