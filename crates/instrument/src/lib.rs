//! # Instrument Crate
//!
//! The instrument catalogue for Bandstand: a single `instruments` table of
//! `(id, name)` rows with list/create/update/delete over HTTP.
//!
//! ## Key Components
//!
//! - **Domain Types**: `Instrument`, `InstrumentId` (string on the wire), `ListOrder`
//! - **Traits**: `InstrumentStore` for storage, `Reconnect` for pool cycling,
//!   `InstrumentApi` for remote clients
//! - **Retry**: `RetryingStore` retries once after a prepared-statement conflict
//! - **Service**: `InstrumentService` validates names before they reach the store
//! - **View**: `OptimisticList` applies mutations locally with rollback
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  HTTP API (api)                 OptimisticList (view)        │
//! │  /api/instruments[/:id]           │                          │
//! │        │                          ▼                          │
//! │        ▼                    InstrumentApi ── InstrumentHttpClient
//! │  InstrumentService                                           │
//! │        │                                                     │
//! │        ▼                                                     │
//! │  RetryingStore<S> ── on 42P05/26000: disconnect, sleep,      │
//! │        │             connect, call once more                 │
//! │        ▼                                                     │
//! │  PostgresInstrumentStore │ InMemoryInstrumentStore           │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod error;
pub mod retry;
pub mod service;
pub mod store;
pub mod types;
pub mod view;

#[cfg(feature = "postgres")]
pub mod db;

#[cfg(feature = "api")]
pub mod api;

// Re-export main types for convenience
pub use client::InstrumentApi;
pub use error::{InstrumentError, InstrumentResult, TRANSIENT_STORE_CODES};
pub use retry::{RetryPolicy, RetryingStore, DEFAULT_RETRY_DELAY};
pub use service::{validate_name, InstrumentService, NAME_REQUIRED};
pub use store::{InMemoryInstrumentStore, InstrumentStore, Reconnect};
pub use types::{Instrument, InstrumentId, ListOrder};
pub use view::{InstrumentListView, ListRow, OptimisticList, RowKey, Snapshot};

#[cfg(feature = "client")]
pub use client::InstrumentHttpClient;

#[cfg(feature = "postgres")]
pub use db::{DatabaseSettings, PostgresInstrumentStore};

#[cfg(feature = "api")]
pub use api::{instrument_routes, InstrumentApiState};
