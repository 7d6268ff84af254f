//! Database layer for instrument storage.
//!
//! This module provides the PostgreSQL-backed implementation of the
//! `InstrumentStore` and `Reconnect` traits over a single `instruments` table.

pub mod models;
pub mod postgres;

pub use models::{store_error, InstrumentRow};
pub use postgres::{DatabaseSettings, PostgresInstrumentStore};
