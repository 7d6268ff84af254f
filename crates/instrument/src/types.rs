//! Core domain types for instruments.
//!
//! - `InstrumentId`: store-assigned 64-bit identifier, carried as text on the wire
//! - `Instrument`: a catalogue entry (id + name)
//! - `ListOrder`: caller-chosen ordering for listings

use crate::error::{InstrumentError, InstrumentResult};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for an instrument.
///
/// Backed by the table's `BIGINT` identity column. JSON numbers are doubles
/// on most clients, so the id is always serialized as a decimal string;
/// deserialization accepts that string (or a plain integer) and parses it
/// back to the exact `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstrumentId(i64);

impl InstrumentId {
    /// Wrap a raw store id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner integer value.
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Parse an id from its wire text.
    pub fn parse(text: &str) -> InstrumentResult<Self> {
        text.parse()
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InstrumentId {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| InstrumentError::InvalidId(s.to_string()))
    }
}

impl From<i64> for InstrumentId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl Serialize for InstrumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for InstrumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl<'de> Visitor<'de> for IdVisitor {
            type Value = InstrumentId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an instrument id as a decimal string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<InstrumentId, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<InstrumentId, E> {
                Ok(InstrumentId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<InstrumentId, E> {
                i64::try_from(v)
                    .map(InstrumentId)
                    .map_err(|_| E::custom(format!("instrument id out of range: {}", v)))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// A catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: InstrumentId,
    pub name: String,
}

impl Instrument {
    pub fn new(id: impl Into<InstrumentId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Ordering for `InstrumentStore::list`.
///
/// There is no store-wide ordering guarantee; each call site picks one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOrder {
    /// Ascending id (creation order).
    #[default]
    Id,
    /// Ascending name, ties broken by id.
    Name,
}

impl ListOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListOrder::Id => "id",
            ListOrder::Name => "name",
        }
    }
}

impl FromStr for ListOrder {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" => Ok(ListOrder::Id),
            "name" => Ok(ListOrder::Name),
            other => Err(InstrumentError::validation(format!(
                "Invalid order: {}. Use id or name.",
                other
            ))),
        }
    }
}
