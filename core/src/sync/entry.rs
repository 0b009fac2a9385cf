use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::RawWave;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("timestamp {0} is out of range")]
    TimestampOutOfRange(i64),
}

/// One wave as the UI sees it. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveEntry {
    pub address: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl WaveEntry {
    /// Maps a ledger record onto an entry, converting unix seconds to a time value.
    pub fn from_raw(raw: RawWave) -> Result<Self, EntryError> {
        let timestamp = Utc
            .timestamp_opt(raw.unix_seconds, 0)
            .single()
            .ok_or(EntryError::TimestampOutOfRange(raw.unix_seconds))?;
        Ok(Self {
            address: raw.sender,
            timestamp,
            message: raw.message,
        })
    }

    pub fn key(&self) -> EntryKey {
        EntryKey {
            address: self.address.clone(),
            unix_seconds: self.timestamp.timestamp(),
            message: self.message.clone(),
        }
    }
}

/// Stable identity of a remote record, derived from its content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    address: String,
    unix_seconds: i64,
    message: String,
}
