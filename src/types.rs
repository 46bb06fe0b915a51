//! TESSERA - Core Type Definitions
//! Defines the caller-facing entry that flows in and out of the memtable.

use std::time::Duration;

use bytes::Bytes;

use crate::engine::ttl;

/// Key type for the memtable.
pub type Key = Bytes;

/// Value type for the memtable.
/// An empty value is a tombstone.
pub type Value = Bytes;

/// Represents a single entry written to or read from the memtable.
///
/// Only `key`, `value` and `expires_at` are stored in the skip list. The
/// remaining fields are bookkeeping for the layers that sit above it
/// (table builders and the value log).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub key: Key,
    pub value: Value,
    /// Unix seconds; `0` means no expiry.
    pub expires_at: u64,

    pub version: u64,
    pub offset: u32,
    pub hlen: usize,
    pub val_threshold: u64,
}

impl Entry {
    /// Create a new entry with a value (PUT operation).
    pub fn new(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// Create a tombstone entry (DELETE operation).
    pub fn delete(key: impl Into<Key>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Expire the entry `ttl` from now.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.expires_at = ttl::deadline_after(ttl);
        self
    }

    /// Expire the entry at an absolute Unix timestamp (seconds).
    pub fn with_expires_at(mut self, expires_at: u64) -> Self {
        self.expires_at = expires_at;
        self
    }

    /// Returns true if this entry is a tombstone.
    pub fn is_tombstone(&self) -> bool {
        self.value.is_empty()
    }

    /// Returns true if the entry carries a TTL that has passed.
    pub fn is_expired(&self) -> bool {
        ttl::is_expired(self.expires_at, ttl::now_secs())
    }

    /// Raw key plus value length.
    pub fn size(&self) -> usize {
        self.key.len() + self.value.len()
    }
}
