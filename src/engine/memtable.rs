//! TESSERA - MemTable (In-Memory Sorted Buffer)
//! The MemTable is the write-buffer of the LSM-Tree.
//! All writes go here first before being flushed to tables on disk.

use bytes::Bytes;

use crate::config::Config;
use crate::error::{Result, TesseraError};
use crate::types::{Entry, Key};

use super::bloom::{bloom_bits_per_key, Filter};
use super::hash::hash;
use super::iterator::EntryIterator;
use super::metrics::MemTableMetrics;
use super::node::MAX_KEY_SIZE;
use super::skiplist::{SkipList, SkipListIterator};

/// In-memory sorted key-value buffer backed by an arena skip list.
///
/// All methods take `&self`; share it between threads with `Arc`.
/// A delete is stored as a tombstone (empty value) so it can shadow older
/// versions of the key in flushed tables.
pub struct MemTable {
    list: SkipList,
    metrics: MemTableMetrics,
    config: Config,
}

impl MemTable {
    /// Create a new, empty MemTable.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let list = SkipList::with_config(&config);
        log::debug!(
            "MemTable created (arena {} bytes, flush at {} bytes)",
            config.arena_size,
            config.memtable_max_size
        );
        Ok(Self {
            list,
            metrics: MemTableMetrics::new(),
            config,
        })
    }

    /// Insert an entry. An existing key is overwritten.
    ///
    /// Keys longer than `MAX_KEY_SIZE` bytes are rejected.
    pub fn set(&self, entry: &Entry) -> Result<()> {
        check_key(&entry.key)?;
        self.metrics.record_put(entry.size());
        self.list.insert(entry);
        Ok(())
    }

    /// Delete a key by inserting a tombstone.
    pub fn delete(&self, key: impl Into<Key>) -> Result<()> {
        let entry = Entry::delete(key);
        check_key(&entry.key)?;
        self.metrics.record_delete(entry.key.len());
        self.list.insert(&entry);
        Ok(())
    }

    /// Get the raw entry for `key`, tombstones and expired entries included.
    pub fn get(&self, key: &[u8]) -> Option<Entry> {
        let found = self.list.search(key);
        self.metrics.record_get(
            found
                .as_ref()
                .filter(|e| is_live(e))
                .map(|e| e.value.len()),
        );
        found
    }

    /// Get the live value for `key`.
    /// Returns `None` if the key is absent, deleted or expired.
    pub fn get_value(&self, key: &[u8]) -> Option<Bytes> {
        let live = self
            .list
            .search(key)
            .filter(|e| is_live(e))
            .map(|e| e.value);
        self.metrics.record_get(live.as_ref().map(|v| v.len()));
        live
    }

    /// Check if a key exists in the MemTable (including tombstones).
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.list.search(key).is_some()
    }

    /// Arena bytes used so far.
    pub fn size(&self) -> usize {
        self.list.size() as usize
    }

    /// Number of distinct keys, tombstones included.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// True once the arena has reached the configured flush threshold.
    pub fn is_full(&self) -> bool {
        self.size() >= self.config.memtable_max_size
    }

    /// Cursor over every entry in key order, for flushing.
    pub fn iter(&self) -> SkipListIterator<'_> {
        self.list.new_iterator()
    }

    /// Live entries in key order; tombstones and expired entries are skipped.
    pub fn scan(&self) -> Vec<Entry> {
        self.metrics.record_scan();
        self.iter()
            .entries()
            .filter(|e| is_live(e))
            .collect()
    }

    /// Build the bloom filter for the table this MemTable flushes into.
    ///
    /// Every key is included, tombstones too, since the flushed table
    /// still has to answer for them.
    pub fn build_filter(&self) -> Filter {
        let hashes: Vec<u32> = self.iter().entries().map(|e| hash(&e.key)).collect();
        let bits_per_key = bloom_bits_per_key(hashes.len(), self.config.bloom_false_positive);
        let filter = Filter::new(&hashes, bits_per_key);

        self.metrics.record_filter();
        log::info!(
            "Bloom filter built over {} keys ({} bits/key, {} bytes)",
            hashes.len(),
            bits_per_key,
            filter.as_bytes().len()
        );
        filter
    }

    pub fn metrics(&self) -> &MemTableMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn check_key(key: &[u8]) -> Result<()> {
    if key.len() > MAX_KEY_SIZE {
        return Err(TesseraError::KeyTooLarge {
            size: key.len(),
            max: MAX_KEY_SIZE,
        });
    }
    Ok(())
}

/// Neither a tombstone nor past its expiry.
fn is_live(entry: &Entry) -> bool {
    !entry.is_tombstone() && !entry.is_expired()
}
