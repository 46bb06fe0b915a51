//! TESSERA - MemTable Metrics & Observability
//! Provides atomic counters for tracking memtable operations
//! in a lock-free, thread-safe manner using `AtomicU64`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Atomic operation counters for a memtable.
///
/// All counters use `Ordering::Relaxed` since we only need
/// eventual consistency for observability, not synchronization.
#[derive(Debug)]
pub struct MemTableMetrics {
    /// Total number of `set` operations.
    pub puts: AtomicU64,
    /// Total number of `delete` operations.
    pub deletes: AtomicU64,
    /// Total number of point lookups.
    pub gets: AtomicU64,
    /// Lookups that found a live value.
    pub hits: AtomicU64,
    /// Total number of `scan` operations.
    pub scans: AtomicU64,
    /// Bloom filters built for flushes.
    pub filters_built: AtomicU64,
    /// Total bytes written (keys + values).
    pub bytes_written: AtomicU64,
    /// Total bytes read (values returned by lookups).
    pub bytes_read: AtomicU64,
    created: Instant,
}

impl MemTableMetrics {
    /// Create a new metrics instance with all counters at zero.
    pub fn new() -> Self {
        Self {
            puts: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            gets: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            scans: AtomicU64::new(0),
            filters_built: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            bytes_read: AtomicU64::new(0),
            created: Instant::now(),
        }
    }

    /// Record a put of `size` key and value bytes.
    pub fn record_put(&self, size: usize) {
        self.puts.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(size as u64, Ordering::Relaxed);
    }

    pub fn record_delete(&self, key_size: usize) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
        self.bytes_written
            .fetch_add(key_size as u64, Ordering::Relaxed);
    }

    /// Record a lookup; `value_size` is `None` on a miss.
    pub fn record_get(&self, value_size: Option<usize>) {
        self.gets.fetch_add(1, Ordering::Relaxed);
        if let Some(size) = value_size {
            self.hits.fetch_add(1, Ordering::Relaxed);
            self.bytes_read.fetch_add(size as u64, Ordering::Relaxed);
        }
    }

    pub fn record_scan(&self) {
        self.scans.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_filter(&self) {
        self.filters_built.fetch_add(1, Ordering::Relaxed);
    }

    /// Seconds since the memtable was created.
    pub fn age_secs(&self) -> f64 {
        self.created.elapsed().as_secs_f64()
    }

    /// Get total number of operations (puts + deletes + gets + scans).
    pub fn total_ops(&self) -> u64 {
        self.puts.load(Ordering::Relaxed)
            + self.deletes.load(Ordering::Relaxed)
            + self.gets.load(Ordering::Relaxed)
            + self.scans.load(Ordering::Relaxed)
    }

    /// Fraction of lookups that found a live value.
    pub fn hit_ratio(&self) -> f64 {
        let gets = self.gets.load(Ordering::Relaxed);
        if gets == 0 {
            return 0.0;
        }
        self.hits.load(Ordering::Relaxed) as f64 / gets as f64
    }

    /// Format metrics as a human-readable report.
    pub fn report(&self) -> String {
        format!(
            "\n═══ TESSERA MemTable Metrics ═══\n\
             Operations:\n\
               puts:      {}\n\
               deletes:   {}\n\
               gets:      {}\n\
               scans:     {}\n\
               filters:   {}\n\
             Lookups:\n\
               hit ratio: {:.2}\n\
             I/O:\n\
               written:   {} bytes\n\
               read:      {} bytes\n\
             Age: {:.2}s",
            self.puts.load(Ordering::Relaxed),
            self.deletes.load(Ordering::Relaxed),
            self.gets.load(Ordering::Relaxed),
            self.scans.load(Ordering::Relaxed),
            self.filters_built.load(Ordering::Relaxed),
            self.hit_ratio(),
            self.bytes_written.load(Ordering::Relaxed),
            self.bytes_read.load(Ordering::Relaxed),
            self.age_secs(),
        )
    }
}

impl Default for MemTableMetrics {
    fn default() -> Self {
        Self::new()
    }
}
