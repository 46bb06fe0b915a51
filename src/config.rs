//! TESSERA - Memtable Configuration
//! Defines tunable parameters for the arena, skip list and bloom filter.

use serde::{Deserialize, Serialize};

use crate::engine::node::MAX_NODE_SIZE;
use crate::error::{Result, TesseraError};

/// Configuration for a Tessera memtable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial capacity of the skip list arena in bytes.
    pub arena_size: usize,

    /// Minimum number of bytes added to the arena when it grows.
    /// The arena always at least doubles, so this only matters for small arenas.
    pub arena_grow_step: usize,

    /// Maximum size of the MemTable in bytes before it should be flushed.
    pub memtable_max_size: usize,

    /// Target false positive rate for bloom filters built at flush time.
    pub bloom_false_positive: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arena_size: 64 * 1024 * 1024,  // 64 MB
            arena_grow_step: 1 << 30,      // 1 GB
            memtable_max_size: 64 * 1024 * 1024,
            bloom_false_positive: 0.01,
        }
    }
}

impl Config {
    /// Create a new Config with a custom initial arena size.
    pub fn new(arena_size: usize) -> Self {
        Self {
            arena_size,
            ..Default::default()
        }
    }

    /// Set the minimum arena growth step.
    pub fn with_arena_grow_step(mut self, step: usize) -> Self {
        self.arena_grow_step = step;
        self
    }

    /// Set the maximum MemTable size before flush.
    pub fn with_memtable_max_size(mut self, size: usize) -> Self {
        self.memtable_max_size = size;
        self
    }

    /// Set the bloom filter false positive target.
    pub fn with_bloom_false_positive(mut self, fp: f64) -> Self {
        self.bloom_false_positive = fp;
        self
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<()> {
        // Offsets are u32, so the arena must stay addressable.
        if self.arena_size > u32::MAX as usize {
            return Err(TesseraError::Config(format!(
                "arena_size {} exceeds the 4 GB offset space",
                self.arena_size
            )));
        }
        if self.arena_grow_step < MAX_NODE_SIZE {
            return Err(TesseraError::Config(format!(
                "arena_grow_step must be at least {} bytes, got {}",
                MAX_NODE_SIZE, self.arena_grow_step
            )));
        }
        if self.memtable_max_size == 0 {
            return Err(TesseraError::Config(
                "memtable_max_size must be greater than zero".to_string(),
            ));
        }
        if !(self.bloom_false_positive > 0.0 && self.bloom_false_positive < 1.0) {
            return Err(TesseraError::Config(format!(
                "bloom_false_positive must be in (0, 1), got {}",
                self.bloom_false_positive
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = Config::new(4096)
            .with_arena_grow_step(8192)
            .with_memtable_max_size(1024)
            .with_bloom_false_positive(0.001);

        assert_eq!(config.arena_size, 4096);
        assert_eq!(config.arena_grow_step, 8192);
        assert_eq!(config.memtable_max_size, 1024);
        assert_eq!(config.bloom_false_positive, 0.001);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_false_positive() {
        for fp in [0.0, 1.0, -0.5, f64::NAN] {
            let config = Config::default().with_bloom_false_positive(fp);
            assert!(matches!(config.validate(), Err(TesseraError::Config(_))));
        }
    }

    #[test]
    fn test_rejects_tiny_grow_step() {
        let config = Config::default().with_arena_grow_step(1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_memtable_size() {
        let config = Config::default().with_memtable_max_size(0);
        assert!(config.validate().is_err());
    }
}
