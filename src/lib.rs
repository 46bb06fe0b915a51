//! TESSERA - Memtable Core for LSM-Tree Storage Engines
//!
//! The in-memory write buffer of an LSM-Tree and the filter used to skip
//! tables that cannot hold a key.
//!
//! ## Features
//! - **Arena**: growable bump allocator; nodes are addressed by offset
//! - **Skip List**: ordered, concurrent, update-in-place on duplicate keys
//! - **Value Codec**: varint expiry + value bytes in one compact run
//! - **Bloom Filter**: double-hashed probes over a 32-bit key hash
//! - **MemTable**: tombstones, TTL-aware reads, flush-time filter building
//! - **Metrics**: Lock-free atomic counters for observability
//!
//! ## Example
//! ```
//! use tessera::{config::Config, engine::{EntryIterator, MemTable}, types::Entry};
//!
//! let table = MemTable::new(Config::new(1 << 20)).unwrap();
//!
//! table.set(&Entry::new("apple", "red")).unwrap();
//! table.set(&Entry::new("banana", "yellow")).unwrap();
//! table.set(&Entry::new("apple", "green")).unwrap();
//!
//! assert_eq!(table.get_value(b"apple").unwrap(), "green");
//!
//! let keys: Vec<_> = table.iter().entries().map(|e| e.key).collect();
//! assert_eq!(keys, ["apple", "banana"]);
//!
//! let filter = table.build_filter();
//! assert!(filter.may_contain_key(b"banana"));
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod types;

pub use error::{Result, TesseraError};
