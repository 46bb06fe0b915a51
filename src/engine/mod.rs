//! TESSERA - Memtable Engine Module
//! Arena, skip list, value codec and bloom filter, leaves first.

pub mod arena;
pub mod bloom;
pub mod codec;
pub mod hash;
pub mod iterator;
pub mod memtable;
pub mod metrics;
pub mod node;
pub mod skiplist;
pub mod ttl;

pub use bloom::{bloom_bits_per_key, Filter};
pub use iterator::EntryIterator;
pub use memtable::MemTable;
pub use skiplist::{SkipList, SkipListIterator};
