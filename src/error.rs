//! TESSERA - Custom Error Types
//! Defines the error hierarchy for the memtable core.

use thiserror::Error;

/// Custom Result type for the Tessera crate.
pub type Result<T> = std::result::Result<T, TesseraError>;

/// Error types for the Tessera memtable core.
///
/// Allocation and lookups never fail; only configuration checks, oversize
/// keys and decoding of foreign byte runs surface recoverable errors.
#[derive(Error, Debug)]
pub enum TesseraError {
    /// A byte run could not be decoded (truncated or overflowing varint).
    #[error("Data corruption detected: {0}")]
    Corruption(String),

    /// Key length exceeds what a node can record.
    #[error("Key too large: {size} bytes (max {max})")]
    KeyTooLarge { size: usize, max: usize },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
