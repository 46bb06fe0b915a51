//! TESSERA - Value Codec
//! Encodes a value together with its expiration timestamp.
//!
//! ## Binary Format
//! ```text
//! [expires_at: uvarint, 1-10 bytes][value: remaining bytes]
//! ```
//! The varint is self-delimiting, so the value length is implied by the
//! length of the run, which the skip list records next to its offset.

use bytes::Bytes;

use crate::error::{Result, TesseraError};

/// The maximum length of a varint-encoded u64.
pub const MAX_VARINT_LEN64: usize = 10;

/// A value and its expiration, as stored in the arena.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueStruct {
    pub value: Bytes,
    pub expires_at: u64,
}

impl ValueStruct {
    pub fn new(value: impl Into<Bytes>, expires_at: u64) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Exact number of bytes `encode_value` writes.
    pub fn encoded_size(&self) -> u32 {
        encoded_size(self.expires_at, &self.value)
    }

    /// Write the value run into `buf`, returning the bytes written.
    ///
    /// # Panics
    /// If `buf` is shorter than `encoded_size()`.
    pub fn encode_value(&self, buf: &mut [u8]) -> usize {
        let sz = put_uvarint(buf, self.expires_at);
        buf[sz..sz + self.value.len()].copy_from_slice(&self.value);
        sz + self.value.len()
    }

    /// Decode an owned copy of a value run.
    pub fn decode_value(buf: &[u8]) -> Result<Self> {
        let (expires_at, value) = decode(buf)?;
        Ok(Self {
            value: Bytes::copy_from_slice(value),
            expires_at,
        })
    }
}

/// Encode `expires_at` and `value` into a fresh buffer.
pub fn encode(expires_at: u64, value: &[u8]) -> Vec<u8> {
    let mut buf = vec![0u8; encoded_size(expires_at, value) as usize];
    let sz = put_uvarint(&mut buf, expires_at);
    buf[sz..].copy_from_slice(value);
    buf
}

/// Split a value run into its expiration and a view of the value bytes.
pub fn decode(buf: &[u8]) -> Result<(u64, &[u8])> {
    let (expires_at, n) = uvarint(buf)?;
    Ok((expires_at, &buf[n..]))
}

/// Exact length of `encode(expires_at, value)`.
pub fn encoded_size(expires_at: u64, value: &[u8]) -> u32 {
    (varint_size(expires_at) + value.len()) as u32
}

/// Number of bytes needed to varint-encode `x`.
pub const fn varint_size(mut x: u64) -> usize {
    let mut n = 0;
    loop {
        n += 1;
        x >>= 7;
        if x == 0 {
            break;
        }
    }
    n
}

/// Encodes a u64 into `buf` and returns the number of bytes written.
///
/// # Panics
/// The buffer is too small.
fn put_uvarint(buf: &mut [u8], mut x: u64) -> usize {
    let mut i = 0;
    while x >= 0x80 {
        buf[i] = (x as u8) | 0x80;
        x >>= 7;
        i += 1;
    }
    buf[i] = x as u8;
    i + 1
}

/// Decodes a u64 from `buf`, returning it with the number of bytes read.
fn uvarint(buf: &[u8]) -> Result<(u64, usize)> {
    let mut x: u64 = 0;
    let mut s: u32 = 0;
    for (i, &b) in buf.iter().enumerate() {
        if i == MAX_VARINT_LEN64 {
            return Err(TesseraError::Corruption("varint overflows u64".into()));
        }
        if b < 0x80 {
            if i == MAX_VARINT_LEN64 - 1 && b > 1 {
                return Err(TesseraError::Corruption("varint overflows u64".into()));
            }
            return Ok((x | ((b as u64) << s), i + 1));
        }
        x |= ((b & 0x7f) as u64) << s;
        s += 7;
    }
    Err(TesseraError::Corruption(format!(
        "truncated varint in {} byte value run",
        buf.len()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let cases: [(u64, &[u8]); 6] = [
            (0, b""),
            (0, b"hello"),
            (127, b"x"),
            (128, b"xy"),
            (1_700_000_000, b"a longer value with spaces"),
            (u64::MAX, b"max"),
        ];
        for (expires_at, value) in cases {
            let buf = encode(expires_at, value);
            assert_eq!(buf.len() as u32, encoded_size(expires_at, value));

            let (decoded_exp, decoded_val) = decode(&buf).unwrap();
            assert_eq!(decoded_exp, expires_at);
            assert_eq!(decoded_val, value);
        }
    }

    #[test]
    fn test_varint_size_boundaries() {
        assert_eq!(varint_size(0), 1);
        assert_eq!(varint_size(127), 1);
        assert_eq!(varint_size(128), 2);
        assert_eq!(varint_size(16_383), 2);
        assert_eq!(varint_size(16_384), 3);
        assert_eq!(varint_size(u64::MAX), MAX_VARINT_LEN64);
    }

    #[test]
    fn test_known_encoding() {
        assert_eq!(encode(300, b"v"), vec![0xAC, 0x02, b'v']);
    }

    #[test]
    fn test_value_struct_into_slice() {
        let vs = ValueStruct::new("payload", 42);
        let mut buf = vec![0u8; vs.encoded_size() as usize];
        assert_eq!(vs.encode_value(&mut buf), buf.len());
        assert_eq!(ValueStruct::decode_value(&buf).unwrap(), vs);
    }

    #[test]
    fn test_truncated_varint() {
        assert!(matches!(decode(&[0x80, 0x80]), Err(TesseraError::Corruption(_))));
        assert!(decode(&[]).is_err());
    }

    #[test]
    fn test_overflowing_varint() {
        let buf = [0xFFu8; 11];
        assert!(matches!(decode(&buf), Err(TesseraError::Corruption(_))));
    }
}
