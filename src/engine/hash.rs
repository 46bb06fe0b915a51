//! TESSERA - Key Hashing
//! A fast, non-cryptographic 32-bit hash in the style of Murmur.
//!
//! Bloom filters store probe positions derived from this hash, so the
//! constants below are part of the filter format: changing them invalidates
//! every persisted filter.

const SEED: u32 = 0xbc9f_1d34;
const M: u32 = 0xc6a4_a793;

/// Hash `b` into 32 bits.
pub fn hash(b: &[u8]) -> u32 {
    let mut h = SEED ^ (b.len() as u32).wrapping_mul(M);

    let mut chunks = b.chunks_exact(4);
    for w in &mut chunks {
        h = h.wrapping_add(u32::from_le_bytes([w[0], w[1], w[2], w[3]]));
        h = h.wrapping_mul(M);
        h ^= h >> 16;
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        if tail.len() == 3 {
            h = h.wrapping_add((tail[2] as u32) << 16);
        }
        if tail.len() >= 2 {
            h = h.wrapping_add((tail[1] as u32) << 8);
        }
        h = h.wrapping_add(tail[0] as u32);
        h = h.wrapping_mul(M);
        h ^= h >> 24;
    }
    h
}
