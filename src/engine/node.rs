//! TESSERA - Skip List Node
//! Nodes live inside the arena and are addressed by offset.
//!
//! ## Layout (little-endian)
//! ```text
//! +0   score       u64   first 8 key bytes, big-endian packed
//! +8   value       u64   value size << 32 | value offset
//! +16  key_offset  u32
//! +20  key_size    u16
//! +22  height      u16
//! +24  tower       [u32; height]   next offset per level, 0 = end
//! ```
//! Only `height` tower slots are allocated, so the levels above a node's
//! height must never be touched.

use std::cmp::Ordering;

use super::arena::Arena;
use super::codec::ValueStruct;

/// Maximum number of levels in the skip list.
pub const MAX_HEIGHT: usize = 20;

/// Longest key a node can record; `key_size` is a `u16`.
pub const MAX_KEY_SIZE: usize = u16::MAX as usize;

pub const OFFSET_SIZE: usize = std::mem::size_of::<u32>();
pub const NODE_HEADER_SIZE: usize = 24;
pub const NODE_ALIGN: usize = std::mem::size_of::<u64>() - 1;

/// Size of a node with a full tower.
pub const MAX_NODE_SIZE: usize = NODE_HEADER_SIZE + MAX_HEIGHT * OFFSET_SIZE;

const SCORE: usize = 0;
const VALUE: usize = 8;
const KEY_OFFSET: usize = 16;
const KEY_SIZE: usize = 20;
const HEIGHT: usize = 22;
const TOWER: usize = 24;

/// Handle to a node inside an arena.
///
/// A `Node` is just an offset, so it stays valid across arena growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node(u32);

impl Node {
    pub(crate) fn at(offset: u32) -> Self {
        Node(offset)
    }

    /// Allocate and initialise a node holding `key` and `v`.
    pub fn new(arena: &mut Arena, key: &[u8], v: &ValueStruct, height: usize) -> Self {
        assert!((1..=MAX_HEIGHT).contains(&height), "invalid node height {}", height);
        assert!(key.len() <= MAX_KEY_SIZE, "key too large: {} bytes", key.len());

        let node = Node(arena.put_node(height));
        let key_offset = arena.put_key(key);
        let value_offset = arena.put_value(v);

        let base = node.0 as usize;
        arena.write_u64(base + SCORE, calc_score(key));
        arena.write_u64(base + VALUE, encode_value(value_offset, v.encoded_size()));
        arena.write_u32(base + KEY_OFFSET, key_offset);
        arena.write_u16(base + KEY_SIZE, key.len() as u16);
        arena.write_u16(base + HEIGHT, height as u16);
        for level in 0..height {
            node.set_next_offset(arena, level, 0);
        }
        node
    }

    pub fn offset(self) -> u32 {
        self.0
    }

    pub fn score(self, arena: &Arena) -> u64 {
        arena.read_u64(self.0 as usize + SCORE)
    }

    pub fn height(self, arena: &Arena) -> usize {
        arena.read_u16(self.0 as usize + HEIGHT) as usize
    }

    pub fn key(self, arena: &Arena) -> &[u8] {
        let base = self.0 as usize;
        let offset = arena.read_u32(base + KEY_OFFSET);
        let size = arena.read_u16(base + KEY_SIZE);
        arena.get_key(offset, size)
    }

    /// Decode the value currently referenced by this node.
    pub fn value(self, arena: &Arena) -> ValueStruct {
        let (offset, size) = decode_value(arena.read_u64(self.0 as usize + VALUE));
        arena.get_value(offset, size)
    }

    /// Store `v` in the arena and point this node at it.
    pub fn set_value(self, arena: &mut Arena, v: &ValueStruct) {
        let offset = arena.put_value(v);
        arena.write_u64(self.0 as usize + VALUE, encode_value(offset, v.encoded_size()));
    }

    pub fn next_offset(self, arena: &Arena, level: usize) -> u32 {
        debug_assert!(level < self.height(arena));
        arena.read_u32(self.0 as usize + TOWER + level * OFFSET_SIZE)
    }

    pub fn set_next_offset(self, arena: &mut Arena, level: usize, offset: u32) {
        arena.write_u32(self.0 as usize + TOWER + level * OFFSET_SIZE, offset);
    }

    /// Order `key` (with precomputed `score`) against this node's key.
    ///
    /// Scores only short-circuit; equal scores fall back to comparing bytes.
    pub fn compare(self, arena: &Arena, score: u64, key: &[u8]) -> Ordering {
        match score.cmp(&self.score(arena)) {
            Ordering::Equal => key.cmp(self.key(arena)),
            ord => ord,
        }
    }
}

/// Pack a value run's offset and size into one word.
pub fn encode_value(offset: u32, size: u32) -> u64 {
    ((size as u64) << 32) | offset as u64
}

pub fn decode_value(value: u64) -> (u32, u32) {
    (value as u32, (value >> 32) as u32)
}

/// Pack up to the first 8 key bytes, most significant first.
///
/// Ordering by score agrees with byte ordering whenever the scores differ.
pub fn calc_score(key: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    let l = key.len().min(8);
    buf[..l].copy_from_slice(&key[..l]);
    u64::from_be_bytes(buf)
}
