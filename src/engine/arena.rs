//! TESSERA - Arena Allocator
//! A growable bump allocator backing a single skip list.
//!
//! Everything the skip list stores (nodes, keys, value runs) lives in one
//! byte buffer and is addressed by `u32` offset. Offset 0 is never handed
//! out, so it doubles as the null pointer for forward links.
//!
//! ## Growth
//! When an allocation leaves less than `MAX_NODE_SIZE` bytes of headroom the
//! buffer is replaced by a larger one and every byte is copied across.
//! Offsets stay valid because the copy preserves positions. Growth needs
//! `&mut Arena`, so it can only happen while the owning skip list holds its
//! write lock.

use std::sync::atomic::{AtomicU32, Ordering};

use super::codec::ValueStruct;
use super::node::{Node, MAX_NODE_SIZE, NODE_ALIGN, NODE_HEADER_SIZE, OFFSET_SIZE};

/// Default minimum growth step (1 GB).
pub const DEFAULT_GROW_STEP: usize = 1 << 30;

/// Bump allocator over a growable byte buffer.
pub struct Arena {
    /// Offset of the next free byte.
    n: AtomicU32,
    /// Backing storage.
    buf: Vec<u8>,
    /// Minimum number of bytes added per growth.
    grow_step: usize,
}

impl Arena {
    /// Create an arena with `capacity` bytes preallocated.
    pub fn new(capacity: usize) -> Self {
        Self::with_grow_step(capacity, DEFAULT_GROW_STEP)
    }

    /// Create an arena that grows by at least `grow_step` bytes at a time.
    pub fn with_grow_step(capacity: usize, grow_step: usize) -> Self {
        Self {
            n: AtomicU32::new(1),
            buf: vec![0u8; capacity],
            grow_step: grow_step.max(MAX_NODE_SIZE),
        }
    }

    /// Reserve `sz` bytes and return the offset of the first one.
    pub fn allocate(&mut self, sz: u32) -> u32 {
        let offset = self.n.fetch_add(sz, Ordering::SeqCst);
        let end = offset as usize + sz as usize;
        assert_true(
            end <= u32::MAX as usize,
            "arena exceeded the u32 offset space",
        );

        let needed = end + MAX_NODE_SIZE;
        if needed > self.buf.len() {
            self.grow(sz as usize, needed);
        }
        offset
    }

    fn grow(&mut self, sz: usize, needed: usize) {
        let old_len = self.buf.len();
        let grow_by = old_len
            .max(self.grow_step)
            .max(sz)
            .max(needed - old_len);

        let mut new_buf = vec![0u8; old_len + grow_by];
        new_buf[..old_len].copy_from_slice(&self.buf);
        assert_true(
            new_buf.len() >= needed,
            "arena growth left no room for the pending allocation",
        );
        self.buf = new_buf;

        log::debug!("Arena grown from {} to {} bytes", old_len, self.buf.len());
    }

    /// Allocate a node with room for exactly `height` tower slots.
    /// The returned offset is aligned to `NODE_ALIGN + 1` bytes.
    pub fn put_node(&mut self, height: usize) -> u32 {
        let len = NODE_HEADER_SIZE + height * OFFSET_SIZE + NODE_ALIGN;
        let n = self.allocate(len as u32);
        (n + NODE_ALIGN as u32) & !(NODE_ALIGN as u32)
    }

    /// Copy `key` into the arena.
    pub fn put_key(&mut self, key: &[u8]) -> u32 {
        let offset = self.allocate(key.len() as u32);
        let start = offset as usize;
        self.buf[start..start + key.len()].copy_from_slice(key);
        offset
    }

    /// Encode `v` into the arena.
    pub fn put_value(&mut self, v: &ValueStruct) -> u32 {
        let size = v.encoded_size();
        let offset = self.allocate(size);
        let start = offset as usize;
        let written = v.encode_value(&mut self.buf[start..start + size as usize]);
        assert_true(written == size as usize, "value run size mismatch");
        offset
    }

    /// Resolve a node offset. Offset 0 is the null node.
    pub fn get_node(&self, offset: u32) -> Option<Node> {
        if offset == 0 {
            return None;
        }
        Some(Node::at(offset))
    }

    pub fn get_key(&self, offset: u32, size: u16) -> &[u8] {
        let start = offset as usize;
        &self.buf[start..start + size as usize]
    }

    /// Decode the value run at `offset`.
    pub fn get_value(&self, offset: u32, size: u32) -> ValueStruct {
        let start = offset as usize;
        match ValueStruct::decode_value(&self.buf[start..start + size as usize]) {
            Ok(v) => v,
            Err(e) => fatal(&format!("arena value run at {} is unreadable: {}", offset, e)),
        }
    }

    /// Bytes handed out so far, including the reserved byte at offset 0.
    pub fn size(&self) -> u32 {
        self.n.load(Ordering::SeqCst)
    }

    /// Length of the current backing buffer.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn read_u16(&self, offset: usize) -> u16 {
        let mut b = [0u8; 2];
        b.copy_from_slice(&self.buf[offset..offset + 2]);
        u16::from_le_bytes(b)
    }

    pub(crate) fn read_u32(&self, offset: usize) -> u32 {
        let mut b = [0u8; 4];
        b.copy_from_slice(&self.buf[offset..offset + 4]);
        u32::from_le_bytes(b)
    }

    pub(crate) fn read_u64(&self, offset: usize) -> u64 {
        let mut b = [0u8; 8];
        b.copy_from_slice(&self.buf[offset..offset + 8]);
        u64::from_le_bytes(b)
    }

    pub(crate) fn write_u16(&mut self, offset: usize, v: u16) {
        self.buf[offset..offset + 2].copy_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn write_u32(&mut self, offset: usize, v: u32) {
        self.buf[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn write_u64(&mut self, offset: usize, v: u64) {
        self.buf[offset..offset + 8].copy_from_slice(&v.to_le_bytes());
    }
}

/// Abort on a broken arena invariant. These are bugs, not runtime conditions.
pub(crate) fn assert_true(cond: bool, msg: &str) {
    if !cond {
        fatal(msg);
    }
}

fn fatal(msg: &str) -> ! {
    log::error!("Assert failed: {}", msg);
    panic!("Assert failed: {}", msg);
}
