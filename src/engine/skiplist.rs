//! TESSERA - Arena Skip List
//! The ordered, concurrent key-value structure behind the memtable.
//!
//! ## Concurrency Model
//! - `insert` takes the **write lock** for the whole find-and-link sequence,
//!   including any arena growth it causes
//! - `search` and every iterator step take the **read lock**
//! - Links are arena offsets, never references, so nothing borrowed from the
//!   arena outlives a lock guard
//!
//! Nodes are never removed. A delete is an insert of an empty value.

use std::cmp::Ordering;

use parking_lot::RwLock;
use rand::Rng;

use crate::config::Config;
use crate::types::Entry;

use super::arena::{Arena, DEFAULT_GROW_STEP};
use super::codec::ValueStruct;
use super::iterator::EntryIterator;
use super::node::{calc_score, Node, MAX_HEIGHT};

/// Probability of growing a tower by one more level.
const LEVEL_PROBABILITY: f64 = 0.5;

struct Inner {
    arena: Arena,
    head: Node,
    /// Tallest tower currently linked, in `[1, MAX_HEIGHT]`.
    height: usize,
    /// Number of distinct keys.
    len: usize,
}

/// Concurrent skip list whose nodes live in a single [`Arena`].
///
/// ## Example
/// ```
/// use tessera::engine::skiplist::SkipList;
/// use tessera::types::Entry;
///
/// let list = SkipList::new(1 << 20);
/// list.insert(&Entry::new("apple", "red"));
/// list.insert(&Entry::new("apple", "green"));
///
/// assert_eq!(list.search(b"apple").unwrap().value, "green");
/// assert_eq!(list.len(), 1);
/// ```
pub struct SkipList {
    inner: RwLock<Inner>,
}

impl SkipList {
    /// Create a skip list with `arena_size` bytes preallocated.
    pub fn new(arena_size: usize) -> Self {
        Self::with_arena(Arena::with_grow_step(arena_size, DEFAULT_GROW_STEP))
    }

    /// Create a skip list sized by `config`.
    pub fn with_config(config: &Config) -> Self {
        Self::with_arena(Arena::with_grow_step(
            config.arena_size,
            config.arena_grow_step,
        ))
    }

    fn with_arena(mut arena: Arena) -> Self {
        // Sentinel head: no key, no value, full tower.
        let head = Node::new(&mut arena, &[], &ValueStruct::default(), MAX_HEIGHT);
        log::debug!(
            "Skip list created (head at offset {}, arena capacity {} bytes)",
            head.offset(),
            arena.capacity()
        );

        Self {
            inner: RwLock::new(Inner {
                arena,
                head,
                height: 1,
                len: 0,
            }),
        }
    }

    /// Insert `entry`, overwriting the value in place if the key exists.
    ///
    /// # Panics
    /// If the key is longer than `MAX_KEY_SIZE`; `MemTable::set` rejects
    /// such keys up front.
    pub fn insert(&self, entry: &Entry) {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let key = &entry.key[..];
        let score = calc_score(key);
        let value = ValueStruct::new(entry.value.clone(), entry.expires_at);

        let mut prev = [inner.head; MAX_HEIGHT];
        let mut x = inner.head;
        for level in (0..inner.height).rev() {
            loop {
                let Some(next) = inner.arena.get_node(x.next_offset(&inner.arena, level)) else {
                    break;
                };
                match next.compare(&inner.arena, score, key) {
                    Ordering::Greater => x = next,
                    Ordering::Equal => {
                        next.set_value(&mut inner.arena, &value);
                        return;
                    }
                    Ordering::Less => break,
                }
            }
            prev[level] = x;
        }

        let height = random_height();
        let node = Node::new(&mut inner.arena, key, &value, height);
        for (level, p) in prev.iter().enumerate().take(height) {
            let next = p.next_offset(&inner.arena, level);
            node.set_next_offset(&mut inner.arena, level, next);
            p.set_next_offset(&mut inner.arena, level, node.offset());
        }

        if height > inner.height {
            inner.height = height;
        }
        inner.len += 1;
    }

    /// Look up `key`. Tombstones are returned as entries with empty values.
    pub fn search(&self, key: &[u8]) -> Option<Entry> {
        let inner = self.inner.read();
        let arena = &inner.arena;
        let score = calc_score(key);

        let mut x = inner.head;
        for level in (0..inner.height).rev() {
            while let Some(next) = arena.get_node(x.next_offset(arena, level)) {
                match next.compare(arena, score, key) {
                    Ordering::Greater => x = next,
                    Ordering::Equal => return Some(entry_at(arena, next)),
                    Ordering::Less => break,
                }
            }
        }
        None
    }

    /// Create a cursor over the list. Call `rewind()` before reading.
    pub fn new_iterator(&self) -> SkipListIterator<'_> {
        SkipListIterator {
            list: self,
            cursor: Cursor::Unrewound,
        }
    }

    /// Bytes allocated from the arena.
    pub fn size(&self) -> u32 {
        self.inner.read().arena.size()
    }

    /// Number of distinct keys, tombstones included.
    pub fn len(&self) -> usize {
        self.inner.read().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tallest tower currently in use.
    pub fn height(&self) -> usize {
        self.inner.read().height
    }

    /// Length of the arena's backing buffer.
    pub fn capacity(&self) -> usize {
        self.inner.read().arena.capacity()
    }
}

fn entry_at(arena: &Arena, node: Node) -> Entry {
    let v = node.value(arena);
    Entry {
        key: bytes::Bytes::copy_from_slice(node.key(arena)),
        value: v.value,
        expires_at: v.expires_at,
        ..Default::default()
    }
}

/// Height 1, plus one level per consecutive coin flip won.
fn random_height() -> usize {
    let mut rng = rand::thread_rng();
    let mut h = 1;
    while h < MAX_HEIGHT && rng.gen_bool(LEVEL_PROBABILITY) {
        h += 1;
    }
    h
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Unrewound,
    Positioned(Node),
    Exhausted,
}

/// Forward cursor over a [`SkipList`].
///
/// The cursor holds a node offset, so the list may keep growing between
/// steps; entries inserted behind the cursor are not revisited.
pub struct SkipListIterator<'a> {
    list: &'a SkipList,
    cursor: Cursor,
}

impl SkipListIterator<'_> {
    fn positioned(&self) -> Node {
        match self.cursor {
            Cursor::Positioned(node) => node,
            other => panic!("skip list iterator used while {:?}", other),
        }
    }

    fn step(&mut self, from: Node) {
        let inner = self.list.inner.read();
        self.cursor = match inner.arena.get_node(from.next_offset(&inner.arena, 0)) {
            Some(node) => Cursor::Positioned(node),
            None => Cursor::Exhausted,
        };
    }
}

impl EntryIterator for SkipListIterator<'_> {
    fn rewind(&mut self) {
        let head = self.list.inner.read().head;
        self.step(head);
    }

    fn next(&mut self) {
        let node = self.positioned();
        self.step(node);
    }

    fn valid(&self) -> bool {
        matches!(self.cursor, Cursor::Positioned(_))
    }

    fn item(&self) -> Entry {
        let node = self.positioned();
        let inner = self.list.inner.read();
        entry_at(&inner.arena, node)
    }
}
