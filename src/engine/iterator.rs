//! TESSERA - Entry Iterators
//! Cursor-style iteration shared by memtable sources.

use crate::types::Entry;

/// A forward-only cursor over entries in key order.
///
/// Call `rewind()` before reading; `item()` and `next()` panic unless
/// `valid()` returns true.
pub trait EntryIterator {
    /// Position on the first entry, or become invalid if there is none.
    fn rewind(&mut self);

    /// Advance to the next entry.
    fn next(&mut self);

    /// True while positioned on an entry.
    fn valid(&self) -> bool;

    /// The current entry.
    fn item(&self) -> Entry;

    /// Release the cursor. Nothing to release for in-memory sources.
    fn close(&mut self) {}

    /// Rewind and adapt into a standard iterator.
    fn entries(mut self) -> Entries<Self>
    where
        Self: Sized,
    {
        self.rewind();
        Entries { inner: self }
    }
}

/// Standard iterator over an already rewound [`EntryIterator`].
pub struct Entries<I> {
    inner: I,
}

impl<I: EntryIterator> Iterator for Entries<I> {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        if !self.inner.valid() {
            return None;
        }
        let item = self.inner.item();
        self.inner.next();
        Some(item)
    }
}
