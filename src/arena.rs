extern crate alloc;

use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

/// Stable handle to an [`Entry`](crate::entry::Entry) held in an [`EntryArena`].
///
/// The handle stays valid while the entry is alive, no matter how often the
/// hash table moves the record that points at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EntryId(usize);

/// Slot storage with a free list; freed slots are reused by later inserts.
#[derive(Debug)]
pub(crate) struct EntryArena<T> {
    slots: Vec<Option<T>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> EntryArena<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn insert(&mut self, value: T) -> EntryId {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.slots[idx] = Some(value);
            idx
        } else {
            self.slots.push(Some(value));
            self.slots.len() - 1
        };
        self.len += 1;
        EntryId(idx)
    }

    pub(crate) fn remove(&mut self, id: EntryId) -> Option<T> {
        let value = self.slots.get_mut(id.0)?.take()?;
        self.free_list.push(id.0);
        self.len -= 1;
        Some(value)
    }

    pub(crate) fn get(&self, id: EntryId) -> Option<&T> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: EntryId) -> Option<&mut T> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.len = 0;
    }
}

impl<T> Index<EntryId> for EntryArena<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, id: EntryId) -> &T {
        match self.get(id) {
            Some(value) => value,
            None => panic!("vacant entry slot {}", id.0),
        }
    }
}

impl<T> IndexMut<EntryId> for EntryArena<T> {
    #[track_caller]
    fn index_mut(&mut self, id: EntryId) -> &mut T {
        match self.get_mut(id) {
            Some(value) => value,
            None => panic!("vacant entry slot {}", id.0),
        }
    }
}
