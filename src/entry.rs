//! Cache Entries
//!
//! An entry lives in two structures at once: the hash table, which finds it by key,
//! and the recency list, which orders it between the most recently used entry
//! (the head) and the least recently used one (the tail).
//!
//! Entries are owned by an arena inside the cache and linked to each other by
//! stable `EntryId`s. The hash table holds an `EntryKey` record per entry: a copy
//! of the key, its hash, and the id of the entry. Records may be shuffled between
//! table slots on removal and growth; the ids they carry never change.
//!
//! ```text
//!   KeyedHashSet<EntryKey>              EntryArena<Entry>
//!   ┌──────────────────────┐            ┌──────────────────────────────────┐
//!   │ slot 0: (k2, h2, #1) │──────────▶ │ #0 { k1, prev: #1,   next: None }│ ◀─ tail
//!   │ slot 1:              │            │ #1 { k2, prev: None, next: #0   }│ ◀─ head
//!   │ slot 2: (k1, h1, #0) │──────────▶ │                                  │
//!   └──────────────────────┘            └──────────────────────────────────┘
//! ```
//!
//! Callers never see ids. They get an [`EntryRef`] (shared view) or an
//! [`EntryMut`] (exclusive view), both borrowed from the cache, so an entry can't
//! be touched after it has been evicted or the cache has been modified.

use crate::arena::EntryId;
use crate::cache::Storage;
use crate::keyed_hash_set::KeyedElement;
use crate::metrics::LruCacheMetrics;
use core::fmt;
use core::mem;

/// A cached value together with its recency links.
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) hash: u64,
    pub(crate) cached_value: V,
    pub(crate) timestamp: u64,
    /// Towards the head; `None` on the head.
    pub(crate) previous: Option<EntryId>,
    /// Towards the tail; `None` on the tail.
    pub(crate) next: Option<EntryId>,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, hash: u64, cached_value: V, timestamp: u64) -> Self {
        Self {
            key,
            hash,
            cached_value,
            timestamp,
            previous: None,
            next: None,
        }
    }
}

/// The hash table's record of an entry.
#[derive(Debug, Clone)]
pub(crate) struct EntryKey<K> {
    pub(crate) key: K,
    pub(crate) hash: u64,
    pub(crate) id: EntryId,
}

impl<K: Eq> KeyedElement for EntryKey<K> {
    type Key = K;

    #[inline]
    fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    fn key_hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    fn compare(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

/// Shared view of a cache entry.
///
/// Obtained from [`Cache::head`](crate::Cache::head),
/// [`Cache::tail`](crate::Cache::tail), [`Cache::peek_entry`](crate::Cache::peek_entry)
/// or [`Cache::iter`](crate::Cache::iter). Reading through an `EntryRef` never
/// changes the recency order.
///
/// # Examples
///
/// ```
/// use keyed_cache::Cache;
/// use core::num::NonZeroUsize;
///
/// let mut cache = Cache::new(NonZeroUsize::new(8).unwrap());
/// cache.add_entry("a", 1);
/// cache.add_entry("b", 2);
///
/// let head = cache.head().unwrap();
/// assert_eq!(*head.key(), "b");
/// assert!(head.is_head());
/// assert_eq!(*head.next().unwrap().key(), "a");
/// assert!(head.next().unwrap().is_tail());
/// ```
pub struct EntryRef<'a, K, V> {
    storage: &'a Storage<K, V>,
    id: EntryId,
}

impl<'a, K, V> EntryRef<'a, K, V> {
    pub(crate) fn new(storage: &'a Storage<K, V>, id: EntryId) -> Self {
        Self { storage, id }
    }

    #[inline]
    fn entry(&self) -> &'a Entry<K, V> {
        let storage: &'a Storage<K, V> = self.storage;
        &storage.entries[self.id]
    }

    /// Returns the entry's key.
    pub fn key(&self) -> &'a K {
        &self.entry().key
    }

    /// Returns the cached value.
    pub fn cached_value(&self) -> &'a V {
        &self.entry().cached_value
    }

    /// Returns the timestamp recorded by the last `add_entry` or `set_timestamp`.
    pub fn timestamp(&self) -> u64 {
        self.entry().timestamp
    }

    /// Returns `true` if this is the most recently used entry.
    pub fn is_head(&self) -> bool {
        self.entry().previous.is_none()
    }

    /// Returns `true` if this is the least recently used entry.
    pub fn is_tail(&self) -> bool {
        self.entry().next.is_none()
    }

    /// Returns the next less recently used entry.
    pub fn next(&self) -> Option<EntryRef<'a, K, V>> {
        self.entry().next.map(|id| EntryRef::new(self.storage, id))
    }

    /// Returns the next more recently used entry.
    pub fn previous(&self) -> Option<EntryRef<'a, K, V>> {
        self.entry()
            .previous
            .map(|id| EntryRef::new(self.storage, id))
    }
}

impl<K, V> Clone for EntryRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for EntryRef<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for EntryRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryRef")
            .field("key", self.key())
            .field("cached_value", self.cached_value())
            .field("timestamp", &self.timestamp())
            .finish()
    }
}

/// Exclusive view of a cache entry.
///
/// Returned by [`Cache::add_entry`](crate::Cache::add_entry) and
/// [`Cache::get_entry`](crate::Cache::get_entry). Besides reading, it can replace the
/// value or timestamp in place and [`discard`](EntryMut::discard) the entry.
///
/// # Examples
///
/// ```
/// use keyed_cache::Cache;
/// use core::num::NonZeroUsize;
///
/// let mut cache = Cache::new(NonZeroUsize::new(8).unwrap());
/// let mut entry = cache.add_entry_at("config", 1, 100);
/// assert_eq!(entry.set_cached_value(2), 1);
/// entry.set_timestamp(200);
///
/// let entry = cache.get_entry("config").unwrap();
/// assert_eq!(*entry.cached_value(), 2);
/// assert_eq!(entry.timestamp(), 200);
/// assert_eq!(entry.discard(), 2);
/// assert!(cache.is_empty());
/// ```
pub struct EntryMut<'a, K, V> {
    storage: &'a mut Storage<K, V>,
    metrics: &'a mut LruCacheMetrics,
    id: EntryId,
}

impl<'a, K, V> EntryMut<'a, K, V> {
    pub(crate) fn new(
        storage: &'a mut Storage<K, V>,
        metrics: &'a mut LruCacheMetrics,
        id: EntryId,
    ) -> Self {
        Self {
            storage,
            metrics,
            id,
        }
    }

    #[inline]
    fn entry(&self) -> &Entry<K, V> {
        &self.storage.entries[self.id]
    }

    #[inline]
    fn entry_mut(&mut self) -> &mut Entry<K, V> {
        &mut self.storage.entries[self.id]
    }

    /// Returns the entry's key.
    pub fn key(&self) -> &K {
        &self.entry().key
    }

    /// Returns the cached value.
    pub fn cached_value(&self) -> &V {
        &self.entry().cached_value
    }

    /// Returns a mutable reference to the cached value.
    pub fn cached_value_mut(&mut self) -> &mut V {
        &mut self.entry_mut().cached_value
    }

    /// Replaces the cached value, returning the previous one.
    pub fn set_cached_value(&mut self, value: V) -> V {
        mem::replace(&mut self.entry_mut().cached_value, value)
    }

    /// Returns the entry's timestamp.
    pub fn timestamp(&self) -> u64 {
        self.entry().timestamp
    }

    /// Replaces the entry's timestamp.
    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.entry_mut().timestamp = timestamp;
    }

    /// Returns `true` if this is the most recently used entry.
    pub fn is_head(&self) -> bool {
        self.entry().previous.is_none()
    }

    /// Returns `true` if this is the least recently used entry.
    pub fn is_tail(&self) -> bool {
        self.entry().next.is_none()
    }

    /// Converts into a mutable reference to the value that lives as long as the
    /// borrow of the cache.
    pub fn into_value_mut(self) -> &'a mut V {
        let EntryMut { storage, id, .. } = self;
        &mut storage.entries[id].cached_value
    }

    /// Downgrades to a shared view.
    pub fn into_ref(self) -> EntryRef<'a, K, V> {
        let EntryMut { storage, id, .. } = self;
        EntryRef::new(storage, id)
    }
}

impl<K: Eq, V> EntryMut<'_, K, V> {
    /// Removes the entry from the cache and returns its value.
    pub fn discard(self) -> V {
        let entry = self.storage.discard(self.id);
        self.metrics.core.record_discard();
        entry.cached_value
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for EntryMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryMut")
            .field("key", self.key())
            .field("cached_value", self.cached_value())
            .field("timestamp", &self.timestamp())
            .finish()
    }
}
