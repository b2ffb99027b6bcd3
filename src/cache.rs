//! Bounded LRU Cache with Batched Eviction
//!
//! This module provides [`Cache`], a recency-ordered cache built on
//! [`KeyedHashSet`]. Every entry is reachable by key through the hash table and sits
//! in a doubly linked recency list threaded through the entries themselves, so
//! promoting an entry to most recently used is O(1) wherever it currently is.
//!
//! # Algorithm
//!
//! Inserting or promoting an entry moves it to the head of the list. The tail is
//! always the least recently used entry.
//!
//! Eviction is batched. The cache may grow past `maximum_capacity` by up to
//! `maximum_capacity × threshold` entries without evicting anything. The insert
//! that pushes the overshoot beyond that allowance pays for a single pass that
//! discards entries from the tail until the cache is back at exactly
//! `maximum_capacity`.
//!
//! ```text
//!   maximum_capacity = 4, threshold = 0.25
//!
//!   add A B C D E     head ─▶ E D C B A ◀─ tail      5 entries, overshoot 1, allowed
//!   add F             head ─▶ F E D C B A ◀─ tail    overshoot 2 > 1: evict 2
//!                     head ─▶ F E D C ◀─ tail        back at 4
//! ```
//!
//! # Performance Characteristics
//!
//! - add_entry / get_entry / discard: O(1) average
//! - eviction: O(evicted), amortized O(1) per insert
//! - table growth: O(n), amortized O(1) per insert
//!
//! # Thread Safety
//!
//! The cache performs no internal locking. Share it between threads behind a lock
//! of the caller's choosing, such as `Mutex<Cache<K, V>>` or the
//! `SharedCache` wrapper of the `concurrent` feature.
//!
//! # Disposal
//!
//! [`Cache::dispose`] drops every entry along with the backing storage and leaves the
//! cache in a terminal state. Any later call on it panics with
//! `"cache used after dispose"`. Use [`Cache::discard_all`] to empty a cache that
//! will be used again.

extern crate alloc;

use crate::arena::{EntryArena, EntryId};
use crate::config::CacheConfig;
use crate::entry::{Entry, EntryKey, EntryMut, EntryRef};
use crate::error::{ConfigError, InvariantError};
use crate::keyed_hash_set::KeyedHashSet;
use crate::metrics::{CacheMetrics, LruCacheMetrics};
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// Backing storage of a live cache: the keyed index, the entry arena and the
/// ends of the recency list.
pub(crate) struct Storage<K, V> {
    pub(crate) table: KeyedHashSet<EntryKey<K>>,
    pub(crate) entries: EntryArena<Entry<K, V>>,
    pub(crate) head: Option<EntryId>,
    pub(crate) tail: Option<EntryId>,
}

impl<K: Eq, V> Storage<K, V> {
    fn new(initial_capacity: usize) -> Self {
        Storage {
            table: KeyedHashSet::with_replace(initial_capacity, false),
            entries: EntryArena::with_capacity(initial_capacity),
            head: None,
            tail: None,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.table.len()
    }

    fn find<Q>(&self, hash: u64, key: &Q) -> Option<EntryId>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.table.get_by_key(hash, key).map(|record| record.id)
    }

    /// Creates an entry and indexes it. The entry is not linked into the list yet.
    fn insert(&mut self, key: K, hash: u64, value: V, timestamp: u64) -> EntryId
    where
        K: Clone,
    {
        let record_key = key.clone();
        let id = self
            .entries
            .insert(Entry::new(key, hash, value, timestamp));
        self.table.add(EntryKey {
            key: record_key,
            hash,
            id,
        });
        id
    }

    /// Splices `id` out of the list. A no-op for an entry that is not linked.
    fn unlink(&mut self, id: EntryId) {
        let (previous, next) = {
            let entry = &self.entries[id];
            (entry.previous, entry.next)
        };
        match previous {
            Some(previous) => self.entries[previous].next = next,
            None if self.head == Some(id) => self.head = next,
            None => {}
        }
        match next {
            Some(next) => self.entries[next].previous = previous,
            None if self.tail == Some(id) => self.tail = previous,
            None => {}
        }
        let entry = &mut self.entries[id];
        entry.previous = None;
        entry.next = None;
    }

    /// Links an unlinked entry in front of the current head.
    fn make_head(&mut self, id: EntryId) {
        let old_head = self.head;
        {
            let entry = &mut self.entries[id];
            entry.previous = None;
            entry.next = old_head;
        }
        if let Some(old_head) = old_head {
            self.entries[old_head].previous = Some(id);
        }
        self.head = Some(id);
        if self.tail.is_none() {
            self.tail = Some(id);
        }
    }

    fn promote(&mut self, id: EntryId) {
        if self.head != Some(id) {
            self.unlink(id);
            self.make_head(id);
        }
    }

    /// Unlinks the entry, drops its table record and frees its arena slot.
    pub(crate) fn discard(&mut self, id: EntryId) -> Entry<K, V> {
        self.unlink(id);
        let entry = &self.entries[id];
        self.table.remove_by_key(entry.hash, &entry.key);
        match self.entries.remove(id) {
            Some(entry) => entry,
            None => panic!("vacant entry slot"),
        }
    }

    fn clear(&mut self) {
        self.table.clear();
        self.entries.clear();
        self.head = None;
        self.tail = None;
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        self.table.check_invariants()?;
        if self.entries.len() != self.table.len() {
            return Err(InvariantError::new(format!(
                "{} entries but {} table records",
                self.entries.len(),
                self.table.len()
            )));
        }
        for record in self.table.iter() {
            match self.entries.get(record.id) {
                Some(entry) if entry.key == record.key && entry.hash == record.hash => {}
                _ => {
                    return Err(InvariantError::new(
                        "table record does not match its entry",
                    ))
                }
            }
        }

        let mut walked = 0;
        let mut previous = None;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let Some(entry) = self.entries.get(id) else {
                return Err(InvariantError::new("recency list links a vacant slot"));
            };
            if entry.previous != previous {
                return Err(InvariantError::new(format!(
                    "broken back link after {} entries",
                    walked
                )));
            }
            walked += 1;
            if walked > self.entries.len() {
                return Err(InvariantError::new("recency list contains a cycle"));
            }
            previous = Some(id);
            cursor = entry.next;
        }
        if previous != self.tail {
            return Err(InvariantError::new("walk from head does not end at tail"));
        }
        if walked != self.table.len() {
            return Err(InvariantError::new(format!(
                "recency list holds {} entries, table holds {}",
                walked,
                self.table.len()
            )));
        }
        Ok(())
    }
}

#[track_caller]
fn live<K, V>(storage: &Option<Storage<K, V>>) -> &Storage<K, V> {
    match storage {
        Some(storage) => storage,
        None => panic!("cache used after dispose"),
    }
}

#[track_caller]
fn live_mut<K, V>(storage: &mut Option<Storage<K, V>>) -> &mut Storage<K, V> {
    match storage {
        Some(storage) => storage,
        None => panic!("cache used after dispose"),
    }
}

/// A bounded, recency-ordered cache with batched eviction.
///
/// # Examples
///
/// ```
/// use keyed_cache::config::CacheConfig;
/// use keyed_cache::Cache;
/// use core::num::NonZeroUsize;
///
/// let config = CacheConfig {
///     initial_capacity: NonZeroUsize::new(4).unwrap(),
///     maximum_capacity: NonZeroUsize::new(4).unwrap(),
///     threshold: 0.25,
/// };
/// let mut cache = Cache::init(config, None);
///
/// for key in ["a", "b", "c", "d", "e"] {
///     cache.add_entry(key, key.len());
/// }
/// // one entry over the limit is within the allowance
/// assert_eq!(cache.len(), 5);
///
/// cache.add_entry("f", 1);
/// // the second one triggers a pass back down to the limit
/// assert_eq!(cache.len(), 4);
/// assert!(cache.peek_entry("a").is_none());
/// assert!(cache.peek_entry("b").is_none());
/// assert_eq!(*cache.head().unwrap().key(), "f");
/// assert_eq!(*cache.tail().unwrap().key(), "c");
/// ```
pub struct Cache<K, V, S = DefaultHashBuilder> {
    config: CacheConfig,
    storage: Option<Storage<K, V>>,
    hash_builder: S,
    metrics: LruCacheMetrics,
}

impl<K: Hash + Eq, V> Cache<K, V> {
    /// Creates a cache bounded by `maximum_capacity` with the default initial
    /// capacity and threshold.
    pub fn new(maximum_capacity: NonZeroUsize) -> Self {
        Self::init(CacheConfig::with_maximum_capacity(maximum_capacity), None)
    }

    /// Creates a cache from a configuration with an optional hasher.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid; see [`CacheConfig::validate`].
    #[track_caller]
    pub fn init(config: CacheConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        Self::with_hasher(config, hasher.unwrap_or_default())
    }

    /// Creates a cache from a configuration, reporting an invalid configuration
    /// as an error instead of panicking.
    pub fn try_init(
        config: CacheConfig,
        hasher: Option<DefaultHashBuilder>,
    ) -> Result<Self, ConfigError> {
        Self::try_with_hasher(config, hasher.unwrap_or_default())
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> Cache<K, V, S> {
    /// Creates a cache that hashes keys with `hash_builder`.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid; see [`CacheConfig::validate`].
    #[track_caller]
    pub fn with_hasher(config: CacheConfig, hash_builder: S) -> Self {
        match Self::try_with_hasher(config, hash_builder) {
            Ok(cache) => cache,
            Err(err) => panic!("invalid cache configuration: {}", err),
        }
    }

    /// Fallible form of [`Cache::with_hasher`].
    pub fn try_with_hasher(config: CacheConfig, hash_builder: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Cache {
            config,
            storage: Some(Storage::new(config.initial_capacity.get())),
            hash_builder,
            metrics: LruCacheMetrics::new(config.maximum_capacity.get() as u64),
        })
    }

    #[inline]
    fn hash_key<Q: ?Sized + Hash>(&self, key: &Q) -> u64 {
        self.hash_builder.hash_one(key)
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        live(&self.storage).len()
    }

    /// Returns `true` if the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the configuration the cache runs with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the number of entries an eviction pass trims back to.
    pub fn maximum_capacity(&self) -> usize {
        self.config.maximum_capacity.get()
    }

    /// Returns the allowed overshoot fraction.
    pub fn threshold(&self) -> f64 {
        self.config.threshold
    }

    /// Changes the eviction bound and applies it right away, so a cache that is
    /// now past its allowance is trimmed back to `maximum_capacity`.
    ///
    /// A bound below the configured initial capacity lowers the initial capacity
    /// with it, so [`config`](Cache::config) stays valid.
    ///
    /// # Panics
    ///
    /// Panics if the cache was disposed.
    pub fn set_maximum_capacity(&mut self, maximum_capacity: NonZeroUsize) {
        live_mut(&mut self.storage);
        self.config.maximum_capacity = maximum_capacity;
        self.config.initial_capacity = self.config.initial_capacity.min(maximum_capacity);
        self.metrics.core.maximum_capacity = maximum_capacity.get() as u64;
        self.evict_overshoot();
    }

    /// Inserts `value` under `key` with a zero timestamp and makes the entry the
    /// most recently used one.
    ///
    /// See [`Cache::add_entry_at`].
    pub fn add_entry(&mut self, key: K, value: V) -> EntryMut<'_, K, V>
    where
        K: Clone,
    {
        self.add_entry_at(key, value, 0)
    }

    /// Inserts `value` under `key` and makes the entry the most recently used one.
    ///
    /// An existing entry for `key` is updated in place; its previous value is
    /// dropped. If the insert pushes the cache past its overshoot allowance, the
    /// least recently used entries are evicted until `maximum_capacity` entries
    /// remain. The returned entry is never among the evicted ones.
    pub fn add_entry_at(&mut self, key: K, value: V, timestamp: u64) -> EntryMut<'_, K, V>
    where
        K: Clone,
    {
        let hash = self.hash_key(&key);
        let storage = live_mut(&mut self.storage);
        let id = match storage.find(hash, &key) {
            Some(id) => {
                let entry = &mut storage.entries[id];
                entry.cached_value = value;
                entry.timestamp = timestamp;
                self.metrics.core.record_update();
                id
            }
            None => {
                let slots = storage.table.capacity();
                let id = storage.insert(key, hash, value, timestamp);
                if storage.table.capacity() > slots {
                    self.metrics.record_table_growth();
                }
                self.metrics.core.record_insertion();
                id
            }
        };
        storage.promote(id);
        self.evict_overshoot();
        EntryMut::new(live_mut(&mut self.storage), &mut self.metrics, id)
    }

    /// Looks up `key` and promotes the entry to most recently used.
    pub fn get_entry<Q>(&mut self, key: &Q) -> Option<EntryMut<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_entry_with(key, true)
    }

    /// Looks up `key`, promoting the entry to most recently used only if `update`
    /// is `true`.
    pub fn get_entry_with<Q>(&mut self, key: &Q, update: bool) -> Option<EntryMut<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_key(key);
        let storage = live_mut(&mut self.storage);
        let Some(id) = storage.find(hash, key) else {
            self.metrics.core.record_miss();
            return None;
        };
        self.metrics.core.record_hit();
        if update {
            storage.promote(id);
        }
        Some(EntryMut::new(storage, &mut self.metrics, id))
    }

    /// Looks up `key` without touching the recency order or the metrics.
    pub fn peek_entry<Q>(&self, key: &Q) -> Option<EntryRef<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let storage = live(&self.storage);
        storage
            .find(self.hash_key(key), key)
            .map(|id| EntryRef::new(storage, id))
    }

    /// Returns the value cached under `key`, promoting its entry.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_entry(key).map(|entry| &*entry.into_value_mut())
    }

    /// Returns a mutable reference to the value cached under `key`, promoting
    /// its entry.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_entry(key).map(EntryMut::into_value_mut)
    }

    /// Returns `true` if an entry for `key` is present. Does not promote.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        live(&self.storage)
            .find(self.hash_key(key), key)
            .is_some()
    }

    /// Discards the entry for `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_key(key);
        let storage = live_mut(&mut self.storage);
        let id = storage.find(hash, key)?;
        let entry = storage.discard(id);
        self.metrics.core.record_discard();
        Some(entry.cached_value)
    }

    /// Returns the most recently used entry.
    pub fn head(&self) -> Option<EntryRef<'_, K, V>> {
        let storage = live(&self.storage);
        storage.head.map(|id| EntryRef::new(storage, id))
    }

    /// Returns the least recently used entry.
    pub fn tail(&self) -> Option<EntryRef<'_, K, V>> {
        let storage = live(&self.storage);
        storage.tail.map(|id| EntryRef::new(storage, id))
    }

    /// Iterates from the most recently used entry to the least recently used one.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let storage = live(&self.storage);
        Iter {
            current: self.head(),
            remaining: storage.len(),
        }
    }

    /// Drops every entry. The cache stays usable.
    pub fn discard_all(&mut self) {
        live_mut(&mut self.storage).clear();
        self.metrics.core.record_clear();
    }

    /// Drops every entry and the backing storage.
    ///
    /// The cache is unusable afterwards: every method except
    /// [`is_disposed`](Cache::is_disposed) panics.
    ///
    /// # Panics
    ///
    /// Panics if the cache was already disposed.
    pub fn dispose(&mut self) {
        self.discard_all();
        self.storage = None;
    }

    /// Returns `true` once [`dispose`](Cache::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.storage.is_none()
    }

    /// Returns the metrics counters of this cache.
    pub fn lru_metrics(&self) -> &LruCacheMetrics {
        &self.metrics
    }

    /// Verifies the hash table invariants and that the recency list visits every
    /// entry exactly once, from head to tail.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        live(&self.storage).check_invariants()
    }

    fn evict_overshoot(&mut self) {
        let storage = live_mut(&mut self.storage);
        let extra = storage.len().saturating_sub(self.config.maximum_capacity.get());
        if extra as f64 <= self.config.overshoot_allowance() {
            return;
        }
        let mut evicted = 0u64;
        for _ in 0..extra {
            let Some(tail) = storage.tail else { break };
            storage.discard(tail);
            self.metrics.core.record_eviction();
            evicted += 1;
        }
        self.metrics.record_eviction_pass(evicted);
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> CacheMetrics for Cache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.metrics.metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.metrics.algorithm_name()
    }
}

impl<K: Eq, V, S> fmt::Debug for Cache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Cache");
        debug.field("config", &self.config);
        match &self.storage {
            Some(storage) => debug
                .field("len", &storage.table.len())
                .field("slots", &storage.table.capacity()),
            None => debug.field("disposed", &true),
        };
        debug.finish()
    }
}

/// Iterator over cache entries from most to least recently used.
pub struct Iter<'a, K, V> {
    current: Option<EntryRef<'a, K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = EntryRef<'a, K, V>;

    fn next(&mut self) -> Option<EntryRef<'a, K, V>> {
        let entry = self.current?;
        self.current = entry.next();
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.remaining)
            .finish()
    }
}

impl<'a, K: Hash + Eq, V, S: BuildHasher> IntoIterator for &'a Cache<K, V, S> {
    type Item = EntryRef<'a, K, V>;
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;

    fn make_cache<K: Hash + Eq, V>(initial: usize, maximum: usize, threshold: f64) -> Cache<K, V> {
        let config = CacheConfig {
            initial_capacity: NonZeroUsize::new(initial).unwrap(),
            maximum_capacity: NonZeroUsize::new(maximum).unwrap(),
            threshold,
        };
        Cache::init(config, None)
    }

    fn keys_in_order<V>(cache: &Cache<&'static str, V>) -> Vec<&'static str> {
        cache.iter().map(|entry| *entry.key()).collect()
    }

    #[test]
    fn test_add_entry_makes_head() {
        let mut cache = make_cache(4, 8, 0.25);
        cache.add_entry("a", 1);
        cache.add_entry("b", 2);
        cache.add_entry("c", 3);
        assert_eq!(*cache.head().unwrap().key(), "c");
        assert_eq!(*cache.tail().unwrap().key(), "a");
        assert_eq!(keys_in_order(&cache), ["c", "b", "a"]);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_re_adding_key_updates_in_place_and_promotes() {
        let mut cache = make_cache(4, 8, 0.25);
        cache.add_entry_at("a", 1, 10);
        cache.add_entry("b", 2);
        cache.add_entry("c", 3);

        let entry = cache.add_entry_at("a", 11, 20);
        assert_eq!(*entry.cached_value(), 11);
        assert_eq!(entry.timestamp(), 20);
        assert!(entry.is_head());

        assert_eq!(cache.len(), 3);
        assert_eq!(keys_in_order(&cache), ["a", "c", "b"]);
        cache.check_invariants().unwrap();

        // re-adding from the middle of the list
        cache.add_entry("c", 33);
        assert_eq!(keys_in_order(&cache), ["c", "a", "b"]);
        // and re-adding the current head
        cache.add_entry("c", 34);
        assert_eq!(keys_in_order(&cache), ["c", "a", "b"]);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_get_entry_promotes_and_peek_does_not() {
        let mut cache = make_cache(4, 8, 0.25);
        cache.add_entry("a", 1);
        cache.add_entry("b", 2);
        cache.add_entry("c", 3);

        assert_eq!(*cache.peek_entry("a").unwrap().cached_value(), 1);
        assert_eq!(*cache.head().unwrap().key(), "c");

        let entry = cache.get_entry_with("a", false).unwrap();
        assert!(entry.is_tail());
        assert_eq!(*cache.head().unwrap().key(), "c");

        assert_eq!(*cache.get_entry("a").unwrap().key(), "a");
        assert_eq!(*cache.head().unwrap().key(), "a");
        assert_eq!(*cache.tail().unwrap().key(), "b");

        assert!(cache.get_entry("missing").is_none());
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_batched_eviction() {
        let mut cache = make_cache(4, 4, 0.25);
        for key in ["A", "B", "C", "D", "E"] {
            cache.add_entry(key, ());
        }
        assert_eq!(cache.len(), 5);
        assert_eq!(cache.lru_metrics().eviction_passes, 0);

        cache.add_entry("F", ());
        assert_eq!(cache.len(), 4);
        assert_eq!(keys_in_order(&cache), ["F", "E", "D", "C"]);
        assert!(!cache.contains_key("A"));
        assert!(!cache.contains_key("B"));
        assert_eq!(cache.lru_metrics().eviction_passes, 1);
        assert_eq!(cache.lru_metrics().largest_eviction_pass, 2);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_promotion_protects_from_eviction() {
        let mut cache = make_cache(4, 4, 0.25);
        for key in ["A", "B", "C", "D", "E"] {
            cache.add_entry(key, ());
        }
        cache.get_entry("A");
        cache.add_entry("F", ());
        assert_eq!(keys_in_order(&cache), ["F", "A", "E", "D"]);
    }

    #[test]
    fn test_zero_threshold_evicts_every_overflow() {
        let mut cache = make_cache(2, 2, 0.0);
        cache.add_entry("a", 1);
        cache.add_entry("b", 2);
        cache.add_entry("c", 3);
        assert_eq!(cache.len(), 2);
        assert_eq!(keys_in_order(&cache), ["c", "b"]);
    }

    #[test]
    fn test_capacity_bound_holds_after_every_insert() {
        let mut cache = make_cache(3, 10, 0.5);
        for i in 0..200u32 {
            cache.add_entry(i % 37, i);
            assert!(cache.len() <= 15);
            if i % 3 == 0 {
                cache.get_entry(&(i / 2 % 37));
            }
        }
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_entry_discard() {
        let mut cache = make_cache(4, 8, 0.25);
        cache.add_entry("a", 1);
        cache.add_entry("b", 2);
        cache.add_entry("c", 3);

        let value = cache.get_entry_with("b", false).unwrap().discard();
        assert_eq!(value, 2);
        assert_eq!(keys_in_order(&cache), ["c", "a"]);
        let after_head = cache.head().unwrap().next().unwrap();
        assert_eq!(after_head.previous().map(|e| *e.key()), Some("c"));

        assert_eq!(cache.get_entry_with("c", false).unwrap().discard(), 3);
        assert_eq!(cache.get_entry_with("a", false).unwrap().discard(), 1);
        assert!(cache.is_empty());
        assert!(cache.head().is_none());
        assert!(cache.tail().is_none());
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_and_get_mut() {
        let mut cache = make_cache(4, 8, 0.25);
        cache.add_entry("a".to_string(), 1);
        cache.add_entry("b".to_string(), 2);
        if let Some(v) = cache.get_mut("a") {
            *v = 10;
        }
        assert_eq!(cache.get("a"), Some(&10));
        assert_eq!(cache.remove("a"), Some(10));
        assert_eq!(cache.remove("a"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_entry_mut_setters() {
        let mut cache = make_cache(4, 8, 0.25);
        {
            let mut entry = cache.add_entry("k", String::from("v1"));
            assert_eq!(entry.set_cached_value(String::from("v2")), "v1");
            entry.cached_value_mut().push('!');
            entry.set_timestamp(42);
        }
        let entry = cache.peek_entry("k").unwrap();
        assert_eq!(entry.cached_value(), "v2!");
        assert_eq!(entry.timestamp(), 42);
        assert!(entry.is_head() && entry.is_tail());
    }

    #[test]
    fn test_growth_keeps_entries_reachable() {
        let mut cache = make_cache(2, 1000, 0.25);
        for i in 0..100u32 {
            cache.add_entry(i, i * 2);
        }
        assert!(cache.lru_metrics().table_growths > 0);
        for i in 0..100u32 {
            assert_eq!(cache.peek_entry(&i).map(|e| *e.cached_value()), Some(i * 2));
        }
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_discard_all_keeps_cache_usable() {
        let mut cache = make_cache(4, 8, 0.25);
        cache.add_entry("a", 1);
        cache.add_entry("b", 2);
        cache.discard_all();
        assert!(cache.is_empty());
        assert!(cache.head().is_none());
        assert!(!cache.is_disposed());

        cache.add_entry("c", 3);
        assert_eq!(cache.len(), 1);
        assert_eq!(*cache.head().unwrap().key(), "c");
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_set_maximum_capacity_trims() {
        let mut cache = make_cache(4, 8, 0.25);
        for i in 0..8u32 {
            cache.add_entry(i, ());
        }
        cache.set_maximum_capacity(NonZeroUsize::new(4).unwrap());
        assert_eq!(cache.len(), 4);
        assert_eq!(
            cache.iter().map(|e| *e.key()).collect::<Vec<_>>(),
            [7, 6, 5, 4]
        );
    }

    #[test]
    fn test_shrinking_below_initial_capacity_keeps_config_valid() {
        let mut cache = make_cache::<u32, u32>(50, 100, 0.25);
        for i in 0..60 {
            cache.add_entry(i, i);
        }
        cache.set_maximum_capacity(NonZeroUsize::new(2).unwrap());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.config().initial_capacity.get(), 2);
        assert!(cache.config().validate().is_ok());

        let rebuilt: Cache<u32, u32> = Cache::init(*cache.config(), None);
        assert_eq!(rebuilt.maximum_capacity(), 2);

        // growing again leaves the initial capacity alone
        cache.set_maximum_capacity(NonZeroUsize::new(10).unwrap());
        assert_eq!(cache.config().initial_capacity.get(), 2);
        assert!(cache.config().validate().is_ok());
    }

    #[test]
    fn test_set_maximum_capacity_after_dispose_changes_nothing() {
        let mut cache = make_cache::<u32, u32>(4, 8, 0.25);
        cache.dispose();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            cache.set_maximum_capacity(NonZeroUsize::new(2).unwrap());
        }));
        assert!(result.is_err());
        assert_eq!(cache.maximum_capacity(), 8);
        assert_eq!(cache.config().initial_capacity.get(), 4);
        assert_eq!(cache.lru_metrics().core.maximum_capacity, 8);
    }

    #[test]
    fn test_dispose_is_terminal() {
        let mut cache = make_cache::<u32, u32>(4, 8, 0.25);
        cache.add_entry(1, 1);
        cache.dispose();
        assert!(cache.is_disposed());
        assert!(format!("{:?}", cache).contains("disposed"));
    }

    #[test]
    #[should_panic(expected = "cache used after dispose")]
    fn test_add_after_dispose_panics() {
        let mut cache = make_cache::<u32, u32>(4, 8, 0.25);
        cache.dispose();
        cache.add_entry(1, 1);
    }

    #[test]
    #[should_panic(expected = "cache used after dispose")]
    fn test_get_after_dispose_panics() {
        let mut cache = make_cache::<u32, u32>(4, 8, 0.25);
        cache.add_entry(1, 1);
        cache.dispose();
        cache.get_entry(&1);
    }

    #[test]
    #[should_panic(expected = "cache used after dispose")]
    fn test_double_dispose_panics() {
        let mut cache = make_cache::<u32, u32>(4, 8, 0.25);
        cache.dispose();
        cache.dispose();
    }

    #[test]
    #[should_panic(expected = "invalid cache configuration")]
    fn test_init_rejects_maximum_below_initial() {
        make_cache::<u32, u32>(8, 4, 0.25);
    }

    #[test]
    #[should_panic(expected = "invalid cache configuration")]
    fn test_init_rejects_threshold_above_one() {
        make_cache::<u32, u32>(4, 4, 1.5);
    }

    #[test]
    fn test_try_init_reports_config_error() {
        let config = CacheConfig {
            initial_capacity: NonZeroUsize::new(4).unwrap(),
            maximum_capacity: NonZeroUsize::new(4).unwrap(),
            threshold: -0.5,
        };
        let err = Cache::<u32, u32>::try_init(config, None).unwrap_err();
        assert!(err.message().contains("threshold"));
    }

    #[test]
    fn test_metrics() {
        let mut cache = make_cache(4, 4, 0.25);
        for key in ["A", "B", "C", "D", "E", "F"] {
            cache.add_entry(key, ());
        }
        cache.add_entry("F", ());
        cache.get_entry("F");
        cache.get_entry("A");
        cache.remove("C");

        let metrics = cache.metrics();
        assert_eq!(metrics["insertions"], 6.0);
        assert_eq!(metrics["updates"], 1.0);
        assert_eq!(metrics["evictions"], 2.0);
        assert_eq!(metrics["cache_hits"], 1.0);
        assert_eq!(metrics["cache_misses"], 1.0);
        assert_eq!(metrics["discards"], 1.0);
        assert_eq!(metrics["entry_count"], 3.0);
        assert_eq!(cache.algorithm_name(), "LRU");
    }

    #[test]
    fn test_randomized_operations_keep_structure_consistent() {
        let mut state = 0x2545_F491_4F6C_DD1Du64;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };
        let mut cache = make_cache(3, 16, 0.25);
        for _ in 0..3000 {
            let key = (next() % 48) as u32;
            match next() % 5 {
                0 => {
                    cache.remove(&key);
                }
                1 => {
                    cache.get_entry(&key);
                }
                2 => {
                    if let Some(entry) = cache.get_entry_with(&key, false) {
                        entry.discard();
                    }
                }
                _ => {
                    let entry = cache.add_entry(key, key);
                    assert!(entry.is_head());
                    assert_eq!(*cache.head().unwrap().key(), key);
                }
            }
            assert!(cache.len() <= 20);
            cache.check_invariants().unwrap();
        }
    }
}
