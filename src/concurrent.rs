//! Shared Cache
//!
//! [`Cache`] does no locking of its own. [`SharedCache`] is the external lock for
//! callers that need one: a single `parking_lot::Mutex` around a whole cache.
//!
//! ## Trade-offs
//!
//! - Every lookup that promotes an entry mutates the recency list, so reads take
//!   the lock exclusively just like writes.
//! - There is one global LRU order and one eviction bound. All threads contend on
//!   the same lock.
//!
//! Entry views borrow the cache, so they can't leave the lock. Work with entries
//! inside [`SharedCache::with`]; the convenience methods hand out cloned values.
//!
//! # Example
//!
//! ```rust
//! use keyed_cache::concurrent::SharedCache;
//! use keyed_cache::Cache;
//! use core::num::NonZeroUsize;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache = Arc::new(SharedCache::new(Cache::new(NonZeroUsize::new(100).unwrap())));
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let cache = Arc::clone(&cache);
//!         thread::spawn(move || {
//!             for i in 0..50 {
//!                 cache.put(format!("key-{}-{}", t, i), i);
//!             }
//!         })
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert!(cache.len() <= 125);
//! ```

extern crate alloc;

use crate::cache::Cache;
use crate::config::CacheConfig;
use crate::metrics::CacheMetrics;
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use parking_lot::Mutex;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// A [`Cache`] behind a `parking_lot::Mutex`.
///
/// `SharedCache` is `Send + Sync` whenever the keys, values and hasher are `Send`,
/// and can be shared through an `Arc`.
pub struct SharedCache<K, V, S = DefaultHashBuilder> {
    inner: Mutex<Cache<K, V, S>>,
}

impl<K: Hash + Eq, V> SharedCache<K, V> {
    /// Creates a shared cache from a configuration with an optional hasher.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid.
    pub fn init(config: CacheConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        Self::new(Cache::init(config, hasher))
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> SharedCache<K, V, S> {
    /// Wraps an existing cache.
    pub fn new(cache: Cache<K, V, S>) -> Self {
        Self {
            inner: Mutex::new(cache),
        }
    }

    /// Runs `f` with exclusive access to the cache.
    ///
    /// ```rust
    /// use keyed_cache::concurrent::SharedCache;
    /// use keyed_cache::Cache;
    /// use core::num::NonZeroUsize;
    ///
    /// let cache = SharedCache::new(Cache::new(NonZeroUsize::new(8).unwrap()));
    /// cache.put("a", 1);
    /// let stamped = cache.with(|cache| {
    ///     let mut entry = cache.get_entry("a")?;
    ///     entry.set_timestamp(7);
    ///     Some(entry.timestamp())
    /// });
    /// assert_eq!(stamped, Some(7));
    /// ```
    pub fn with<R>(&self, f: impl FnOnce(&mut Cache<K, V, S>) -> R) -> R {
        let mut cache = self.inner.lock();
        f(&mut cache)
    }

    /// Inserts or updates `key` and makes it the most recently used entry.
    pub fn put(&self, key: K, value: V)
    where
        K: Clone,
    {
        self.inner.lock().add_entry(key, value);
    }

    /// Returns a clone of the value under `key`, promoting its entry.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Returns a clone of the value under `key` without promoting it.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.inner
            .lock()
            .peek_entry(key)
            .map(|entry| entry.cached_value().clone())
    }

    /// Discards the entry for `key`, returning its value.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.lock().remove(key)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Drops every entry. The cache stays usable.
    pub fn discard_all(&self) {
        self.inner.lock().discard_all();
    }

    /// Unwraps the cache.
    pub fn into_inner(self) -> Cache<K, V, S> {
        self.inner.into_inner()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> CacheMetrics for SharedCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.inner.lock().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        "LRU"
    }
}

impl<K: Eq, V, S> fmt::Debug for SharedCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(cache) => f.debug_struct("SharedCache").field("cache", &*cache).finish(),
            None => f.debug_struct("SharedCache").field("cache", &"<locked>").finish(),
        }
    }
}
