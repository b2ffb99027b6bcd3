#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ Cache<K, V>                                                      │
//! │                                                                  │
//! │   KeyedHashSet<EntryKey>        find an entry by key     O(1)    │
//! │   EntryArena<Entry>             own entries, stable ids          │
//! │   head ◀──▶ ... ◀──▶ tail       recency order            O(1)    │
//! │                                                                  │
//! │   CacheConfig                   maximum_capacity, threshold      │
//! │   LruCacheMetrics               hits, misses, eviction passes    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Keyed Hash Set
//!
//! [`KeyedHashSet`] is an open-addressing table for elements that carry their own
//! key and precomputed hash. Removal shifts later members of the probe run back
//! instead of leaving tombstones.
//!
//! ```rust
//! use keyed_cache::{KeyedElement, KeyedHashSet};
//!
//! #[derive(Debug)]
//! struct Route {
//!     path: &'static str,
//!     hash: u64,
//!     handler: u32,
//! }
//!
//! impl KeyedElement for Route {
//!     type Key = &'static str;
//!     fn key(&self) -> &&'static str {
//!         &self.path
//!     }
//!     fn key_hash(&self) -> u64 {
//!         self.hash
//!     }
//!     fn compare(&self, other: &Self) -> bool {
//!         self.path == other.path
//!     }
//! }
//!
//! let mut routes = KeyedHashSet::new(4);
//! routes.add(Route { path: "/", hash: 11, handler: 1 });
//! routes.add(Route { path: "/health", hash: 29, handler: 2 });
//!
//! assert_eq!(routes.get_by_key(29, &"/health").map(|r| r.handler), Some(2));
//! assert!(routes.remove_by_key(11, &"/").is_some());
//! assert_eq!(routes.len(), 1);
//! ```
//!
//! ## Cache
//!
//! ```rust
//! use keyed_cache::Cache;
//! use core::num::NonZeroUsize;
//!
//! let mut cache = Cache::new(NonZeroUsize::new(2).unwrap());
//! cache.add_entry("a", 1);
//! cache.add_entry("b", 2);
//! cache.get_entry("a");            // "a" becomes the head
//! assert_eq!(*cache.tail().unwrap().key(), "b");
//! ```
//!
//! ## Modules
//!
//! - [`keyed_hash_set`]: Open-addressing hash set of keyed elements
//! - [`cache`]: The bounded LRU cache
//! - [`entry`]: Borrowed views of cache entries
//! - [`config`]: Cache configuration
//! - [`error`]: Error types
//! - [`metrics`]: Metrics collection for cache performance monitoring
//! - [`concurrent`]: Mutex-guarded shared cache (requires `concurrent` feature)

#![no_std]

#[cfg(any(feature = "std", not(feature = "hashbrown"), test))]
extern crate std;

#[cfg(test)]
extern crate scoped_threadpool;

/// Open-addressing hash set of keyed elements.
///
/// Elements supply their own key and hash. Collisions are resolved by linear
/// probing and removal compacts the probe run, so the table never holds
/// tombstones.
pub mod keyed_hash_set;

/// Slot arena that owns the cache entries.
///
/// Entries are addressed by stable ids, which lets the hash table and the
/// recency list both refer to an entry without sharing ownership of it.
pub(crate) mod arena;

/// Cache entry views.
///
/// Provides [`EntryRef`] and [`EntryMut`], the borrowed handles through which
/// callers read and update individual entries.
pub mod entry;

/// Bounded LRU cache implementation.
///
/// Provides a cache that lets its size overshoot a bound by a configurable
/// fraction and then evicts the least recently used entries in one pass.
pub mod cache;

/// Cache configuration.
pub mod config;

/// Error types.
pub mod error;

/// Cache metrics system.
///
/// Provides counters for hits, misses, insertions and evictions, reported as a
/// `BTreeMap` through the [`CacheMetrics`](metrics::CacheMetrics) trait.
pub mod metrics;

/// Shared cache wrapper.
///
/// Provides [`SharedCache`](concurrent::SharedCache), a cache behind a single
/// `parking_lot::Mutex`.
///
/// Available when the `concurrent` feature is enabled.
#[cfg(feature = "concurrent")]
pub mod concurrent;

pub use cache::Cache;
pub use config::CacheConfig;
pub use entry::{EntryMut, EntryRef};
pub use error::{ConfigError, InvariantError};
pub use keyed_hash_set::{KeyedElement, KeyedHashSet, MINIMUM_SIZE};

#[cfg(feature = "concurrent")]
pub use concurrent::SharedCache;
