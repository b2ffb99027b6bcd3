//! Cache Metrics System
//!
//! Provides BTreeMap-based metrics reporting for the cache. Counters are plain
//! integers updated by the owning cache; reporting converts them to an ordered
//! `BTreeMap<String, f64>` through the [`CacheMetrics`] trait.
//!
//! # Why BTreeMap over HashMap?
//!
//! - **Deterministic ordering**: Metrics always appear in consistent order
//! - **Reproducible output**: Test and benchmark comparisons line up key by key
//! - **Stable serialization**: Exports have predictable key ordering
//!
//! The lookup cost is irrelevant at a dozen keys.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

pub mod lru;

pub use lru::LruCacheMetrics;

/// Counters common to every cache in this crate.
#[derive(Debug, Default, Clone)]
pub struct CoreCacheMetrics {
    /// Total number of keyed lookups made against the cache
    pub requests: u64,

    /// Number of lookups that found an entry
    pub cache_hits: u64,

    /// Number of entries created by `add_entry`
    pub insertions: u64,

    /// Number of `add_entry` calls that overwrote an existing entry
    pub updates: u64,

    /// Number of entries removed by eviction passes
    pub evictions: u64,

    /// Number of entries removed explicitly (`discard`, `remove`)
    pub discards: u64,

    /// Current number of entries
    pub entry_count: u64,

    /// Number of entries the cache trims back to
    pub maximum_capacity: u64,
}

impl CoreCacheMetrics {
    /// Creates an empty set of counters for a cache bounded by `maximum_capacity`
    pub fn new(maximum_capacity: u64) -> Self {
        Self {
            maximum_capacity,
            ..Default::default()
        }
    }

    /// Records a lookup that found its entry
    pub fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    /// Records a lookup that found nothing
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    /// Records the creation of a new entry
    pub fn record_insertion(&mut self) {
        self.insertions += 1;
        self.entry_count += 1;
    }

    /// Records an in-place overwrite of an existing entry
    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    /// Records one entry removed by an eviction pass
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
        self.entry_count -= 1;
    }

    /// Records one entry removed on request
    pub fn record_discard(&mut self) {
        self.discards += 1;
        self.entry_count -= 1;
    }

    /// Records that every entry was dropped at once
    pub fn record_clear(&mut self) {
        self.discards += self.entry_count;
        self.entry_count = 0;
    }

    /// Fraction of lookups that hit, or 0.0 before the first lookup
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Fraction of lookups that missed, or 0.0 before the first lookup
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            (self.requests - self.cache_hits) as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Current entry count relative to `maximum_capacity`.
    ///
    /// Exceeds 1.0 while the cache sits in its overshoot band.
    pub fn cache_utilization(&self) -> f64 {
        if self.maximum_capacity > 0 {
            self.entry_count as f64 / self.maximum_capacity as f64
        } else {
            0.0
        }
    }

    /// Convert core metrics to BTreeMap for reporting
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert(
            "cache_misses".to_string(),
            (self.requests - self.cache_hits) as f64,
        );
        metrics.insert("discards".to_string(), self.discards as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("updates".to_string(), self.updates as f64);

        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        metrics.insert("entry_count".to_string(), self.entry_count as f64);
        metrics.insert(
            "maximum_capacity".to_string(),
            self.maximum_capacity as f64,
        );
        metrics.insert("cache_utilization".to_string(), self.cache_utilization());

        if self.requests > 0 {
            metrics.insert(
                "eviction_rate".to_string(),
                self.evictions as f64 / self.requests as f64,
            );
        }

        metrics
    }
}

/// Uniform metrics reporting interface.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Algorithm name for identification
    fn algorithm_name(&self) -> &'static str;
}
