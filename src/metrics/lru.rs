//! LRU Cache Metrics
//!
//! Metrics of the batched-eviction LRU [`Cache`](crate::Cache).

extern crate alloc;

use super::{CacheMetrics, CoreCacheMetrics};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// LRU-specific metrics (extends CoreCacheMetrics)
///
/// On top of the core counters this tracks how eviction is batched and how
/// often the backing hash table had to grow.
#[derive(Debug, Clone)]
pub struct LruCacheMetrics {
    /// Core metrics common to all caches
    pub core: CoreCacheMetrics,

    /// Number of eviction passes run
    pub eviction_passes: u64,

    /// Most entries removed by a single eviction pass
    pub largest_eviction_pass: u64,

    /// Number of times the backing hash table doubled
    pub table_growths: u64,
}

impl LruCacheMetrics {
    /// Creates metrics for a cache bounded by `maximum_capacity`
    pub fn new(maximum_capacity: u64) -> Self {
        Self {
            core: CoreCacheMetrics::new(maximum_capacity),
            eviction_passes: 0,
            largest_eviction_pass: 0,
            table_growths: 0,
        }
    }

    /// Records a completed eviction pass that removed `evicted` entries
    pub fn record_eviction_pass(&mut self, evicted: u64) {
        self.eviction_passes += 1;
        self.largest_eviction_pass = self.largest_eviction_pass.max(evicted);
    }

    /// Records a doubling of the backing table
    pub fn record_table_growth(&mut self) {
        self.table_growths += 1;
    }

    /// Average number of entries removed per eviction pass
    pub fn average_eviction_pass(&self) -> f64 {
        if self.eviction_passes > 0 {
            self.core.evictions as f64 / self.eviction_passes as f64
        } else {
            0.0
        }
    }

    /// Converts LRU metrics to a BTreeMap for reporting
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();
        metrics.insert(
            "eviction_passes".to_string(),
            self.eviction_passes as f64,
        );
        metrics.insert(
            "largest_eviction_pass".to_string(),
            self.largest_eviction_pass as f64,
        );
        metrics.insert(
            "average_eviction_pass".to_string(),
            self.average_eviction_pass(),
        );
        metrics.insert("table_growths".to_string(), self.table_growths as f64);
        metrics
    }
}

impl CacheMetrics for LruCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "LRU"
    }
}
