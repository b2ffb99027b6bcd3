//! Cache Configuration
//!
//! [`CacheConfig`] holds every sizing parameter of a [`Cache`](crate::Cache). Like the
//! other configuration structs of this crate it has public fields, so it can be
//! written out in full at the call site.
//!
//! # Sizing Guidelines
//!
//! - **`initial_capacity`**: how many entries the hash table is sized for up front.
//!   The table grows on demand, so this only saves rehashing during warm-up.
//! - **`maximum_capacity`**: the number of entries the cache returns to after an
//!   eviction pass.
//! - **`threshold`**: how far past `maximum_capacity` the cache may grow before it
//!   evicts, as a fraction of `maximum_capacity`.
//!
//! ```text
//! evict when   len - maximum_capacity  >  maximum_capacity × threshold
//! peak size =  maximum_capacity + ⌊maximum_capacity × threshold⌋
//! ```
//!
//! **Example**: `maximum_capacity = 1000`, `threshold = 0.25` lets the cache hold up
//! to 1250 entries; the insert that would make it 1251 evicts the 251 least recently
//! used entries in one pass.
//!
//! A threshold of `0.0` degenerates to classic evict-one-per-insert LRU.
//!
//! # Examples
//!
//! ```
//! use keyed_cache::config::CacheConfig;
//! use keyed_cache::Cache;
//! use core::num::NonZeroUsize;
//!
//! let config = CacheConfig {
//!     initial_capacity: NonZeroUsize::new(64).unwrap(),
//!     maximum_capacity: NonZeroUsize::new(1000).unwrap(),
//!     threshold: 0.25,
//! };
//! let cache: Cache<String, Vec<u8>> = Cache::init(config, None);
//! assert_eq!(cache.maximum_capacity(), 1000);
//! ```

use crate::error::ConfigError;
use crate::keyed_hash_set::MINIMUM_SIZE;
use core::fmt;
use core::num::NonZeroUsize;

/// Configuration for a [`Cache`](crate::Cache).
///
/// # Fields
///
/// - `initial_capacity`: Number of entries the hash table is sized for at creation.
///   Must not exceed `maximum_capacity`.
/// - `maximum_capacity`: Number of entries retained after an eviction pass.
/// - `threshold`: Allowed overshoot past `maximum_capacity`, as a fraction in
///   `0.0..=1.0`.
#[derive(Clone, Copy)]
pub struct CacheConfig {
    /// Number of entries the backing table is sized for at creation.
    pub initial_capacity: NonZeroUsize,
    /// Number of entries the cache trims back to when it evicts.
    pub maximum_capacity: NonZeroUsize,
    /// Fraction of `maximum_capacity` the cache may overshoot before evicting.
    pub threshold: f64,
}

impl CacheConfig {
    /// Threshold used when none is given explicitly.
    pub const DEFAULT_THRESHOLD: f64 = 0.25;

    /// Returns a configuration bounded by `maximum_capacity`, with an initial
    /// capacity of `min(7, maximum_capacity)` and the default threshold.
    pub fn with_maximum_capacity(maximum_capacity: NonZeroUsize) -> Self {
        let initial = maximum_capacity.get().min(MINIMUM_SIZE);
        Self {
            initial_capacity: NonZeroUsize::new(initial).unwrap_or(maximum_capacity),
            maximum_capacity,
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }

    /// Checks the parameter bounds.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `maximum_capacity < initial_capacity` or if
    /// `threshold` is not within `0.0..=1.0`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.maximum_capacity < self.initial_capacity {
            return Err(ConfigError::new(
                "maximum_capacity must be at least initial_capacity",
            ));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::new("threshold must be within 0.0..=1.0"));
        }
        Ok(())
    }

    /// Returns the number of entries past `maximum_capacity` the cache tolerates
    /// before it evicts.
    pub(crate) fn overshoot_allowance(&self) -> f64 {
        self.maximum_capacity.get() as f64 * self.threshold
    }
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("initial_capacity", &self.initial_capacity)
            .field("maximum_capacity", &self.maximum_capacity)
            .field("threshold", &self.threshold)
            .finish()
    }
}
