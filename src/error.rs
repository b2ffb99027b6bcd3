//! Error types for the keyed cache.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned by [`Cache::try_init`](crate::Cache::try_init) when
//!   cache configuration parameters are out of range (zero capacity, a maximum
//!   smaller than the initial capacity, a threshold outside `0.0..=1.0`).
//! - [`InvariantError`]: Returned by the `check_invariants` methods when an
//!   internal structure is found in an inconsistent state. These only ever
//!   fire on a bug in this crate.
//!
//! Lookup misses are never errors: they are reported as `None`.
//!
//! ## Example Usage
//!
//! ```
//! use keyed_cache::config::CacheConfig;
//! use keyed_cache::Cache;
//! use core::num::NonZeroUsize;
//!
//! let config = CacheConfig {
//!     initial_capacity: NonZeroUsize::new(16).unwrap(),
//!     maximum_capacity: NonZeroUsize::new(8).unwrap(),
//!     threshold: 0.25,
//! };
//! let err = Cache::<u32, u32>::try_init(config, None).unwrap_err();
//! assert!(err.message().contains("maximum_capacity"));
//! ```

extern crate alloc;

use alloc::string::String;
use core::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Carries a human-readable description of which parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when an internal invariant of the table or the recency
/// list does not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvariantError {}
