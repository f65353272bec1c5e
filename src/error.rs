//! Error types for the lrukit library.
//!
//! ## Key Components
//!
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (`check_invariants` methods).
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (e.g. zero shards, total capacity overflow).
//!
//! Cache misses are never errors; lookups return `Option`.
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::builder::CacheBuilder;
//! use lrukit::error::ConfigError;
//! use lrukit::policy::sharded_lru::ShardedLruCache;
//!
//! let cache: Result<ShardedLruCache<String>, ConfigError> =
//!     CacheBuilder::new(64).shards(4).try_build_sharded();
//! assert!(cache.is_ok());
//!
//! let bad = CacheBuilder::new(64).shards(0).try_build_sharded::<String>();
//! assert!(bad.is_err());
//! ```

use thiserror::Error;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by `check_invariants` methods on cache types
/// (e.g. [`LruCore::check_invariants`](crate::policy::lru::LruCore::check_invariants)).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
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

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`CacheBuilder::try_build_sharded`](crate::builder::CacheBuilder::try_build_sharded).
///
/// # Example
///
/// ```
/// use lrukit::builder::CacheBuilder;
///
/// let err = CacheBuilder::new(8).shards(0).try_build_sharded::<u64>().unwrap_err();
/// assert!(err.to_string().contains("shard"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
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

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("heap index mismatch");
        assert_eq!(err.to_string(), "heap index mismatch");
    }

    #[test]
    fn invariant_message_accessor() {
        let err = InvariantError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn invariant_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InvariantError>();
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("shard count must be > 0");
        assert_eq!(err.to_string(), "shard count must be > 0");
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(b.message(), "x");
    }

    #[test]
    fn config_implements_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<ConfigError>();
    }
}
