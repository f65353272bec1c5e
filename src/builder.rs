//! Cache builder for single and sharded LRU caches.
//!
//! Collects capacity, shard count, grace period and shard hash seed in one
//! place, then produces either a single [`LruCache`] or a
//! [`ShardedLruCache`].
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use lrukit::builder::CacheBuilder;
//!
//! let cache = CacheBuilder::new(100)
//!     .grace_period(Duration::from_secs(5))
//!     .build::<String>();
//! cache.set("a", "hello".to_string(), None);
//! assert_eq!(cache.get("a").as_deref(), Some("hello"));
//!
//! // 8 shards of 100 slots each.
//! let sharded = CacheBuilder::new(100).shards(8).build_sharded::<String>();
//! assert_eq!(sharded.capacity(), 800);
//! ```

use std::time::Duration;

use crate::error::ConfigError;
use crate::policy::lru::{LruCache, LruCore};
use crate::policy::sharded_lru::ShardedLruCache;

/// Builder for creating cache instances.
///
/// `capacity` is the slot count of each engine: the whole cache for
/// [`build`](Self::build), each shard for the sharded builds.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    capacity: usize,
    shards: usize,
    grace_period: Duration,
    seed: u64,
    key_capacity: usize,
}

impl CacheBuilder {
    /// Create a new cache builder with the specified per-engine capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            shards: 1,
            grace_period: Duration::ZERO,
            seed: 0,
            key_capacity: 0,
        }
    }

    /// Number of shards for [`build_sharded`](Self::build_sharded).
    pub fn shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    /// How long past its deadline an entry survives `get_not_stale`.
    pub fn grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = grace;
        self
    }

    /// Seed for the key-to-shard hash.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Bytes of key storage each slot reserves at construction.
    ///
    /// Keys up to this length are stored without allocating. Longer keys grow
    /// their slot's buffer on first use only.
    pub fn key_capacity(mut self, bytes: usize) -> Self {
        self.key_capacity = bytes;
        self
    }

    fn core<V>(&self) -> LruCore<V> {
        let mut core = LruCore::with_key_capacity(self.capacity, self.key_capacity);
        core.set_expire_grace_period(self.grace_period);
        core
    }

    /// Build a single-engine cache. The shard count and seed are ignored.
    pub fn build<V>(self) -> LruCache<V> {
        LruCache::from_core(self.core())
    }

    /// Build a sharded cache, clamping a zero shard count to 1.
    pub fn build_sharded<V>(self) -> ShardedLruCache<V> {
        ShardedLruCache::from_cores(self.shards, self.seed, || self.core())
    }

    /// Build a sharded cache, rejecting configurations that
    /// [`build_sharded`](Self::build_sharded) would silently adjust.
    ///
    /// # Errors
    ///
    /// - zero shards
    /// - `capacity * shards` overflows `usize`
    ///
    /// # Example
    ///
    /// ```rust
    /// use lrukit::builder::CacheBuilder;
    ///
    /// assert!(CacheBuilder::new(16).shards(4).try_build_sharded::<u8>().is_ok());
    /// assert!(CacheBuilder::new(usize::MAX).shards(2).try_build_sharded::<u8>().is_err());
    /// ```
    pub fn try_build_sharded<V>(self) -> Result<ShardedLruCache<V>, ConfigError> {
        if self.shards == 0 {
            return Err(ConfigError::new("shard count must be > 0"));
        }
        if self.capacity.checked_mul(self.shards).is_none() {
            return Err(ConfigError::new(format!(
                "total capacity overflows: {} shards x {} slots",
                self.shards, self.capacity
            )));
        }
        Ok(self.build_sharded())
    }
}
