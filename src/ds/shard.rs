//! Deterministic key-to-shard mapping.
//!
//! Used by [`ShardedLruCache`](crate::policy::sharded_lru::ShardedLruCache)
//! to route every key to exactly one shard.
//!
//! ## Architecture
//!
//! ```text
//!   "user:123"
//!       │
//!       ▼
//!   ┌──────────────────────────────────────────┐
//!   │ ShardSelector { shards: 4, seed: 42 }    │
//!   │                                          │
//!   │  1. FxHasher::with_seed(42)              │
//!   │  2. key.hash(&mut hasher)                │
//!   │  3. hasher.finish() % 4                  │
//!   └──────────────────────────────────────────┘
//!       │
//!       ▼
//!   ┌─────────┬─────────┬─────────┬─────────┐
//!   │ Shard 0 │ Shard 1 │ Shard 2 │ Shard 3 │
//!   └─────────┴─────────┴─────────┴─────────┘
//! ```
//!
//! FxHash is not cryptographic; shard choice only needs to be fast and
//! spread keys evenly.
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::ds::ShardSelector;
//!
//! let selector = ShardSelector::new(4, 0);
//! let shard = selector.shard_for_key("user:123");
//! assert!(shard < 4);
//! assert_eq!(selector.shard_for_key("user:123"), shard);
//! ```

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// Deterministic shard selector using a seeded FxHash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector for `shards` shards with the given `seed`.
    ///
    /// The shard count is clamped to at least 1.
    ///
    /// ```
    /// use lrukit::ds::ShardSelector;
    ///
    /// assert_eq!(ShardSelector::new(16, 0).shard_count(), 16);
    /// assert_eq!(ShardSelector::new(0, 0).shard_count(), 1);
    /// ```
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Maps a key to a shard index in `[0, shards)`.
    pub fn shard_for_key<K: Hash + ?Sized>(&self, key: &K) -> usize {
        let mut hasher = FxHasher::with_seed(self.seed as usize);
        key.hash(&mut hasher);
        (hasher.finish() % self.shards as u64) as usize
    }
}

impl Default for ShardSelector {
    /// Creates a single-shard selector with seed 0.
    fn default() -> Self {
        Self::new(1, 0)
    }
}
