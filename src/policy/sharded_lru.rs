//! # Sharded LRU Cache
//!
//! Splits the key space across N independent [`LruCache`] engines so threads
//! working on different keys rarely contend on the same mutex.
//!
//! ## Architecture
//!
//! ```text
//!   key ──► ShardSelector::shard_for_key(key) ──► i
//!
//!   ┌─────────────────────────────────────────────────────────────┐
//!   │ ShardedLruCache<V>                                          │
//!   │                                                             │
//!   │   shards: [LruCache<V>; N]   (each with its own Mutex)      │
//!   │   ┌──────────┐ ┌──────────┐ ┌──────────┐     ┌──────────┐   │
//!   │   │ shard 0  │ │ shard 1  │ │ shard 2  │ ... │ shard N-1│   │
//!   │   └──────────┘ └──────────┘ └──────────┘     └──────────┘   │
//!   └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every key lives in exactly one shard. Per-key operations lock only that
//! shard. Eviction is per shard: a full shard evicts its own LRU or expired
//! entry even while other shards have free slots.
//!
//! Aggregates (`len`, `capacity`, `clear`, `expire`) visit the shards one
//! after another, locking each in turn. They are not a snapshot of the whole
//! cache.
//!
//! ## Example Usage
//!
//! ```
//! use std::time::{Duration, Instant};
//! use lrukit::policy::sharded_lru::ShardedLruCache;
//!
//! let cache: ShardedLruCache<u32> = ShardedLruCache::new(4, 16);
//! assert_eq!(cache.capacity(), 64);
//!
//! cache.set("a", 1, Some(Instant::now() + Duration::from_secs(30)));
//! assert_eq!(cache.get("a"), Some(1));
//! assert_eq!(cache.shard(cache.shard_for_key("a")).unwrap().len(), 1);
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::ds::ShardSelector;
use crate::error::InvariantError;
use crate::policy::lru::{LruCache, LruCore};

/// Cache that routes each key to one of several [`LruCache`] shards.
pub struct ShardedLruCache<V> {
    shards: Box<[LruCache<V>]>,
    selector: ShardSelector,
}

impl<V> ShardedLruCache<V> {
    /// Creates `shards` engines of `per_shard_capacity` slots each.
    ///
    /// `shards` is clamped to at least 1.
    pub fn new(shards: usize, per_shard_capacity: usize) -> Self {
        Self::with_seed(shards, per_shard_capacity, 0)
    }

    /// Like [`new`](Self::new), hashing keys with `seed`.
    pub fn with_seed(shards: usize, per_shard_capacity: usize, seed: u64) -> Self {
        Self::from_cores(shards, seed, || LruCore::new(per_shard_capacity))
    }

    /// Builds `shards` engines (clamped to at least 1) from `make_core`.
    pub(crate) fn from_cores(shards: usize, seed: u64, make_core: impl FnMut() -> LruCore<V>) -> Self {
        let selector = ShardSelector::new(shards, seed);
        let shards: Box<[LruCache<V>]> = std::iter::repeat_with(make_core)
            .take(selector.shard_count())
            .map(LruCache::from_core)
            .collect();
        debug!(
            shards = shards.len(),
            per_shard_capacity = shards.first().map_or(0, LruCache::capacity),
            seed,
            "built sharded lru cache"
        );
        Self { shards, selector }
    }

    /// Builds from already-constructed engines.
    ///
    /// Returns `None` if `shards` is empty.
    pub fn from_shards(shards: Vec<LruCache<V>>, seed: u64) -> Option<Self> {
        if shards.is_empty() {
            return None;
        }
        let selector = ShardSelector::new(shards.len(), seed);
        Some(Self {
            shards: shards.into_boxed_slice(),
            selector,
        })
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Returns the shard at `index`.
    pub fn shard(&self, index: usize) -> Option<&LruCache<V>> {
        self.shards.get(index)
    }

    /// Returns the index of the shard that owns `key`.
    pub fn shard_for_key(&self, key: &str) -> usize {
        self.selector.shard_for_key(key)
    }

    #[inline]
    fn shard_of(&self, key: &str) -> &LruCache<V> {
        &self.shards[self.selector.shard_for_key(key)]
    }

    pub fn set(&self, key: &str, value: V, expire: Option<Instant>) {
        self.shard_of(key).set(key, value, expire);
    }

    pub fn set_at(&self, key: &str, value: V, expire: Option<Instant>, now: Instant) {
        self.shard_of(key).set_at(key, value, expire, now);
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        self.shard_of(key).remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.shard_of(key).contains(key)
    }

    /// Clears every shard and returns the total number of evicted entries.
    pub fn clear(&self) -> usize {
        self.shards.iter().map(LruCache::clear).sum()
    }

    pub fn expire(&self) -> usize {
        self.expire_at(Instant::now())
    }

    /// Expires every shard against the same `now`.
    pub fn expire_at(&self, now: Instant) -> usize {
        self.shards.iter().map(|shard| shard.expire_at(now)).sum()
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(LruCache::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(LruCache::is_empty)
    }

    /// Total slots across all shards.
    pub fn capacity(&self) -> usize {
        self.shards.iter().map(LruCache::capacity).sum()
    }

    /// Grace period of the first shard; all shards share one setting.
    pub fn expire_grace_period(&self) -> Duration {
        self.shards[0].expire_grace_period()
    }

    /// Applies `grace` to every shard.
    pub fn set_expire_grace_period(&self, grace: Duration) {
        for shard in self.shards.iter() {
            shard.set_expire_grace_period(grace);
        }
    }

    /// Checks every shard, prefixing failures with the shard index.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        for (index, shard) in self.shards.iter().enumerate() {
            shard
                .check_invariants()
                .map_err(|err| InvariantError::new(format!("shard {index}: {err}")))?;
        }
        Ok(())
    }
}

impl<V: Clone> ShardedLruCache<V> {
    pub fn get(&self, key: &str) -> Option<V> {
        self.shard_of(key).get(key)
    }

    pub fn get_quiet(&self, key: &str) -> Option<V> {
        self.shard_of(key).get_quiet(key)
    }

    pub fn get_not_stale(&self, key: &str) -> Option<V> {
        self.shard_of(key).get_not_stale(key)
    }

    pub fn get_not_stale_at(&self, key: &str, now: Instant) -> Option<V> {
        self.shard_of(key).get_not_stale_at(key, now)
    }

    pub fn get_stale(&self, key: &str) -> Option<(V, bool)> {
        self.shard_of(key).get_stale(key)
    }

    pub fn get_stale_at(&self, key: &str, now: Instant) -> Option<(V, bool)> {
        self.shard_of(key).get_stale_at(key, now)
    }
}

impl<V> fmt::Debug for ShardedLruCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedLruCache")
            .field("shards", &self.shards.len())
            .field("seed", &self.selector.seed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn zero_shards_clamped_to_one() {
        let cache: ShardedLruCache<u8> = ShardedLruCache::new(0, 4);
        assert_eq!(cache.shard_count(), 1);
        assert_eq!(cache.capacity(), 4);
    }

    #[test]
    fn from_shards_rejects_empty() {
        assert!(ShardedLruCache::<u8>::from_shards(Vec::new(), 0).is_none());
        let cache = ShardedLruCache::from_shards(vec![LruCache::<u8>::new(2), LruCache::new(3)], 9)
            .unwrap();
        assert_eq!(cache.capacity(), 5);
    }

    #[test]
    fn keys_route_to_one_shard() {
        let cache: ShardedLruCache<usize> = ShardedLruCache::new(4, 64);
        for i in 0..100 {
            cache.set(&format!("k{i}"), i, None);
        }
        assert_eq!(cache.len(), 100);
        for i in 0..100 {
            let key = format!("k{i}");
            let owner = cache.shard_for_key(&key);
            for index in 0..cache.shard_count() {
                let shard = cache.shard(index).unwrap();
                assert_eq!(shard.contains(&key), index == owner);
            }
        }
        cache.check_invariants().unwrap();
    }

    #[test]
    fn per_key_operations_delegate() {
        let cache: ShardedLruCache<&str> = ShardedLruCache::new(3, 4);
        let now = Instant::now() + secs(3_600);
        cache.set_at("a", "va", Some(now + secs(1)), now);
        cache.set_at("b", "vb", None, now);

        assert_eq!(cache.get("a"), Some("va"));
        assert_eq!(cache.get_quiet("b"), Some("vb"));
        assert_eq!(cache.get_stale_at("a", now + secs(2)), Some(("va", true)));
        assert_eq!(cache.get_not_stale_at("b", now + secs(2)), Some("vb"));
        assert_eq!(cache.get_not_stale_at("a", now + secs(2)), None);
        assert!(!cache.contains("a"));
        assert_eq!(cache.remove("b"), Some("vb"));
        assert!(cache.is_empty());
    }

    #[test]
    fn get_quiet_does_not_reorder_shard() {
        let cache: ShardedLruCache<u32> = ShardedLruCache::new(1, 2);
        cache.set("a", 1, None);
        cache.set("b", 2, None);
        assert_eq!(cache.get_quiet("a"), Some(1));
        cache.set("c", 3, None);
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
    }

    #[test]
    fn aggregates_sum_over_shards() {
        let cache: ShardedLruCache<u64> = ShardedLruCache::with_seed(4, 32, 11);
        let now = Instant::now() + secs(3_600);
        for i in 0..40u64 {
            let expire = if i % 2 == 0 { Some(now - secs(1)) } else { None };
            cache.set_at(&format!("k{i}"), i, expire, now);
        }
        assert_eq!(cache.len(), 40);
        assert_eq!(cache.expire_at(now), 20);
        assert_eq!(cache.len(), 20);
        assert_eq!(cache.clear(), 20);
        assert_eq!(cache.clear(), 0);
        assert_eq!(cache.capacity(), 128);
    }

    #[test]
    fn grace_period_applies_to_all_shards() {
        let cache: ShardedLruCache<u8> = ShardedLruCache::new(3, 1);
        cache.set_expire_grace_period(secs(7));
        assert_eq!(cache.expire_grace_period(), secs(7));
        for index in 0..cache.shard_count() {
            assert_eq!(cache.shard(index).unwrap().expire_grace_period(), secs(7));
        }
    }

    #[test]
    fn full_shard_evicts_locally() {
        let cache: ShardedLruCache<usize> = ShardedLruCache::new(4, 1);
        let mut same_shard = (0..).map(|i| format!("k{i}")).filter(|k| cache.shard_for_key(k) == 0);
        let first = same_shard.next().unwrap();
        let second = same_shard.next().unwrap();
        cache.set(&first, 1, None);
        cache.set(&second, 2, None);
        assert!(!cache.contains(&first));
        assert!(cache.contains(&second));
        assert_eq!(cache.len(), 1);
    }
}
