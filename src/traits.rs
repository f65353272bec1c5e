//! # Cache Traits
//!
//! Shared interface for the thread-safe caches in this crate, so callers can
//! swap a single engine for a sharded one without touching call sites.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────┐
//!   │                  ExpiringCache<V>                        │
//!   │                                                          │
//!   │  set / set_at              (&, &str, V, Option<Instant>) │
//!   │  get / get_quiet           (&, &str) → Option<V>         │
//!   │  get_not_stale[_at]        (&, &str) → Option<V>         │
//!   │  get_stale[_at]            (&, &str) → Option<(V, bool)> │
//!   │  remove                    (&, &str) → Option<V>         │
//!   │  clear / expire[_at]       (&) → usize                   │
//!   │  len / capacity / is_empty (&) → usize / bool            │
//!   └─────────────────────────────┬────────────────────────────┘
//!                                 │
//!                ┌────────────────┴────────────────┐
//!                ▼                                 ▼
//!        LruCache<V>                     ShardedLruCache<V>
//!        (one mutex)                     (one mutex per shard)
//! ```
//!
//! Every method takes `&self`: implementations synchronize internally. The
//! `_at` variants take the caller's notion of "now", which keeps tests and
//! batch callers deterministic. The plain variants read [`Instant::now`].
//!
//! | Trait             | Extends       | Purpose                                   |
//! |-------------------|---------------|-------------------------------------------|
//! | `ExpiringCache`   | -             | LRU cache with per-entry expiry deadlines |
//! | `ConcurrentCache` | `Send + Sync` | Marker for caches shareable across threads|
//!
//! ## Example Usage
//!
//! ```
//! use std::time::{Duration, Instant};
//! use lrukit::traits::ExpiringCache;
//! use lrukit::policy::lru::LruCache;
//! use lrukit::policy::sharded_lru::ShardedLruCache;
//!
//! fn warm<C: ExpiringCache<String>>(cache: &C, ttl: Duration) {
//!     let expire = Some(Instant::now() + ttl);
//!     for key in ["a", "b", "c"] {
//!         cache.set(key, key.to_uppercase(), expire);
//!     }
//! }
//!
//! let single = LruCache::<String>::new(8);
//! let sharded = ShardedLruCache::<String>::new(4, 8);
//! warm(&single, Duration::from_secs(60));
//! warm(&sharded, Duration::from_secs(60));
//! assert_eq!(single.len(), 3);
//! assert_eq!(ExpiringCache::get(&sharded, "b").as_deref(), Some("B"));
//! ```

use std::time::Instant;

use crate::policy::lru::LruCache;
use crate::policy::sharded_lru::ShardedLruCache;

/// LRU cache with optional per-entry expiry deadlines.
///
/// An entry is expired once its deadline is strictly before `now`. Entries set
/// with `expire: None` never expire.
pub trait ExpiringCache<V> {
    /// Inserts or overwrites `key`.
    ///
    /// When the cache is full, an expired entry is evicted first if one
    /// exists, otherwise the least recently used entry.
    fn set(&self, key: &str, value: V, expire: Option<Instant>);

    /// Like [`set`](Self::set), with an explicit `now` for the expiry check.
    fn set_at(&self, key: &str, value: V, expire: Option<Instant>, now: Instant);

    /// Returns the value and marks it most recently used. Ignores expiry.
    fn get(&self, key: &str) -> Option<V>;

    /// Returns the value without touching recency. Ignores expiry.
    fn get_quiet(&self, key: &str) -> Option<V>;

    /// Returns the value only if it has not expired.
    fn get_not_stale(&self, key: &str) -> Option<V> {
        self.get_not_stale_at(key, Instant::now())
    }

    /// Returns the value only if it has not expired as of `now`.
    ///
    /// Expired entries past the grace period are removed.
    fn get_not_stale_at(&self, key: &str, now: Instant) -> Option<V>;

    /// Returns the value and whether it has expired.
    fn get_stale(&self, key: &str) -> Option<(V, bool)> {
        self.get_stale_at(key, Instant::now())
    }

    /// Returns the value and whether it expired before `now`. Never removes.
    fn get_stale_at(&self, key: &str, now: Instant) -> Option<(V, bool)>;

    /// Removes `key` and returns its value.
    fn remove(&self, key: &str) -> Option<V>;

    /// Evicts every entry, returning how many were evicted.
    fn clear(&self) -> usize;

    /// Evicts every expired entry.
    fn expire(&self) -> usize {
        self.expire_at(Instant::now())
    }

    /// Evicts every entry whose deadline is before `now`.
    fn expire_at(&self, now: Instant) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;
}

/// Marker trait for caches that are safe to share across threads.
///
/// ```
/// use std::sync::Arc;
/// use lrukit::traits::{ConcurrentCache, ExpiringCache};
/// use lrukit::policy::sharded_lru::ShardedLruCache;
///
/// fn share<C: ExpiringCache<u64> + ConcurrentCache + 'static>(cache: C) -> Arc<C> {
///     Arc::new(cache)
/// }
///
/// let cache = share(ShardedLruCache::<u64>::new(2, 16));
/// assert_eq!(cache.capacity(), 32);
/// ```
pub trait ConcurrentCache: Send + Sync {}

impl<V: Send> ConcurrentCache for LruCache<V> {}
impl<V: Send> ConcurrentCache for ShardedLruCache<V> {}

macro_rules! impl_expiring_cache {
    ($ty:ident) => {
        impl<V: Clone> ExpiringCache<V> for $ty<V> {
            fn set(&self, key: &str, value: V, expire: Option<Instant>) {
                $ty::set(self, key, value, expire)
            }

            fn set_at(&self, key: &str, value: V, expire: Option<Instant>, now: Instant) {
                $ty::set_at(self, key, value, expire, now)
            }

            fn get(&self, key: &str) -> Option<V> {
                $ty::get(self, key)
            }

            fn get_quiet(&self, key: &str) -> Option<V> {
                $ty::get_quiet(self, key)
            }

            fn get_not_stale_at(&self, key: &str, now: Instant) -> Option<V> {
                $ty::get_not_stale_at(self, key, now)
            }

            fn get_stale_at(&self, key: &str, now: Instant) -> Option<(V, bool)> {
                $ty::get_stale_at(self, key, now)
            }

            fn remove(&self, key: &str) -> Option<V> {
                $ty::remove(self, key)
            }

            fn clear(&self) -> usize {
                $ty::clear(self)
            }

            fn expire_at(&self, now: Instant) -> usize {
                $ty::expire_at(self, now)
            }

            fn len(&self) -> usize {
                $ty::len(self)
            }

            fn is_empty(&self) -> bool {
                $ty::is_empty(self)
            }

            fn capacity(&self) -> usize {
                $ty::capacity(self)
            }
        }
    };
}

impl_expiring_cache!(LruCache);
impl_expiring_cache!(ShardedLruCache);
