//! # LRU Cache with Expiry Deadlines
//!
//! Fixed-capacity cache that evicts least-recently-used entries and tracks an
//! optional expiry deadline per entry. All entry storage is allocated when the
//! cache is built; steady-state operations reuse slots instead of allocating.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                            LruCache<V>                                   │
//!   │                                                                          │
//!   │   ┌────────────────────────────────────────────────────────────────────┐ │
//!   │   │                    parking_lot::Mutex<LruCore<V>>                  │ │
//!   │   └────────────────────────────────────────────────────────────────────┘ │
//!   │                                  │                                       │
//!   │                                  ▼                                       │
//!   │   ┌────────────────────────────────────────────────────────────────────┐ │
//!   │   │                           LruCore<V>                               │ │
//!   │   │                                                                    │ │
//!   │   │   index: HashTable<SlotId>   (keys read back from the slot)        │ │
//!   │   │                                                                    │ │
//!   │   │   pool: EntryPool<Entry<V>>                                        │ │
//!   │   │     used: head (MRU) ─► [a] ◄──► [c] ◄──► [b] ◄── tail (LRU)       │ │
//!   │   │     free: head       ─► [ ] ◄──► [ ]                               │ │
//!   │   │                                                                    │ │
//!   │   │   heap: ExpiryHeap      (used entries with a deadline)             │ │
//!   │   │              [b: t+1]                                              │ │
//!   │   │             /        \                                             │ │
//!   │   │       [a: t+3]      [c: t+2]                                       │ │
//!   │   └────────────────────────────────────────────────────────────────────┘ │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every slot owns a reusable `String` key buffer. The index stores only
//! slot handles and compares against that buffer, so a slot that is recycled
//! for a new key of no greater length performs no allocation at all.
//!
//! Each entry is linked into the recency list, the index and (if it has a
//! deadline) the heap at the same time. Every public `LruCache` method holds
//! the one mutex for its whole duration, so no caller ever sees the three
//! structures disagree.
//!
//! ## Victim Selection
//!
//! ```text
//!   set(new_key) with no free slot:
//!
//!     1. heap min has expire < now ?  ──yes──►  evict heap min
//!                │
//!                no
//!                ▼
//!     2. evict used-list tail (least recently used)
//! ```
//!
//! An expired entry is never worth keeping, so it goes before any live one
//! regardless of recency.
//!
//! ## Operations
//!
//! | Method                  | Complexity           | Notes                                  |
//! |-------------------------|----------------------|----------------------------------------|
//! | `set` / `set_at`        | O(1), O(log n) w/ TTL| insert or overwrite                    |
//! | `get`                   | O(1)                 | moves to MRU, ignores expiry           |
//! | `get_quiet`             | O(1)                 | no recency change                      |
//! | `get_not_stale[_at]`    | O(1), O(log n) purge | expired is a miss                      |
//! | `get_stale[_at]`        | O(1)                 | returns `(value, expired)`             |
//! | `remove`                | O(1), O(log n) w/ TTL|                                        |
//! | `clear`                 | O(n log n)           | returns number evicted                 |
//! | `expire[_at]`           | O(k log n)           | evicts entries with `expire < now`     |
//! | `len` / `capacity`      | O(1)                 | lock-guarded on `LruCache`             |
//!
//! ## Grace Period
//!
//! `get_not_stale_at` treats an expired entry as a miss. It also purges the
//! entry when `now - expire` exceeds the grace period, or always when the
//! grace period is zero. Within the grace window the entry stays where it is
//! (no recency refresh) until a later lookup, `expire`, or eviction drops it.
//!
//! ## Example Usage
//!
//! ```
//! use std::time::{Duration, Instant};
//! use lrukit::policy::lru::LruCache;
//!
//! let cache: LruCache<String> = LruCache::new(2);
//! let now = Instant::now();
//!
//! cache.set("a", "alpha".to_string(), Some(now + Duration::from_secs(60)));
//! cache.set("b", "beta".to_string(), None);
//! assert_eq!(cache.get("a").as_deref(), Some("alpha"));
//!
//! // "b" is now least recently used and makes room for "c".
//! cache.set("c", "gamma".to_string(), None);
//! assert!(cache.get("b").is_none());
//! assert_eq!(cache.len(), 2);
//! ```
//!
//! ## Thread Safety
//!
//! - `LruCore`: **NOT thread-safe**, `&mut self` API for single-owner use
//! - `LruCache`: **Thread-safe** via `parking_lot::Mutex`
//!
//! Neither type is `Clone`. Share an `LruCache` through `Arc<LruCache<V>>`.

use std::fmt;
use std::hash::BuildHasher;
use std::time::{Duration, Instant};

use hashbrown::HashTable;
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;
use tracing::{debug, trace};

use crate::ds::{EntryPool, ExpiryHeap, HeapSlots, SlotId};
use crate::error::InvariantError;

/// One cache slot. A free slot has an empty key, no value, and no deadline.
///
/// `key` keeps its capacity across reuse.
#[derive(Debug)]
struct Entry<V> {
    key: String,
    value: Option<V>,
    expire: Option<Instant>,
    heap_index: Option<usize>,
}

impl<V> Entry<V> {
    fn vacant(key_capacity: usize) -> Self {
        Self {
            key: String::with_capacity(key_capacity),
            value: None,
            expire: None,
            heap_index: None,
        }
    }

    #[inline]
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expire, Some(expire) if expire < now)
    }
}

impl<V> HeapSlots for EntryPool<Entry<V>> {
    // Only entries with a deadline enter the heap, so `None` never competes.
    type Key = Option<Instant>;

    fn heap_key(&self, id: SlotId) -> Self::Key {
        self.get(id).expire
    }

    fn heap_index(&self, id: SlotId) -> Option<usize> {
        self.get(id).heap_index
    }

    fn set_heap_index(&mut self, id: SlotId, index: Option<usize>) {
        self.get_mut(id).heap_index = index;
    }
}

/// Single-owner LRU cache core with expiry tracking.
///
/// Holds the entry pool, the expiry heap and the key index. Methods take
/// `&mut self`; wrap in [`LruCache`] for shared use across threads.
pub struct LruCore<V> {
    pool: EntryPool<Entry<V>>,
    heap: ExpiryHeap,
    index: HashTable<SlotId>,
    expire_grace_period: Duration,
}

#[inline]
fn hash_key(key: &str) -> u64 {
    FxBuildHasher.hash_one(key)
}

impl<V> LruCore<V> {
    /// Creates a core with `capacity` pre-allocated slots.
    ///
    /// A capacity of 0 creates a cache that stores nothing: every `set` is a
    /// no-op and every lookup misses.
    pub fn new(capacity: usize) -> Self {
        Self::with_key_capacity(capacity, 0)
    }

    /// Creates a core whose slots each reserve `key_capacity` bytes of key
    /// storage up front.
    ///
    /// Keys no longer than `key_capacity` never allocate. Longer keys grow
    /// their slot's buffer once, and the slot keeps that capacity.
    pub fn with_key_capacity(capacity: usize, key_capacity: usize) -> Self {
        debug!(capacity, key_capacity, "allocating lru core");
        Self {
            pool: EntryPool::new(capacity, |_| Entry::vacant(key_capacity)),
            heap: ExpiryHeap::with_capacity(capacity),
            // Twice the slot count keeps tombstone cleanup an in-place rehash.
            index: HashTable::with_capacity(capacity.saturating_mul(2)),
            expire_grace_period: Duration::ZERO,
        }
    }

    /// Creates a core whose stale lookups tolerate entries up to `grace`
    /// past their deadline.
    pub fn with_grace_period(capacity: usize, grace: Duration) -> Self {
        let mut core = Self::new(capacity);
        core.expire_grace_period = grace;
        core
    }

    /// Number of used entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.pool.used_len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixed number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn expire_grace_period(&self) -> Duration {
        self.expire_grace_period
    }

    /// Sets how long past its deadline an entry survives `get_not_stale`.
    ///
    /// `Duration::ZERO` purges expired entries on first stale lookup.
    pub fn set_expire_grace_period(&mut self, grace: Duration) {
        self.expire_grace_period = grace;
    }

    /// Returns `true` if `key` is cached. Does not touch recency.
    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Inserts or overwrites `key`, sampling the clock only if an expired
    /// victim has to be identified.
    pub fn set(&mut self, key: &str, value: V, expire: Option<Instant>) {
        self.set_inner(key, value, expire, None);
    }

    /// Inserts or overwrites `key`, using `now` to decide whether the
    /// earliest deadline has already passed.
    pub fn set_at(&mut self, key: &str, value: V, expire: Option<Instant>, now: Instant) {
        self.set_inner(key, value, expire, Some(now));
    }

    fn set_inner(&mut self, key: &str, value: V, expire: Option<Instant>, mut now: Option<Instant>) {
        if let Some(id) = self.lookup(key) {
            self.update_entry(id, value, expire);
            return;
        }

        if self.pool.free_len() == 0 {
            let victim = match self.expired_entry(&mut now) {
                Some(id) => {
                    trace!(slot = id.index(), "evicting expired entry");
                    id
                },
                None => match self.pool.least_recent() {
                    Some(id) => {
                        trace!(slot = id.index(), "evicting least recently used entry");
                        id
                    },
                    None => return,
                },
            };
            self.remove_entry(victim);
        }

        let Some(id) = self.pool.acquire() else {
            return;
        };
        self.insert_entry(id, key, value, expire);
    }

    /// Gets a value and marks it most recently used. Expiry is not checked.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let id = self.lookup(key)?;
        self.pool.touch(id);
        self.pool.get(id).value.as_ref()
    }

    /// Gets a value without changing its recency.
    pub fn get_quiet(&self, key: &str) -> Option<&V> {
        let id = self.lookup(key)?;
        self.pool.get(id).value.as_ref()
    }

    /// Gets a value that has not expired as of now.
    pub fn get_not_stale(&mut self, key: &str) -> Option<&V> {
        self.get_not_stale_at(key, Instant::now())
    }

    /// Gets a value that has not expired as of `now`.
    ///
    /// An expired entry is a miss. It is also removed when it expired more
    /// than the grace period ago, or when no grace period is configured.
    pub fn get_not_stale_at(&mut self, key: &str, now: Instant) -> Option<&V> {
        let id = self.lookup(key)?;
        if let Some(expire) = self.pool.get(id).expire {
            if expire < now {
                let overdue = now.duration_since(expire);
                let grace = self.expire_grace_period;
                if grace.is_zero() || overdue > grace {
                    trace!(slot = id.index(), ?overdue, "purging stale entry");
                    self.remove_entry(id);
                }
                return None;
            }
        }
        self.pool.touch(id);
        self.pool.get(id).value.as_ref()
    }

    /// Gets a possibly stale value and whether it has expired as of now.
    pub fn get_stale(&mut self, key: &str) -> Option<(&V, bool)> {
        self.get_stale_at(key, Instant::now())
    }

    /// Gets a possibly stale value and whether it expired before `now`.
    ///
    /// Marks the entry most recently used. Never removes anything.
    pub fn get_stale_at(&mut self, key: &str, now: Instant) -> Option<(&V, bool)> {
        let id = self.lookup(key)?;
        self.pool.touch(id);
        let entry = self.pool.get(id);
        let expired = entry.is_expired(now);
        entry.value.as_ref().map(|value| (value, expired))
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let id = self.lookup(key)?;
        self.remove_entry(id)
    }

    /// Evicts every entry and returns how many were evicted.
    pub fn clear(&mut self) -> usize {
        let timed = self.heap.len();
        while let Some(id) = self.heap.peek() {
            self.remove_entry(id);
        }
        let untimed = self.pool.used_len();
        while let Some(id) = self.pool.least_recent() {
            self.remove_entry(id);
        }
        debug!(timed, untimed, "cleared lru core");
        timed + untimed
    }

    /// Evicts every entry that expired before now.
    pub fn expire(&mut self) -> usize {
        self.expire_at(Instant::now())
    }

    /// Evicts every entry whose deadline is before `now`.
    pub fn expire_at(&mut self, now: Instant) -> usize {
        let mut now = Some(now);
        let mut evicted = 0;
        while let Some(id) = self.expired_entry(&mut now) {
            self.remove_entry(id);
            evicted += 1;
        }
        if evicted > 0 {
            debug!(evicted, "expired entries");
        }
        evicted
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.pool
            .iter_used()
            .map(|id| self.pool.get(id).key.as_str())
    }

    /// Finds the used slot bound to `key`.
    fn lookup(&self, key: &str) -> Option<SlotId> {
        self.index
            .find(hash_key(key), |&id| self.pool.get(id).key == key)
            .copied()
    }

    /// Returns the heap minimum if its deadline is before `now`.
    ///
    /// `now` is filled in from the clock on first use.
    fn expired_entry(&self, now: &mut Option<Instant>) -> Option<SlotId> {
        let id = self.heap.peek()?;
        let now = *now.get_or_insert_with(Instant::now);
        self.pool.get(id).is_expired(now).then_some(id)
    }

    /// Unlinks a used entry from the heap, the used list and the index, and
    /// hands back its value. The key buffer is emptied, not freed.
    fn remove_entry(&mut self, id: SlotId) -> Option<V> {
        debug_assert!(self.pool.is_used(id), "removing a free entry");
        let hash = hash_key(&self.pool.get(id).key);
        if let Ok(slot) = self.index.find_entry(hash, |&other| other == id) {
            slot.remove();
        }
        if let Some(heap_index) = self.pool.get(id).heap_index {
            self.heap.remove(&mut self.pool, heap_index);
        }
        self.pool.release(id);

        let entry = self.pool.get_mut(id);
        entry.key.clear();
        entry.expire = None;
        entry.value.take()
    }

    /// Binds a freshly acquired slot to `key` and links it into the heap and
    /// the index.
    fn insert_entry(&mut self, id: SlotId, key: &str, value: V, expire: Option<Instant>) {
        let entry = self.pool.get_mut(id);
        entry.key.push_str(key);
        entry.value = Some(value);
        entry.expire = expire;
        if expire.is_some() {
            self.heap.push(&mut self.pool, id);
        }
        let pool = &self.pool;
        self.index
            .insert_unique(hash_key(key), id, |&other| hash_key(&pool.get(other).key));
    }

    /// Overwrites a used entry in place and marks it most recently used.
    fn update_entry(&mut self, id: SlotId, value: V, expire: Option<Instant>) {
        if let Some(heap_index) = self.pool.get(id).heap_index {
            self.heap.remove(&mut self.pool, heap_index);
        }
        let entry = self.pool.get_mut(id);
        entry.value = Some(value);
        entry.expire = expire;
        if expire.is_some() {
            self.heap.push(&mut self.pool, id);
        }
        self.pool.touch(id);
    }

    /// Verifies the pool, heap and index agree with each other.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.pool.check_invariants()?;
        self.heap.check_invariants(&self.pool)?;

        if self.index.len() != self.pool.used_len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys, used list holds {}",
                self.index.len(),
                self.pool.used_len()
            )));
        }

        let mut timed = 0usize;
        for id in self.pool.iter_used() {
            let entry = self.pool.get(id);
            let key = entry.key.as_str();
            if self.lookup(key) != Some(id) {
                return Err(InvariantError::new(format!(
                    "index does not map {key:?} to slot {}",
                    id.index()
                )));
            }
            if entry.value.is_none() {
                return Err(InvariantError::new(format!("{key:?} has no value")));
            }
            match (entry.expire, entry.heap_index) {
                (Some(_), Some(index)) if self.heap.get(index) == Some(id) => timed += 1,
                (None, None) => {},
                (expire, heap_index) => {
                    return Err(InvariantError::new(format!(
                        "{key:?}: expire={expire:?} heap_index={heap_index:?} disagree with heap"
                    )));
                },
            }
        }
        if timed != self.heap.len() {
            return Err(InvariantError::new(format!(
                "heap holds {} entries, {} used entries carry a deadline",
                self.heap.len(),
                timed
            )));
        }

        for id in self.pool.iter_free() {
            let entry = self.pool.get(id);
            if !entry.key.is_empty() || entry.value.is_some() || entry.heap_index.is_some() {
                return Err(InvariantError::new(format!(
                    "free slot {} still holds data",
                    id.index()
                )));
            }
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("{err}");
        }
    }
}

impl<V> fmt::Debug for LruCore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCore")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("timed", &self.heap.len())
            .field("expire_grace_period", &self.expire_grace_period)
            .finish()
    }
}

/// Thread-safe LRU cache with expiry, guarded by one `parking_lot::Mutex`.
///
/// Returned values are clones; no handle to internal storage escapes.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
/// use lrukit::policy::lru::LruCache;
///
/// let cache = Arc::new(LruCache::<u64>::new(128));
/// let handles: Vec<_> = (0..4)
///     .map(|t| {
///         let cache = Arc::clone(&cache);
///         thread::spawn(move || cache.set(&format!("k{t}"), t, None))
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// assert_eq!(cache.len(), 4);
/// ```
pub struct LruCache<V> {
    inner: Mutex<LruCore<V>>,
}

impl<V> LruCache<V> {
    /// Creates a cache with `capacity` pre-allocated slots.
    pub fn new(capacity: usize) -> Self {
        Self::from_core(LruCore::new(capacity))
    }

    /// Creates a cache with a grace period for stale lookups.
    pub fn with_grace_period(capacity: usize, grace: Duration) -> Self {
        Self::from_core(LruCore::with_grace_period(capacity, grace))
    }

    pub fn from_core(core: LruCore<V>) -> Self {
        Self {
            inner: Mutex::new(core),
        }
    }

    /// Consumes the cache and returns the unsynchronized core.
    pub fn into_inner(self) -> LruCore<V> {
        self.inner.into_inner()
    }

    pub fn set(&self, key: &str, value: V, expire: Option<Instant>) {
        self.inner.lock().set(key, value, expire);
    }

    pub fn set_at(&self, key: &str, value: V, expire: Option<Instant>, now: Instant) {
        self.inner.lock().set_at(key, value, expire, now);
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        self.inner.lock().remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().contains(key)
    }

    pub fn clear(&self) -> usize {
        self.inner.lock().clear()
    }

    pub fn expire(&self) -> usize {
        self.expire_at(Instant::now())
    }

    pub fn expire_at(&self, now: Instant) -> usize {
        self.inner.lock().expire_at(now)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn expire_grace_period(&self) -> Duration {
        self.inner.lock().expire_grace_period()
    }

    pub fn set_expire_grace_period(&self, grace: Duration) {
        self.inner.lock().set_expire_grace_period(grace);
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }
}

impl<V: Clone> LruCache<V> {
    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    pub fn get_quiet(&self, key: &str) -> Option<V> {
        self.inner.lock().get_quiet(key).cloned()
    }

    pub fn get_not_stale(&self, key: &str) -> Option<V> {
        self.get_not_stale_at(key, Instant::now())
    }

    pub fn get_not_stale_at(&self, key: &str, now: Instant) -> Option<V> {
        self.inner.lock().get_not_stale_at(key, now).cloned()
    }

    pub fn get_stale(&self, key: &str) -> Option<(V, bool)> {
        self.get_stale_at(key, Instant::now())
    }

    pub fn get_stale_at(&self, key: &str, now: Instant) -> Option<(V, bool)> {
        self.inner
            .lock()
            .get_stale_at(key, now)
            .map(|(value, expired)| (value.clone(), expired))
    }
}

impl<V> From<LruCore<V>> for LruCache<V> {
    fn from(core: LruCore<V>) -> Self {
        Self::from_core(core)
    }
}

impl<V> fmt::Debug for LruCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(core) => f.debug_tuple("LruCache").field(&*core).finish(),
            None => f.write_str("LruCache { <locked> }"),
        }
    }
}
