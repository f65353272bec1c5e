//! lrukit: fixed-capacity LRU caches with per-entry expiry deadlines.
//!
//! - [`policy::lru`]: single engine (`LruCore`, `LruCache`)
//! - [`policy::sharded_lru`]: N engines behind a key hash
//! - [`ds`]: the arena, intrusive lists, entry pool and indexed expiry heap
//!   the engine is built from
//!
//! See `DESIGN.md` for the invariants tying the structures together.

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;
pub mod prelude;
pub mod traits;

pub use crate::ds::{
    EntryPool, ExpiryHeap, HeapSlots, IntrusiveList, ListTag, ShardSelector, SlotArena, SlotId,
};
pub use crate::policy::lru::{LruCache, LruCore};
pub use crate::policy::sharded_lru::ShardedLruCache;
