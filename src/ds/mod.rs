pub mod entry_pool;
pub mod expiry_heap;
pub mod intrusive_list;
pub mod shard;
pub mod slot_arena;

pub use entry_pool::EntryPool;
pub use expiry_heap::{ExpiryHeap, HeapSlots};
pub use intrusive_list::{IntrusiveList, IntrusiveListIter};
pub use shard::ShardSelector;
pub use slot_arena::{ListTag, SlotArena, SlotId};
