//! Pre-allocated entry pool with free and used recency lists.
//!
//! `EntryPool` owns a [`SlotArena`] and threads two [`IntrusiveList`]s through
//! the same slot links:
//!
//! ```text
//!   used:  head (MRU) ─► [3] ◄──► [0] ◄──► [5] ◄── tail (LRU)
//!   free:  head       ─► [1] ◄──► [2] ◄──► [4] ◄── tail
//! ```
//!
//! Every slot is on exactly one of the two lists. `acquire` moves the free
//! head to the used head, `release` moves a used slot back to the free head,
//! and `touch` marks a used slot most recently used. None of these allocate.

use crate::ds::intrusive_list::{IntrusiveList, IntrusiveListIter};
use crate::ds::slot_arena::{ListTag, SlotArena, SlotId};
use crate::error::InvariantError;

const FREE: ListTag = ListTag::new(0);
const USED: ListTag = ListTag::new(1);

/// Fixed pool of `T` slots partitioned into free and used lists.
#[derive(Debug)]
pub struct EntryPool<T> {
    arena: SlotArena<T>,
    free: IntrusiveList,
    used: IntrusiveList,
}

impl<T> EntryPool<T> {
    /// Allocates `capacity` slots and places all of them on the free list.
    pub fn new(capacity: usize, init: impl FnMut(SlotId) -> T) -> Self {
        let mut arena = SlotArena::with_slots(capacity, init);
        let mut free = IntrusiveList::new(FREE);
        for idx in 0..capacity {
            free.push_back(&mut arena, SlotId(idx));
        }
        Self {
            arena,
            free,
            used: IntrusiveList::new(USED),
        }
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.arena.len()
    }

    /// Number of slots on the used list.
    pub fn used_len(&self) -> usize {
        self.used.len()
    }

    /// Number of slots on the free list.
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Takes the first free slot and makes it the most recently used one.
    pub fn acquire(&mut self) -> Option<SlotId> {
        let id = self.free.pop_front(&mut self.arena)?;
        self.used.push_front(&mut self.arena, id);
        Some(id)
    }

    /// Returns a used slot to the head of the free list.
    ///
    /// Returns `false` if `id` was not in use.
    pub fn release(&mut self, id: SlotId) -> bool {
        if !self.used.remove(&mut self.arena, id) {
            return false;
        }
        self.free.push_front(&mut self.arena, id);
        true
    }

    /// Marks a used slot most recently used.
    pub fn touch(&mut self, id: SlotId) -> bool {
        self.used.move_to_front(&mut self.arena, id)
    }

    /// Returns `true` if `id` is on the used list.
    pub fn is_used(&self, id: SlotId) -> bool {
        self.used.contains(&self.arena, id)
    }

    /// The least recently used slot.
    pub fn least_recent(&self) -> Option<SlotId> {
        self.used.back()
    }

    /// The most recently used slot.
    pub fn most_recent(&self) -> Option<SlotId> {
        self.used.front()
    }

    pub fn get(&self, id: SlotId) -> &T {
        self.arena.get(id)
    }

    pub fn get_mut(&mut self, id: SlotId) -> &mut T {
        self.arena.get_mut(id)
    }

    /// Iterates used slots from most to least recently used.
    pub fn iter_used(&self) -> IntrusiveListIter<'_, T> {
        self.used.iter(&self.arena)
    }

    /// Iterates free slots in reuse order.
    pub fn iter_free(&self) -> IntrusiveListIter<'_, T> {
        self.free.iter(&self.arena)
    }

    /// Checks both lists and that together they cover every slot.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.free.check_invariants(&self.arena)?;
        self.used.check_invariants(&self.arena)?;
        if self.free.len() + self.used.len() != self.arena.len() {
            return Err(InvariantError::new(format!(
                "pool: free ({}) + used ({}) != capacity ({})",
                self.free.len(),
                self.used.len(),
                self.arena.len()
            )));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pool_is_all_free() {
        let pool = EntryPool::new(4, |_| ());
        assert_eq!(pool.capacity(), 4);
        assert_eq!(pool.free_len(), 4);
        assert_eq!(pool.used_len(), 0);
        assert_eq!(pool.least_recent(), None);
        assert_eq!(pool.most_recent(), None);
        pool.debug_validate_invariants();
    }

    #[test]
    fn acquire_until_exhausted() {
        let mut pool = EntryPool::new(2, |_| ());
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert_ne!(a, b);
        assert_eq!(pool.acquire(), None);
        assert_eq!(pool.most_recent(), Some(b));
        assert_eq!(pool.least_recent(), Some(a));
        pool.debug_validate_invariants();
    }

    #[test]
    fn release_puts_slot_at_free_head() {
        let mut pool = EntryPool::new(3, |_| ());
        let a = pool.acquire().unwrap();
        let _b = pool.acquire().unwrap();
        assert!(pool.release(a));
        assert!(!pool.release(a));
        assert!(!pool.is_used(a));
        assert_eq!(pool.iter_free().next(), Some(a));
        // The most recently released slot is the next one handed out.
        assert_eq!(pool.acquire(), Some(a));
        pool.debug_validate_invariants();
    }

    #[test]
    fn touch_reorders_used_list() {
        let mut pool = EntryPool::new(3, |id| id.index());
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        let c = pool.acquire().unwrap();
        assert_eq!(pool.iter_used().collect::<Vec<_>>(), vec![c, b, a]);

        assert!(pool.touch(a));
        assert_eq!(pool.iter_used().collect::<Vec<_>>(), vec![a, c, b]);
        assert_eq!(pool.least_recent(), Some(b));

        pool.release(c);
        assert!(!pool.touch(c));
        pool.debug_validate_invariants();
    }

    #[test]
    fn zero_capacity_pool() {
        let mut pool: EntryPool<()> = EntryPool::new(0, |_| ());
        assert_eq!(pool.acquire(), None);
        assert_eq!(pool.least_recent(), None);
        pool.debug_validate_invariants();
    }
}
