//! Intrusive doubly linked list over a `SlotArena`.
//!
//! The list itself is only a header (`head`, `tail`, `len`, `tag`). The
//! `prev`/`next` links live inside the arena slots, so several lists can
//! share one arena and a slot can move between them without allocating.
//! The `tag` records which list owns a slot.
//!
//! ## Architecture
//!
//! ```text
//!   arena (SlotArena<T>)
//!   ┌────────┬───────────────────────────────────────────┐
//!   │ SlotId │ links                                     │
//!   ├────────┼───────────────────────────────────────────┤
//!   │ id_1   │ { prev: None,       next: Some(id_2) }    │
//!   │ id_2   │ { prev: Some(id_1), next: Some(id_3) }    │
//!   │ id_3   │ { prev: Some(id_2), next: None }          │
//!   └────────┴───────────────────────────────────────────┘
//!
//!   head ─► [id_1] ◄──► [id_2] ◄──► [id_3] ◄── tail
//! ```
//!
//! ## Operations
//! - `move_to_front(id)`: detach + attach to head
//! - `remove(id)`: detach and clear the slot's links
//!
//! ## Performance
//! - `push_front` / `push_back`: O(1)
//! - `pop_front` / `pop_back`: O(1)
//! - `remove` / `move_to_front`: O(1)
//! - `iter`: O(n)
//!
//! `debug_validate_invariants()` is available in debug/test builds.

use crate::ds::slot_arena::{Links, ListTag, SlotArena, SlotId};
use crate::error::InvariantError;

/// List header whose nodes are slots of an external [`SlotArena`].
#[derive(Debug)]
pub struct IntrusiveList {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
    tag: ListTag,
}

impl IntrusiveList {
    /// Creates an empty list identified by `tag`.
    pub const fn new(tag: ListTag) -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
            tag,
        }
    }

    /// Returns the number of nodes in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the tag this list stamps onto its nodes.
    pub fn tag(&self) -> ListTag {
        self.tag
    }

    /// Returns the SlotId at the front of the list.
    pub fn front(&self) -> Option<SlotId> {
        self.head
    }

    /// Returns the SlotId at the back of the list.
    pub fn back(&self) -> Option<SlotId> {
        self.tail
    }

    /// Returns `true` if `id` is currently linked into this list.
    pub fn contains<T>(&self, arena: &SlotArena<T>, id: SlotId) -> bool {
        arena.contains(id) && arena.links(id).owner == Some(self.tag)
    }

    /// Links a detached slot at the front.
    pub fn push_front<T>(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        debug_assert_eq!(arena.links(id).owner, None, "slot already linked");
        let old_head = self.head;
        *arena.links_mut(id) = Links {
            prev: None,
            next: old_head,
            owner: Some(self.tag),
        };
        match old_head {
            Some(head) => arena.links_mut(head).prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.len += 1;
    }

    /// Links a detached slot at the back.
    pub fn push_back<T>(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        debug_assert_eq!(arena.links(id).owner, None, "slot already linked");
        let old_tail = self.tail;
        *arena.links_mut(id) = Links {
            prev: old_tail,
            next: None,
            owner: Some(self.tag),
        };
        match old_tail {
            Some(tail) => arena.links_mut(tail).next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
    }

    /// Unlinks `id`; returns `false` if it does not belong to this list.
    pub fn remove<T>(&mut self, arena: &mut SlotArena<T>, id: SlotId) -> bool {
        if !self.contains(arena, id) {
            return false;
        }
        self.detach(arena, id);
        true
    }

    /// Unlinks and returns the front slot.
    pub fn pop_front<T>(&mut self, arena: &mut SlotArena<T>) -> Option<SlotId> {
        let id = self.head?;
        self.detach(arena, id);
        Some(id)
    }

    /// Unlinks and returns the back slot.
    pub fn pop_back<T>(&mut self, arena: &mut SlotArena<T>) -> Option<SlotId> {
        let id = self.tail?;
        self.detach(arena, id);
        Some(id)
    }

    /// Moves a linked slot to the front; returns `false` if not in this list.
    pub fn move_to_front<T>(&mut self, arena: &mut SlotArena<T>, id: SlotId) -> bool {
        if !self.contains(arena, id) {
            return false;
        }
        if self.head != Some(id) {
            self.detach(arena, id);
            self.push_front(arena, id);
        }
        true
    }

    /// Returns an iterator of SlotIds from front to back.
    pub fn iter<'a, T>(&self, arena: &'a SlotArena<T>) -> IntrusiveListIter<'a, T> {
        IntrusiveListIter {
            arena,
            current: self.head,
            remaining: self.len,
        }
    }

    fn detach<T>(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        let Links { prev, next, .. } = *arena.links(id);

        match prev {
            Some(prev_id) => arena.links_mut(prev_id).next = next,
            None => self.head = next,
        }
        match next {
            Some(next_id) => arena.links_mut(next_id).prev = prev,
            None => self.tail = prev,
        }

        *arena.links_mut(id) = Links::default();
        self.len -= 1;
    }

    /// Walks the list and checks link symmetry, ownership tags and length.
    pub fn check_invariants<T>(&self, arena: &SlotArena<T>) -> Result<(), InvariantError> {
        if self.head.is_none() || self.tail.is_none() {
            if self.head.is_some() || self.tail.is_some() || self.len != 0 {
                return Err(InvariantError::new(format!(
                    "list {:?}: inconsistent empty state (head={:?}, tail={:?}, len={})",
                    self.tag, self.head, self.tail, self.len
                )));
            }
            return Ok(());
        }

        let mut count = 0usize;
        let mut prev = None;
        let mut current = self.head;
        while let Some(id) = current {
            if count >= self.len {
                return Err(InvariantError::new(format!(
                    "list {:?}: walk exceeds recorded len {}",
                    self.tag, self.len
                )));
            }
            let links = arena.links(id);
            if links.owner != Some(self.tag) {
                return Err(InvariantError::new(format!(
                    "list {:?}: slot {} owned by {:?}",
                    self.tag,
                    id.index(),
                    links.owner
                )));
            }
            if links.prev != prev {
                return Err(InvariantError::new(format!(
                    "list {:?}: slot {} prev link broken",
                    self.tag,
                    id.index()
                )));
            }
            if links.next.is_none() && self.tail != Some(id) {
                return Err(InvariantError::new(format!(
                    "list {:?}: tail mismatch at slot {}",
                    self.tag,
                    id.index()
                )));
            }
            prev = Some(id);
            current = links.next;
            count += 1;
        }

        if count != self.len {
            return Err(InvariantError::new(format!(
                "list {:?}: walked {} nodes, len is {}",
                self.tag, count, self.len
            )));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants<T>(&self, arena: &SlotArena<T>) {
        if let Err(err) = self.check_invariants(arena) {
            panic!("{err}");
        }
    }
}

/// Iterator over SlotIds from front to back.
pub struct IntrusiveListIter<'a, T> {
    arena: &'a SlotArena<T>,
    current: Option<SlotId>,
    remaining: usize,
}

impl<T> Iterator for IntrusiveListIter<'_, T> {
    type Item = SlotId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.arena.links(id).next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ListTag = ListTag::new(0);
    const B: ListTag = ListTag::new(1);

    fn arena(n: usize) -> SlotArena<usize> {
        SlotArena::with_slots(n, |id| id.index())
    }

    fn order(list: &IntrusiveList, arena: &SlotArena<usize>) -> Vec<usize> {
        list.iter(arena).map(|id| *arena.get(id)).collect()
    }

    #[test]
    fn intrusive_list_basic_ops() {
        let mut arena = arena(3);
        let mut list = IntrusiveList::new(A);
        list.push_front(&mut arena, SlotId(0));
        list.push_back(&mut arena, SlotId(1));
        list.push_back(&mut arena, SlotId(2));

        assert_eq!(list.front(), Some(SlotId(0)));
        assert_eq!(list.back(), Some(SlotId(2)));
        assert_eq!(list.len(), 3);

        assert!(list.move_to_front(&mut arena, SlotId(2)));
        assert_eq!(order(&list, &arena), vec![2, 0, 1]);

        assert!(list.remove(&mut arena, SlotId(0)));
        assert_eq!(list.len(), 2);

        assert_eq!(list.pop_front(&mut arena), Some(SlotId(2)));
        assert_eq!(list.pop_back(&mut arena), Some(SlotId(1)));
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        list.debug_validate_invariants(&arena);
    }

    #[test]
    fn intrusive_list_move_to_front_edges() {
        let mut arena = arena(3);
        let mut list = IntrusiveList::new(A);
        for idx in 0..3 {
            list.push_back(&mut arena, SlotId(idx));
        }

        assert!(list.move_to_front(&mut arena, SlotId(0)));
        assert_eq!(order(&list, &arena), vec![0, 1, 2]);

        assert!(list.move_to_front(&mut arena, SlotId(1)));
        assert_eq!(order(&list, &arena), vec![1, 0, 2]);

        assert!(list.move_to_front(&mut arena, SlotId(2)));
        assert_eq!(order(&list, &arena), vec![2, 1, 0]);
        assert_eq!(list.back(), Some(SlotId(0)));
        list.debug_validate_invariants(&arena);
    }

    #[test]
    fn intrusive_list_remove_clears_links() {
        let mut arena = arena(3);
        let mut list = IntrusiveList::new(A);
        for idx in 0..3 {
            list.push_back(&mut arena, SlotId(idx));
        }
        assert!(list.remove(&mut arena, SlotId(1)));
        assert_eq!(arena.links(SlotId(1)), &Links::default());
        assert_eq!(order(&list, &arena), vec![0, 2]);
        assert!(!list.remove(&mut arena, SlotId(1)));
    }

    #[test]
    fn two_lists_share_one_arena() {
        let mut arena = arena(4);
        let mut free = IntrusiveList::new(A);
        let mut used = IntrusiveList::new(B);
        for idx in 0..4 {
            free.push_back(&mut arena, SlotId(idx));
        }

        let id = free.pop_front(&mut arena).unwrap();
        used.push_front(&mut arena, id);
        assert!(used.contains(&arena, id));
        assert!(!free.contains(&arena, id));

        // A node owned by another list is left untouched.
        assert!(!free.remove(&mut arena, id));
        assert!(!free.move_to_front(&mut arena, id));

        assert_eq!(free.len() + used.len(), 4);
        free.debug_validate_invariants(&arena);
        used.debug_validate_invariants(&arena);
    }

    #[test]
    fn check_invariants_reports_foreign_owner() {
        let mut arena = arena(2);
        let mut list = IntrusiveList::new(A);
        list.push_back(&mut arena, SlotId(0));
        arena.links_mut(SlotId(0)).owner = Some(B);
        let err = list.check_invariants(&arena).unwrap_err();
        assert!(err.message().contains("owned by"));
    }

    #[test]
    fn iter_size_hint_tracks_len() {
        let mut arena = arena(3);
        let mut list = IntrusiveList::new(A);
        for idx in 0..3 {
            list.push_front(&mut arena, SlotId(idx));
        }
        let iter = list.iter(&arena);
        assert_eq!(iter.size_hint(), (3, Some(3)));
        assert_eq!(order(&list, &arena), vec![2, 1, 0]);
    }
}
