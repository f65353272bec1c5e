//! Indexed binary min-heap over arena slots.
//!
//! Unlike [`std::collections::BinaryHeap`], every element knows where it sits
//! in the heap. The element's position is written back through
//! [`HeapSlots::set_heap_index`] on every swap, which makes removal of an
//! arbitrary element O(log n) instead of a linear scan.
//!
//! ## Architecture
//!
//! ```text
//!   items: Vec<SlotId>          slots (HeapSlots)
//!   ┌───┬─────────┐             ┌────────┬──────────┬────────────┐
//!   │ 0 │ id_7    │ ──────────► │ id_7   │ key: 10  │ index: 0   │
//!   │ 1 │ id_2    │ ──────────► │ id_2   │ key: 14  │ index: 1   │
//!   │ 2 │ id_4    │ ──────────► │ id_4   │ key: 12  │ index: 2   │
//!   └───┴─────────┘             └────────┴──────────┴────────────┘
//! ```
//!
//! The ordering key and the back-reference both live in the slot owner; the
//! heap stores only handles. Capacity is reserved up front so `push` never
//! reallocates while `len() <= capacity()`.
//!
//! ## Operations
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | `push`    | O(log n)   |
//! | `pop`     | O(log n)   |
//! | `remove`  | O(log n)   |
//! | `peek`    | O(1)       |

use crate::ds::slot_arena::SlotId;
use crate::error::InvariantError;

/// Storage that exposes heap ordering keys and position back-references.
pub trait HeapSlots {
    type Key: Ord;

    /// Returns the ordering key of `id`.
    fn heap_key(&self, id: SlotId) -> Self::Key;

    /// Returns the position recorded for `id`.
    fn heap_index(&self, id: SlotId) -> Option<usize>;

    /// Records the position of `id`, or `None` once it leaves the heap.
    fn set_heap_index(&mut self, id: SlotId, index: Option<usize>);
}

/// Min-heap of slot handles ordered by [`HeapSlots::heap_key`].
#[derive(Debug, Default)]
pub struct ExpiryHeap {
    items: Vec<SlotId>,
}

impl ExpiryHeap {
    /// Creates an empty heap with room for `capacity` handles.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the reserved capacity.
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Returns the handle with the smallest key.
    pub fn peek(&self) -> Option<SlotId> {
        self.items.first().copied()
    }

    /// Returns the handle at heap position `index`.
    pub fn get(&self, index: usize) -> Option<SlotId> {
        self.items.get(index).copied()
    }

    /// Iterates handles in heap (not sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.items.iter().copied()
    }

    /// Inserts `id` and restores heap order.
    pub fn push<S: HeapSlots>(&mut self, slots: &mut S, id: SlotId) {
        debug_assert_eq!(slots.heap_index(id), None, "slot already in heap");
        let index = self.items.len();
        self.items.push(id);
        slots.set_heap_index(id, Some(index));
        self.sift_up(slots, index);
    }

    /// Removes and returns the handle with the smallest key.
    pub fn pop<S: HeapSlots>(&mut self, slots: &mut S) -> Option<SlotId> {
        if self.items.is_empty() {
            return None;
        }
        Some(self.remove(slots, 0))
    }

    /// Removes and returns the handle at heap position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn remove<S: HeapSlots>(&mut self, slots: &mut S, index: usize) -> SlotId {
        let last = self.items.len() - 1;
        if index != last {
            self.swap(slots, index, last);
            if !self.sift_down(slots, index, last) {
                self.sift_up(slots, index);
            }
        }
        let id = self.items[last];
        self.items.truncate(last);
        slots.set_heap_index(id, None);
        id
    }

    fn less<S: HeapSlots>(&self, slots: &S, i: usize, j: usize) -> bool {
        slots.heap_key(self.items[i]) < slots.heap_key(self.items[j])
    }

    fn swap<S: HeapSlots>(&mut self, slots: &mut S, i: usize, j: usize) {
        self.items.swap(i, j);
        slots.set_heap_index(self.items[i], Some(i));
        slots.set_heap_index(self.items[j], Some(j));
    }

    fn sift_up<S: HeapSlots>(&mut self, slots: &mut S, mut j: usize) {
        while j > 0 {
            let parent = (j - 1) / 2;
            if !self.less(slots, j, parent) {
                break;
            }
            self.swap(slots, parent, j);
            j = parent;
        }
    }

    /// Sifts `i0` down within `items[..n]`; returns `true` if it moved.
    fn sift_down<S: HeapSlots>(&mut self, slots: &mut S, i0: usize, n: usize) -> bool {
        let mut i = i0;
        loop {
            let left = 2 * i + 1;
            if left >= n {
                break;
            }
            let mut child = left;
            let right = left + 1;
            if right < n && self.less(slots, right, left) {
                child = right;
            }
            if !self.less(slots, child, i) {
                break;
            }
            self.swap(slots, i, child);
            i = child;
        }
        i > i0
    }

    /// Checks heap order and that every back-reference is current.
    pub fn check_invariants<S: HeapSlots>(&self, slots: &S) -> Result<(), InvariantError> {
        for (index, &id) in self.items.iter().enumerate() {
            if slots.heap_index(id) != Some(index) {
                return Err(InvariantError::new(format!(
                    "heap: slot {} at position {} records {:?}",
                    id.index(),
                    index,
                    slots.heap_index(id)
                )));
            }
            if index > 0 && self.less(slots, index, (index - 1) / 2) {
                return Err(InvariantError::new(format!(
                    "heap: position {index} is smaller than its parent"
                )));
            }
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants<S: HeapSlots>(&self, slots: &S) {
        if let Err(err) = self.check_invariants(slots) {
            panic!("{err}");
        }
    }
}
