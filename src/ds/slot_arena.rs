//! Fixed-size slot arena with intrusive link storage.
//!
//! Every slot is allocated once, when the arena is built, and lives until the
//! arena is dropped. Slots are addressed by [`SlotId`], a plain index, so any
//! number of side structures (lists, heaps, hash indexes) can refer to the
//! same slot without aliasing references.
//!
//! ## Architecture
//!
//! ```text
//!   slots: Box<[Slot<T>]>   (length fixed at construction)
//!   ┌────────┬──────────────────────────────────────────────┐
//!   │ SlotId │ Slot { links: { prev, next, owner }, value } │
//!   ├────────┼──────────────────────────────────────────────┤
//!   │ 0      │ { prev: None,    next: Some(1), owner: A }   │
//!   │ 1      │ { prev: Some(0), next: None,    owner: A }   │
//!   │ 2      │ { prev: None,    next: None,    owner: B }   │
//!   └────────┴──────────────────────────────────────────────┘
//! ```
//!
//! The `links` half of each slot belongs to whichever
//! [`IntrusiveList`](crate::ds::IntrusiveList) currently owns the slot; the
//! `value` half belongs to the caller.
//!
//! ## Performance
//! - `with_slots`: O(capacity), the only allocation
//! - `get` / `get_mut`: O(1)

/// Stable handle to a slot in a [`SlotArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    /// Returns the slot position inside its arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Tag naming the list that currently owns a slot's links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListTag(u8);

impl ListTag {
    pub const fn new(tag: u8) -> Self {
        Self(tag)
    }
}

/// Intrusive list links stored inline in every slot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Links {
    pub(crate) prev: Option<SlotId>,
    pub(crate) next: Option<SlotId>,
    pub(crate) owner: Option<ListTag>,
}

#[derive(Debug)]
struct Slot<T> {
    links: Links,
    value: T,
}

/// Pre-sized arena of `T` slots that never grows or shrinks.
#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Box<[Slot<T>]>,
}

impl<T> SlotArena<T> {
    /// Allocates `capacity` slots, initializing each with `init(id)`.
    pub fn with_slots(capacity: usize, mut init: impl FnMut(SlotId) -> T) -> Self {
        let slots = (0..capacity)
            .map(|idx| Slot {
                links: Links::default(),
                value: init(SlotId(idx)),
            })
            .collect();
        Self { slots }
    }

    /// Returns the number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the arena has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns `true` if `id` addresses a slot of this arena.
    pub fn contains(&self, id: SlotId) -> bool {
        id.0 < self.slots.len()
    }

    /// Returns the value stored in `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this arena.
    pub fn get(&self, id: SlotId) -> &T {
        &self.slots[id.0].value
    }

    /// Returns the value stored in `id` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this arena.
    pub fn get_mut(&mut self, id: SlotId) -> &mut T {
        &mut self.slots[id.0].value
    }

    /// Iterates over every slot in index order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(idx, slot)| (SlotId(idx), &slot.value))
    }

    pub(crate) fn links(&self, id: SlotId) -> &Links {
        &self.slots[id.0].links
    }

    pub(crate) fn links_mut(&mut self, id: SlotId) -> &mut Links {
        &mut self.slots[id.0].links
    }
}
