//! Doubly linked recency list backed by [`SlotArena`].
//!
//! Nodes are linked by [`SlotId`] instead of references, so the list owns
//! every node exactly once and rewiring a link is an index write.
//!
//! ## Architecture
//!
//! ```text
//!   arena (SlotArena<Node<T>>)
//!   ┌────────┬─────────────────────────────────────────────┐
//!   │ SlotId │ Node { value, prev, next }                  │
//!   ├────────┼─────────────────────────────────────────────┤
//!   │ id_1   │ { value: A, prev: None, next: Some(id_2) }  │
//!   │ id_2   │ { value: B, prev: Some(id_1), next: id_3 }  │
//!   │ id_3   │ { value: C, prev: Some(id_2), next: None }  │
//!   └────────┴─────────────────────────────────────────────┘
//!
//!   head ─► [id_1] ◄──► [id_2] ◄──► [id_3] ◄── tail
//!          coldest                  warmest
//! ```
//!
//! New nodes enter at the tail and promotion moves a node to the tail, so
//! the head is always the least recently touched node.
//!
//! ## Operations
//! - `push_back`: O(1), new node becomes warmest
//! - `move_to_back`: O(1), detach + attach at tail
//! - `remove`: O(1), detach + free slot
//! - `iter`: O(n), coldest to warmest
//!
//! A link that points at a freed slot is a structural bug; the list panics
//! instead of continuing with a corrupted chain.

use rustc_hash::FxHashSet;

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Recency-ordered list of `T`, coldest at the head and warmest at the tail.
#[derive(Debug)]
pub struct RecencyList<T> {
    arena: SlotArena<Node<T>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<T> RecencyList<T> {
    pub fn new() -> Self {
        Self {
            arena: SlotArena::new(),
            head: None,
            tail: None,
        }
    }

    /// Creates an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.arena.contains(id)
    }

    /// Coldest value.
    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|id| self.get(id))
    }

    pub fn front_id(&self) -> Option<SlotId> {
        self.head
    }

    /// Warmest value.
    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|id| self.get(id))
    }

    pub fn back_id(&self) -> Option<SlotId> {
        self.tail
    }

    /// Returns `true` if `id` is the warmest node.
    #[inline]
    pub fn is_back(&self, id: SlotId) -> bool {
        self.tail == Some(id)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arena.get(id).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.arena.get_mut(id).map(|node| &mut node.value)
    }

    /// Iterates values from coldest to warmest.
    pub fn iter(&self) -> RecencyIter<'_, T> {
        RecencyIter {
            list: self,
            current: self.head,
            remaining: self.len(),
        }
    }

    /// Appends a new warmest node and returns its id.
    pub fn push_back(&mut self, value: T) -> SlotId {
        let id = self.arena.insert(Node {
            value,
            prev: None,
            next: None,
        });
        self.attach_back(id);
        id
    }

    /// Promotes `id` to warmest. Returns `false` if `id` is not in the list.
    ///
    /// Promoting the current tail touches no links.
    pub fn move_to_back(&mut self, id: SlotId) -> bool {
        if !self.arena.contains(id) {
            return false;
        }
        if self.is_back(id) {
            return true;
        }
        self.detach(id);
        self.attach_back(id);
        true
    }

    /// Unlinks `id` and frees its slot, returning the value.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        if !self.arena.contains(id) {
            return None;
        }
        self.detach(id);
        self.arena.remove(id).map(|node| node.value)
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = None;
        self.tail = None;
    }

    fn node_mut(&mut self, id: SlotId) -> &mut Node<T> {
        match self.arena.get_mut(id) {
            Some(node) => node,
            None => panic!("recency list link points at freed slot {}", id.index()),
        }
    }

    fn detach(&mut self, id: SlotId) {
        let (prev, next) = {
            let node = self.node_mut(id);
            (node.prev.take(), node.next.take())
        };

        match prev {
            Some(prev_id) => self.node_mut(prev_id).next = next,
            None => self.head = next,
        }
        match next {
            Some(next_id) => self.node_mut(next_id).prev = prev,
            None => self.tail = prev,
        }
    }

    fn attach_back(&mut self, id: SlotId) {
        let old_tail = self.tail;
        {
            let node = self.node_mut(id);
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail {
            Some(tail_id) => self.node_mut(tail_id).next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
    }

    /// Walks the list and checks every structural invariant.
    ///
    /// Verifies that `head.prev` and `tail.next` are empty, that each
    /// `next.prev` points back, that no node is visited twice, and that
    /// the walk reaches every live slot.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        match (self.head, self.tail) {
            (None, None) => {
                return if self.arena.is_empty() {
                    Ok(())
                } else {
                    Err(InvariantError::new(format!(
                        "list has no head but {} live nodes",
                        self.arena.len()
                    )))
                };
            },
            (Some(_), None) | (None, Some(_)) => {
                return Err(InvariantError::new("exactly one of head/tail is set"));
            },
            _ => {},
        }

        let mut seen = FxHashSet::with_capacity_and_hasher(self.len(), Default::default());
        let mut current = self.head;
        let mut prev = None;
        while let Some(id) = current {
            if !seen.insert(id) {
                return Err(InvariantError::new(format!(
                    "cycle through slot {}",
                    id.index()
                )));
            }
            let node = self.arena.get(id).ok_or_else(|| {
                InvariantError::new(format!("dangling link to slot {}", id.index()))
            })?;
            if node.prev != prev {
                return Err(InvariantError::new(format!(
                    "slot {} prev link does not point at its predecessor",
                    id.index()
                )));
            }
            if node.next.is_none() && self.tail != Some(id) {
                return Err(InvariantError::new(format!(
                    "walk ended at slot {} but tail is elsewhere",
                    id.index()
                )));
            }
            prev = Some(id);
            current = node.next;
        }

        if seen.len() != self.arena.len() {
            return Err(InvariantError::new(format!(
                "walk reached {} nodes but arena holds {}",
                seen.len(),
                self.arena.len()
            )));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("recency list invariant violated: {err}");
        }
    }
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator from coldest to warmest.
pub struct RecencyIter<'a, T> {
    list: &'a RecencyList<T>,
    current: Option<SlotId>,
    remaining: usize,
}

impl<'a, T> Iterator for RecencyIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = match self.list.arena.get(id) {
            Some(node) => node,
            None => panic!("recency list link points at freed slot {}", id.index()),
        };
        self.current = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
