//! Node storage. Nodes live in an arena and point at each other through [`NodeId`] handles,
//! so the parent back-references never become ownership edges.

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::Result;
use crate::util::Side;

/// Handle to a slot in the [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

/// A single entry of a [`Tree`][crate::Tree]: a key, its value, and the bookkeeping the tree
/// needs to stay balanced.
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,

    /// How many levels are in the subtree rooted at this node.
    /// A node with no children has a height of 1.
    pub(crate) height: usize,
    /// `height(right) - height(left)`, refreshed together with `height`.
    pub(crate) balance: isize,

    key: Box<[u8]>,
    value: Box<[u8]>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("height", &self.height)
            .field("balance", &self.balance)
            .field("value", &self.value)
            .finish()
    }
}

impl Node {
    fn new(key: Box<[u8]>, value: Box<[u8]>) -> Self {
        Self {
            parent: None,
            left: None,
            right: None,
            height: 1,
            balance: 0,
            key,
            value,
        }
    }

    /// The key this node is stored under.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// The value stored with the key. It is exactly as long as the slice given on insert.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Height of the subtree rooted at this node. Leaves have height 1.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Height of the right subtree minus height of the left subtree. See [the Wikipedia
    /// page][wiki] for more details.
    ///
    /// [wiki]: https://en.wikipedia.org/wiki/AVL_tree#Balance_factor
    pub fn balance_factor(&self) -> isize {
        self.balance
    }

    pub(crate) fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<NodeId>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    fn is_unlinked(&self) -> bool {
        self.parent.is_none() && self.left.is_none() && self.right.is_none()
    }
}

enum Slot {
    Occupied(Node),
    /// A released slot, linking to the next free slot.
    Vacant(Option<NodeId>),
}

/// Owns every node of a tree. Released slots are threaded into a free list and handed out
/// again before the slot table grows.
pub(crate) struct Arena {
    slots: Vec<Slot>,
    free: Option<NodeId>,
    len: usize,
}

impl Arena {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// Number of occupied slots.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Copies `key` and `value` into a fresh, unlinked node. Nothing is touched if any of the
    /// needed memory can't be reserved.
    pub(crate) fn allocate(&mut self, key: &[u8], value: &[u8]) -> Result<NodeId> {
        let node = Node::new(copy_payload(key)?, copy_payload(value)?);

        let id = match self.free {
            Some(id) => {
                self.free = match self.slots[id.0] {
                    Slot::Vacant(next) => next,
                    Slot::Occupied(_) => unreachable!("free list points at a live node"),
                };
                self.slots[id.0] = Slot::Occupied(node);
                id
            }
            None => {
                self.slots.try_reserve(1)?;
                self.slots.push(Slot::Occupied(node));
                NodeId(self.slots.len() - 1)
            }
        };
        self.len += 1;

        Ok(id)
    }

    /// Frees the slot behind `id` and returns the node that lived there. The node must already
    /// be detached from its parent and children.
    pub(crate) fn release(&mut self, id: NodeId) -> Node {
        debug_assert!(self[id].is_unlinked(), "releasing a linked node");

        let slot = std::mem::replace(&mut self.slots[id.0], Slot::Vacant(self.free));
        self.free = Some(id);
        self.len -= 1;

        match slot {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => unreachable!("double release of {id:?}"),
        }
    }

    /// Drops the slot table. Only for use once every node has been released or is otherwise
    /// unreachable.
    pub(crate) fn reset(&mut self) {
        self.slots = Vec::new();
        self.free = None;
        self.len = 0;
    }

    pub(crate) fn height_of(&self, id: Option<NodeId>) -> usize {
        id.map_or(0, |id| self[id].height)
    }

    /// Recomputes `height` and `balance` of `id` from its children's heights.
    pub(crate) fn fix_height(&mut self, id: NodeId) {
        let left_height = self.height_of(self[id].left);
        let right_height = self.height_of(self[id].right);

        let node = &mut self[id];
        node.height = left_height.max(right_height) + 1;
        node.balance = right_height as isize - left_height as isize;
    }

    /// The child with the taller subtree, preferring the right one on a tie.
    pub(crate) fn taller_child(&self, id: NodeId) -> Option<NodeId> {
        let node = &self[id];
        if self.height_of(node.left) > self.height_of(node.right) {
            node.left
        } else {
            node.right
        }
    }

    /// The rightmost node of the subtree rooted at `id`.
    pub(crate) fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self[id].right {
            id = right;
        }
        id
    }

    /// Points whatever held `old` at `new` instead: `parent`'s matching child slot, or `root`
    /// when `old` has no parent. Does not touch `new`'s own parent link.
    pub(crate) fn replace_child(
        &mut self,
        root: &mut Option<NodeId>,
        parent: Option<NodeId>,
        old: NodeId,
        new: Option<NodeId>,
    ) {
        match parent {
            None => *root = new,
            Some(parent) => {
                let parent = &mut self[parent];
                if parent.left == Some(old) {
                    parent.left = new;
                } else {
                    parent.right = new;
                }
            }
        }
    }
}

impl Index<NodeId> for Arena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match &self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => panic!("dangling node handle {id:?}"),
        }
    }
}

impl IndexMut<NodeId> for Arena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match &mut self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => panic!("dangling node handle {id:?}"),
        }
    }
}

/// Copies caller bytes into a buffer of exactly the same length.
fn copy_payload(bytes: &[u8]) -> Result<Box<[u8]>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(bytes.len())?;
    buf.extend_from_slice(bytes);
    Ok(buf.into_boxed_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_copies_payloads() {
        let mut arena = Arena::new();
        let mut key = vec![1, 2, 3];
        let id = arena.allocate(&key, &[9u8; 40]).unwrap();

        key[0] = 42;

        assert_eq!(arena[id].key(), &[1u8, 2, 3][..]);
        assert_eq!(arena[id].value(), &[9u8; 40][..]);
        assert_eq!(arena[id].height(), 1);
        assert_eq!(arena[id].balance_factor(), 0);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn released_slots_are_reused() {
        let mut arena = Arena::new();
        let first = arena.allocate(b"a", b"1").unwrap();
        let second = arena.allocate(b"b", b"2").unwrap();

        let node = arena.release(first);
        assert_eq!(node.key(), b"a");
        assert_eq!(arena.len(), 1);

        let third = arena.allocate(b"c", b"3").unwrap();
        assert_eq!(third, first);
        assert_eq!(arena[third].key(), b"c");
        assert_eq!(arena[second].key(), b"b");
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn fix_height_tracks_children() {
        let mut arena = Arena::new();
        let root = arena.allocate(b"b", b"").unwrap();
        let right = arena.allocate(b"c", b"").unwrap();

        arena[root].right = Some(right);
        arena[right].parent = Some(root);
        arena.fix_height(root);

        assert_eq!(arena[root].height(), 2);
        assert_eq!(arena[root].balance_factor(), 1);
        assert_eq!(arena.taller_child(root), Some(right));
        assert_eq!(arena.rightmost(root), right);
    }

    #[test]
    #[should_panic(expected = "dangling node handle")]
    fn released_handles_dangle() {
        let mut arena = Arena::new();
        let id = arena.allocate(b"a", b"1").unwrap();
        arena.release(id);

        let _ = arena[id].key();
    }
}
