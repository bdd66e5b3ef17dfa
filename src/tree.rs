//! The AVL tree itself.
//!
//! # Examples
//!
//! ```
//! use avl_index::{Error, Lexicographic, Tree};
//!
//! let mut tree = Tree::new(Lexicographic);
//!
//! // Nothing in here yet.
//! assert!(tree.find(b"apple").is_none());
//!
//! tree.insert(b"apple", b"red").unwrap();
//! assert_eq!(tree.get(b"apple"), Some(&b"red"[..]));
//!
//! // Inserting an existing key keeps the first value.
//! tree.insert(b"apple", b"green").unwrap();
//! assert_eq!(tree.get(b"apple"), Some(&b"red"[..]));
//!
//! tree.remove(b"apple").unwrap();
//! assert_eq!(tree.remove(b"apple"), Err(Error::NotFound));
//! assert_eq!(tree.height(), 0);
//! ```

use std::cmp::Ordering;
use std::fmt;

use tracing::{debug, trace};

use crate::comparator::Comparator;
use crate::error::{Error, Result};
use crate::node::{Arena, Node, NodeId};
use crate::util::Side;

/// A self-balancing Binary Search Tree (specifically, an AVL tree) mapping byte keys to byte
/// values. Keys are ordered by the [`Comparator`] given at construction.
pub struct Tree<C> {
    nodes: Arena,
    root: Option<NodeId>,
    comparator: C,
}

impl<C> fmt::Debug for Tree<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("len", &self.len())
            .field("height", &self.height())
            .field("root", &self.root())
            .finish()
    }
}

impl<C> Tree<C> {
    /// Generate a new, empty `Tree` ordered by `comparator`. No node storage is allocated
    /// until the first insert.
    pub fn new(comparator: C) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            comparator,
        }
    }

    /// Like [`Tree::new`] but reserves room for `capacity` nodes' bookkeeping up front. The
    /// key and value buffers are still allocated per insert.
    pub fn with_capacity(comparator: C, capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            comparator,
        }
    }

    /// Builds a tree from a comparator that may be missing.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when `comparator` is `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::{Error, Lexicographic, Tree};
    ///
    /// assert!(Tree::create(Some(Lexicographic)).is_ok());
    /// assert!(matches!(
    ///     Tree::<Lexicographic>::create(None),
    ///     Err(Error::InvalidArgument(_))
    /// ));
    /// ```
    pub fn create(comparator: Option<C>) -> Result<Self> {
        comparator
            .map(Self::new)
            .ok_or(Error::InvalidArgument("a comparator is required"))
    }

    /// Height of the tree: 0 when empty, otherwise the number of nodes on the longest path
    /// from the root down to a leaf.
    pub fn height(&self) -> usize {
        self.nodes.height_of(self.root)
    }

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no key is stored.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The node at the top of the tree, if any.
    pub fn root(&self) -> Option<&Node> {
        self.root.map(|id| &self.nodes[id])
    }

    /// Releases every node, leaving an empty tree that can be used again.
    ///
    /// Nodes are released children first, each one only after it has been detached from its
    /// parent.
    pub fn clear(&mut self) {
        let mut released = 0usize;
        let mut cursor = self.root.take();

        while let Some(id) = cursor {
            let node = &self.nodes[id];
            if let Some(child) = node.left.or(node.right) {
                cursor = Some(child);
                continue;
            }

            let parent = self.nodes[id].parent.take();
            if let Some(parent) = parent {
                let parent = &mut self.nodes[parent];
                if parent.left == Some(id) {
                    parent.left = None;
                } else {
                    parent.right = None;
                }
            }
            self.nodes.release(id);
            released += 1;
            cursor = parent;
        }

        debug_assert_eq!(self.nodes.len(), 0);
        self.nodes.reset();
        debug!(released, "cleared tree");
    }

    /// Releases every node and drops the tree. Dropping a tree reclaims the same memory; this
    /// is the explicit form.
    pub fn destroy(mut self) {
        self.clear();
    }
}

impl<C: Comparator> Tree<C> {
    /// Potentially finds the node stored under `key`. If no node has the key, `None` is
    /// returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::{Lexicographic, Tree};
    ///
    /// let mut tree = Tree::new(Lexicographic);
    /// tree.insert(&[1], &[2]).unwrap();
    ///
    /// assert_eq!(tree.find(&[1]).map(|n| n.value()), Some(&[2u8][..]));
    /// assert!(tree.find(&[42]).is_none());
    /// ```
    pub fn find(&self, key: &[u8]) -> Option<&Node> {
        self.locate(key).map(|id| &self.nodes[id])
    }

    /// The value stored under `key`, if any.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.find(key).map(Node::value)
    }

    /// Whether a node is stored under `key`.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.locate(key).is_some()
    }

    /// Copies the value stored under `key` into `out`. Exactly `out.len()` bytes are copied
    /// from the front of the stored value, so `out` should be as long as the value that was
    /// inserted.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an empty key, [`Error::NotFound`] when the key is absent.
    /// `out` is untouched in both cases.
    ///
    /// # Panics
    ///
    /// When `out` is longer than the stored value.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::{Lexicographic, Tree};
    ///
    /// let mut tree = Tree::new(Lexicographic);
    /// tree.insert(b"k", &[1, 2, 3, 4]).unwrap();
    ///
    /// let mut out = [0; 4];
    /// tree.get_value(b"k", &mut out).unwrap();
    /// assert_eq!(out, [1, 2, 3, 4]);
    /// ```
    pub fn get_value(&self, key: &[u8], out: &mut [u8]) -> Result<()> {
        if key.is_empty() {
            return Err(Error::InvalidArgument("key must not be empty"));
        }
        let node = self.find(key).ok_or(Error::NotFound)?;
        out.copy_from_slice(&node.value()[..out.len()]);
        Ok(())
    }

    /// Inserts a copy of `value` under a copy of `key`. If the key is already present nothing
    /// changes: the first value inserted for a key is the one that stays.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an empty key or value, [`Error::AllocationFailure`] when
    /// the new node can't be stored. The tree is unchanged in both cases.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(Error::InvalidArgument("key must not be empty"));
        }
        if value.is_empty() {
            return Err(Error::InvalidArgument("value must not be empty"));
        }

        let mut parent = None;
        let mut side = Side::Left;
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            side = match self.comparator.compare(key, node.key()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => {
                    trace!(?id, "key already present, keeping stored value");
                    return Ok(());
                }
            };
            parent = Some(id);
            cursor = node.child(side);
        }

        let id = self.nodes.allocate(key, value)?;
        self.nodes[id].parent = parent;
        match parent {
            Some(parent) => self.nodes[parent].set_child(side, Some(id)),
            None => self.root = Some(id),
        }

        self.rebalance_after_insert(id);
        Ok(())
    }

    /// Deletes the node stored under `key`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an empty key, [`Error::NotFound`] when the key is absent.
    /// The tree is unchanged in both cases.
    pub fn remove(&mut self, key: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(Error::InvalidArgument("key must not be empty"));
        }
        let target = self.locate(key).ok_or(Error::NotFound)?;

        let parent = self.nodes[target].parent;
        let start = match (self.nodes[target].left, self.nodes[target].right) {
            (None, child) | (child, None) => {
                self.nodes.replace_child(&mut self.root, parent, target, child);
                if let Some(child) = child {
                    self.nodes[child].parent = parent;
                }
                parent
            }
            (Some(left), Some(right)) => Some(self.graft_predecessor(target, left, right)),
        };

        let removed = &mut self.nodes[target];
        removed.parent = None;
        removed.left = None;
        removed.right = None;
        self.nodes.release(target);

        self.rebalance_after_remove(start);
        Ok(())
    }

    fn locate(&self, key: &[u8]) -> Option<NodeId> {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            cursor = match self.comparator.compare(key, node.key()) {
                Ordering::Less => node.left,
                Ordering::Equal => return Some(id),
                Ordering::Greater => node.right,
            };
        }
        None
    }
}

impl<C> Tree<C> {
    /// Walks up from a freshly linked leaf. The first ancestor that ends up level absorbed the
    /// growth; the first one that ends up at ±2 is rotated, which brings its subtree back to
    /// its old height. Either way nothing above changes.
    fn rebalance_after_insert(&mut self, inserted: NodeId) {
        let mut child = inserted;
        let mut cursor = self.nodes[inserted].parent;

        while let Some(id) = cursor {
            self.nodes.fix_height(id);
            let balance = self.nodes[id].balance;
            if balance == 0 {
                break;
            }
            if balance.abs() > 1 {
                let child_balance = self.nodes[child].balance;
                self.nodes.rebalance(&mut self.root, id, balance, child_balance);
                break;
            }

            child = id;
            cursor = self.nodes[id].parent;
        }
    }

    /// Walks up from the lowest node whose subtree lost a level. Unlike insertion, a rotation
    /// here can itself shorten the subtree, so the walk only stops once a subtree's height
    /// comes out the same as before.
    fn rebalance_after_remove(&mut self, start: Option<NodeId>) {
        let mut cursor = start;

        while let Some(id) = cursor {
            let old_height = self.nodes[id].height;
            self.nodes.fix_height(id);

            let mut top = id;
            let balance = self.nodes[id].balance;
            if balance.abs() > 1 {
                let child_balance = self
                    .nodes
                    .taller_child(id)
                    .map_or(0, |child| self.nodes[child].balance);
                top = self.nodes.rebalance(&mut self.root, id, balance, child_balance);
            }

            if self.nodes[top].height == old_height {
                break;
            }
            cursor = self.nodes[top].parent;
        }
    }

    /// Puts the in-order predecessor of `target` (the rightmost node of its left subtree) in
    /// `target`'s place, leaving `target` detached from everything but its own stale links.
    /// Returns the node the rebalancing walk has to start from.
    fn graft_predecessor(&mut self, target: NodeId, left: NodeId, right: NodeId) -> NodeId {
        let predecessor = self.nodes.rightmost(left);

        let start = if predecessor == left {
            // It keeps its own left subtree and just moves up.
            predecessor
        } else {
            let old_parent = self.nodes[predecessor]
                .parent
                .expect("Predecessor below the left child has a parent");
            let orphan = self.nodes[predecessor].left;
            self.nodes[old_parent].right = orphan;
            if let Some(orphan) = orphan {
                self.nodes[orphan].parent = Some(old_parent);
            }

            self.nodes[predecessor].left = Some(left);
            self.nodes[left].parent = Some(predecessor);
            old_parent
        };

        self.nodes[predecessor].right = Some(right);
        self.nodes[right].parent = Some(predecessor);

        let parent = self.nodes[target].parent;
        self.nodes[predecessor].parent = parent;
        self.nodes
            .replace_child(&mut self.root, parent, target, Some(predecessor));

        // Take over the old position's bookkeeping so the walk can tell whether it shrank.
        let (height, balance) = (self.nodes[target].height, self.nodes[target].balance);
        let grafted = &mut self.nodes[predecessor];
        grafted.height = height;
        grafted.balance = balance;

        start
    }
}
