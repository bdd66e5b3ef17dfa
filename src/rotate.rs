//! The rebalancing rotations. Each one rewrites the subtree rooted at a given node in place,
//! relinks the subtree's parent (or the tree's root slot) to the new subtree root, and
//! refreshes heights bottom-up. None of them change the in-order sequence of keys.
//!
//! See https://en.wikipedia.org/wiki/AVL_tree#Rebalancing for terminology.

use tracing::trace;

use crate::node::{Arena, NodeId};

impl Arena {
    /// Rotate `old_root` to the left. This moves the right child up vertically and `old_root`
    /// down vertically. Used to rebalance the tree when the right child is too tall. As such,
    /// it must only be called when there _is_ a right child.
    ///
    /// ## Panics
    ///
    /// When called on a node without a right child.
    ///
    /// # Diagram
    ///
    /// ```text
    ///  Option<parent>             Option<parent>
    ///      /                           /
    ///   old_root                    new_root
    ///    /    \                     /     \
    ///   x   new_root  rotate ->  old_root   z
    ///        /  \                 /  \
    ///       y    z               x    y
    /// ```
    pub(crate) fn rotate_left(&mut self, root: &mut Option<NodeId>, old_root: NodeId) -> NodeId {
        let new_root = self[old_root]
            .right
            .expect("Rotate left => right child");
        let parent = self[old_root].parent;

        let inner = self[new_root].left;
        self[old_root].right = inner;
        if let Some(inner) = inner {
            self[inner].parent = Some(old_root);
        }

        self[new_root].left = Some(old_root);
        self[old_root].parent = Some(new_root);

        self[new_root].parent = parent;
        self.replace_child(root, parent, old_root, Some(new_root));

        self.fix_height(old_root);
        self.fix_height(new_root);

        trace!(?old_root, ?new_root, "rotated left");
        new_root
    }

    /// Mirror image of [`Arena::rotate_left`]: the left child moves up.
    ///
    /// ## Panics
    ///
    /// When called on a node without a left child.
    ///
    /// # Diagram
    ///
    /// ```text
    ///    Option<parent>            Option<parent>
    ///      /                         /
    ///   old_root                  new_root
    ///    /     \                  /     \
    /// new_root  z     rotate ->  x    old_root
    ///  / \                               /  \
    /// x   y                             y    z
    /// ```
    pub(crate) fn rotate_right(&mut self, root: &mut Option<NodeId>, old_root: NodeId) -> NodeId {
        let new_root = self[old_root].left.expect("Rotate right => left child");
        let parent = self[old_root].parent;

        let inner = self[new_root].right;
        self[old_root].left = inner;
        if let Some(inner) = inner {
            self[inner].parent = Some(old_root);
        }

        self[new_root].right = Some(old_root);
        self[old_root].parent = Some(new_root);

        self[new_root].parent = parent;
        self.replace_child(root, parent, old_root, Some(new_root));

        self.fix_height(old_root);
        self.fix_height(new_root);

        trace!(?old_root, ?new_root, "rotated right");
        new_root
    }

    /// Straightens a left-right zig-zag: the left child is rotated left, then `old_root` is
    /// rotated right. The left child's right child ends up on top.
    pub(crate) fn rotate_left_right(&mut self, root: &mut Option<NodeId>, old_root: NodeId) -> NodeId {
        let left = self[old_root]
            .left
            .expect("Rotating left-right requires a left child");
        self.rotate_left(root, left);
        self.rotate_right(root, old_root)
    }

    /// Straightens a right-left zig-zag: the right child is rotated right, then `old_root` is
    /// rotated left. The right child's left child ends up on top.
    pub(crate) fn rotate_right_left(&mut self, root: &mut Option<NodeId>, old_root: NodeId) -> NodeId {
        let right = self[old_root]
            .right
            .expect("Rotating right-left requires a right child");
        self.rotate_right(root, right);
        self.rotate_left(root, old_root)
    }

    /// Restores balance at `node`, whose balance factor is `balance` (±2), given the balance
    /// factor of its taller child. Returns the root of the rotated subtree.
    ///
    /// When both factors lean the same way (or the child is level) one rotation suffices.
    /// Otherwise the child leans the other way and a double rotation is needed.
    pub(crate) fn rebalance(
        &mut self,
        root: &mut Option<NodeId>,
        node: NodeId,
        balance: isize,
        child_balance: isize,
    ) -> NodeId {
        let new_root = match (balance > 0, balance * child_balance >= 0) {
            (true, true) => self.rotate_left(root, node),
            (false, true) => self.rotate_right(root, node),
            (true, false) => self.rotate_right_left(root, node),
            (false, false) => self.rotate_left_right(root, node),
        };

        if cfg!(debug_assertions) {
            let top = &self[new_root];
            assert!(top.balance.abs() <= 1);
            assert_eq!(
                top.height,
                self.height_of(top.left).max(self.height_of(top.right)) + 1
            );
        }
        new_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Links `child` below `parent` on the given side and refreshes `parent`.
    fn attach(arena: &mut Arena, parent: NodeId, child: NodeId, left: bool) {
        if left {
            arena[parent].left = Some(child);
        } else {
            arena[parent].right = Some(child);
        }
        arena[child].parent = Some(parent);
        arena.fix_height(parent);
    }

    /// Builds the chain `a -> b -> c` down the given sides and returns the three handles.
    fn chain(arena: &mut Arena, first_left: bool, second_left: bool) -> [NodeId; 3] {
        let a = arena.allocate(b"a", b"a").unwrap();
        let b = arena.allocate(b"b", b"b").unwrap();
        let c = arena.allocate(b"c", b"c").unwrap();
        attach(arena, b, c, second_left);
        attach(arena, a, b, first_left);
        [a, b, c]
    }

    #[test]
    fn rotate_left_promotes_right_child() {
        let mut arena = Arena::new();
        let [a, b, c] = chain(&mut arena, false, false);
        let mut root = Some(a);

        let top = arena.rebalance(&mut root, a, arena[a].balance, arena[b].balance);

        assert_eq!(top, b);
        assert_eq!(root, Some(b));
        assert_eq!(arena[b].parent, None);
        assert_eq!(arena[b].left, Some(a));
        assert_eq!(arena[b].right, Some(c));
        assert_eq!(arena[a].parent, Some(b));
        assert_eq!(arena[b].height, 2);
        assert_eq!(arena[a].height, 1);
    }

    #[test]
    fn rotate_right_promotes_left_child() {
        let mut arena = Arena::new();
        let [a, b, c] = chain(&mut arena, true, true);
        let mut root = Some(a);

        let top = arena.rebalance(&mut root, a, arena[a].balance, arena[b].balance);

        assert_eq!(top, b);
        assert_eq!(root, Some(b));
        assert_eq!(arena[b].left, Some(c));
        assert_eq!(arena[b].right, Some(a));
        assert_eq!(arena[c].parent, Some(b));
    }

    #[test]
    fn zig_zags_need_double_rotations() {
        let mut arena = Arena::new();
        let [a, b, c] = chain(&mut arena, true, false);
        let mut root = Some(a);

        assert_eq!(arena[a].balance, -2);
        assert_eq!(arena[b].balance, 1);
        let top = arena.rebalance(&mut root, a, arena[a].balance, arena[b].balance);

        assert_eq!(top, c);
        assert_eq!(arena[c].left, Some(b));
        assert_eq!(arena[c].right, Some(a));
        assert_eq!(arena[c].height, 2);

        let mut arena = Arena::new();
        let [a, b, c] = chain(&mut arena, false, true);
        let mut root = Some(a);

        let top = arena.rebalance(&mut root, a, arena[a].balance, arena[b].balance);

        assert_eq!(top, c);
        assert_eq!(arena[c].left, Some(a));
        assert_eq!(arena[c].right, Some(b));
        assert_eq!(arena[a].parent, Some(c));
        assert_eq!(arena[b].parent, Some(c));
    }

    #[test]
    fn rotation_relinks_grandparent() {
        let mut arena = Arena::new();
        let grandparent = arena.allocate(b"g", b"g").unwrap();
        let [a, b, _] = chain(&mut arena, false, false);
        attach(&mut arena, grandparent, a, true);
        let mut root = Some(grandparent);

        let top = arena.rotate_left(&mut root, a);

        assert_eq!(root, Some(grandparent));
        assert_eq!(arena[grandparent].left, Some(top));
        assert_eq!(arena[b].parent, Some(grandparent));
    }
}
