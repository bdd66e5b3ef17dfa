//! An in-memory ordered index mapping opaque byte keys to opaque byte values, kept in an AVL
//! tree.
//!
//! ## AVL Tree
//!
//! An AVL tree is a Binary Search Tree. Every `Node` stores a key and a value and may have two
//! child `Node`s. For every `Node`, all the keys in its left subtree sort before its own key
//! and all the keys in its right subtree sort after it. Here "sort" means whatever the
//! [`Comparator`] handed to the tree says: keys are just bytes to the tree.
//!
//! On top of that, an AVL tree keeps the heights of the two subtrees of every `Node` within one
//! of each other. Inserts and removes restore this with a handful of rotations on the way back
//! up from the changed leaf, so the height of the tree (and therefore the cost of every
//! operation) stays `O(lg N)`.
//!
//! # Examples
//!
//! ```
//! use avl_index::{Lexicographic, Tree};
//!
//! let mut tree = Tree::new(Lexicographic);
//! for k in 1u32..=7 {
//!     tree.insert(&k.to_be_bytes(), b"value").unwrap();
//! }
//!
//! assert_eq!(tree.height(), 3);
//! assert_eq!(tree.root().map(|n| n.key()), Some(&4u32.to_be_bytes()[..]));
//!
//! tree.remove(&4u32.to_be_bytes()).unwrap();
//! assert!(tree.find(&4u32.to_be_bytes()).is_none());
//! assert_eq!(tree.root().map(|n| n.key()), Some(&3u32.to_be_bytes()[..]));
//! ```

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

mod comparator;
mod error;
mod node;
mod rotate;
mod tree;
mod util;


pub use comparator::{Comparator, Lexicographic};
pub use error::{Error, Result};
pub use node::Node;
pub use tree::Tree;
