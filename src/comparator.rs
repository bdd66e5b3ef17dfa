//! The ordering used to place keys in a [`Tree`][crate::Tree].

use std::cmp::Ordering;

/// A total order over opaque key bytes.
///
/// The tree only ever borrows its comparator. Implementations must be consistent: the same
/// two keys always compare the same way for as long as the tree lives, otherwise lookups
/// silently stop finding keys that are stored.
///
/// Any `Fn(&[u8], &[u8]) -> Ordering` is a comparator:
///
/// ```
/// use avl_index::Tree;
///
/// // Order keys by length first, then byte-wise.
/// let mut tree = Tree::new(|a: &[u8], b: &[u8]| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
///
/// tree.insert(b"bb", b"2").unwrap();
/// tree.insert(b"a", b"1").unwrap();
///
/// assert_eq!(tree.root().map(|n| n.key()), Some(&b"bb"[..]));
/// assert_eq!(tree.get(b"a"), Some(&b"1"[..]));
/// ```
pub trait Comparator {
    /// Compares `lhs` against `rhs`.
    fn compare(&self, lhs: &[u8], rhs: &[u8]) -> Ordering;
}

impl<F> Comparator for F
where
    F: Fn(&[u8], &[u8]) -> Ordering,
{
    fn compare(&self, lhs: &[u8], rhs: &[u8]) -> Ordering {
        self(lhs, rhs)
    }
}

/// Byte-wise lexicographic order, the same order `<[u8]>::cmp` gives. Big-endian encoded
/// unsigned integers sort numerically under it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Lexicographic;

impl Comparator for Lexicographic {
    fn compare(&self, lhs: &[u8], rhs: &[u8]) -> Ordering {
        lhs.cmp(rhs)
    }
}
