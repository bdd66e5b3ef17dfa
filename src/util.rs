/// Which child slot of a parent a node hangs from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    /// Keys comparing less than the parent.
    Left,
    /// Keys comparing greater than the parent.
    Right,
}
