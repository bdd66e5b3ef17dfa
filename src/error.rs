use thiserror::Error as ThisError;

/// Result type returned by every fallible tree operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong when talking to a [`Tree`][crate::Tree].
///
/// None of these leave the tree modified: an operation either completes or reports one of
/// these before touching any link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum Error {
    /// A required argument was missing or empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// No node is stored under the requested key.
    #[error("key not found")]
    NotFound,

    /// Storage for a new node could not be obtained.
    #[error("failed to allocate node storage")]
    AllocationFailure,
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Error::AllocationFailure
    }
}
