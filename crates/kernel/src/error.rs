//! Kernel error types.

use thiserror::Error;

/// Errors surfaced by model and store operations.
///
/// All failures are synchronous and final: nothing here is transient, the
/// kernel performs no internal retries, and no error is swallowed. Failed
/// mutations leave the datastore unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A referenced entity does not exist at operation time.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A tree mutation would create a cycle, or a comment parent belongs
    /// to a different post. Always rejected before any mutation.
    #[error("invalid parent: {0}")]
    InvalidParent(&'static str),

    /// `next_post`/`previous_post` called with no neighbor in that
    /// direction. Callers are expected to check `has_next`/`has_previous`
    /// first.
    #[error("no adjacent post in that direction")]
    SequenceEmpty,

    /// The slug is already taken; slugs are unique across posts and across
    /// categories.
    #[error("slug already in use: {0}")]
    DuplicateSlug(String),
}

/// Result type alias using the kernel [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
