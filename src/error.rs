//! Error types shared across the crate.
//!
//! Only sequence construction, ChangeSet validation, and the initial store fetch
//! produce errors a caller sees. Cache-provider failures are advisory and get
//! logged where they happen.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("asset {id} appears more than once in the sequence")]
    DuplicateHandle { id: String },
}

/// Which part of a ChangeSet carried an offending index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Removed,
    Inserted,
    Changed,
    MoveFrom,
    MoveTo,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Removed => "removed",
            Self::Inserted => "inserted",
            Self::Changed => "changed",
            Self::MoveFrom => "move source",
            Self::MoveTo => "move destination",
        };
        f.write_str(name)
    }
}

/// Upstream store broke its consistency contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangeSetError {
    #[error("{kind} index {index} out of bounds for sequence of length {len}")]
    IndexOutOfBounds {
        kind: IndexKind,
        index: usize,
        len: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache request rejected: {reason}")]
    Rejected { reason: String },
    #[error("image cache unavailable")]
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("asset store unavailable")]
    Unavailable,
    #[error("asset store disconnected")]
    Disconnected,
    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

#[derive(Debug, Error)]
pub enum GridError {
    #[error("failed to load initial asset sequence")]
    InitialFetch(#[source] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("change feed is full")]
    Full,
    #[error("change feed receiver is gone")]
    Disconnected,
}
