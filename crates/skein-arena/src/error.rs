//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use skein_core::{AllocError, IndexOverflow};

/// Errors that can occur during arena operations.
///
/// Every fallible arena operation leaves the arena exactly as it was
/// before the call when it returns one of these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The allocator could not provide storage for a new chunk.
    AllocationFailure {
        /// Number of bytes requested.
        requested: usize,
        /// Alignment requested.
        align: usize,
    },
    /// The configured chunk limit has been reached.
    CapacityExceeded {
        /// The configured limit.
        max_chunks: usize,
    },
    /// The arena configuration violates a documented constraint.
    InvalidConfig {
        /// Description of the violated constraint.
        reason: String,
    },
    /// A slot index does not fit the packed chunk-id range.
    IndexOverflow {
        /// The rejected index.
        index: usize,
    },
    /// A ring-only operation was called on a linear arena.
    NotCircular,
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailure { requested, align } => {
                write!(
                    f,
                    "chunk allocation failed: requested {requested} bytes, align {align}"
                )
            }
            Self::CapacityExceeded { max_chunks } => {
                write!(f, "arena capacity exceeded: limit is {max_chunks} chunks")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
            Self::IndexOverflow { index } => {
                write!(f, "chunk index {index} exceeds the packed id range")
            }
            Self::NotCircular => write!(f, "operation requires a circular arena"),
        }
    }
}

impl Error for ArenaError {}

impl From<AllocError> for ArenaError {
    fn from(e: AllocError) -> Self {
        Self::AllocationFailure {
            requested: e.size,
            align: e.align,
        }
    }
}

impl From<IndexOverflow> for ArenaError {
    fn from(e: IndexOverflow) -> Self {
        Self::IndexOverflow { index: e.index }
    }
}
