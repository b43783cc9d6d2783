//! Error types shared across the Skein workspace.

use std::error::Error;
use std::fmt;

/// A chunk allocator could not provide the requested storage.
///
/// Returned by allocator implementations; the arena wraps it into its own
/// error type and leaves its chain untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocError {
    /// Requested block size in bytes.
    pub size: usize,
    /// Requested block alignment in bytes.
    pub align: usize,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "allocation of {} bytes (align {}) failed",
            self.size, self.align
        )
    }
}

impl Error for AllocError {}

/// A slot index does not fit the packed chunk-id range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexOverflow {
    /// The rejected index.
    pub index: usize,
}

impl fmt::Display for IndexOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk index {} exceeds the packed id range", self.index)
    }
}

impl Error for IndexOverflow {}
