//! Fixed-buffer bump allocation with last-allocation-only reclaim.
//!
//! [`BumpArena`] serves byte ranges from one aligned [`RawBlock`] by
//! advancing a cursor. It never chains further storage. Freeing is
//! best-effort: only the most recent allocation can be handed back, which
//! rewinds the cursor; any other deallocation is ignored until a reset.
//! The buffer is returned through the arena's [`ChunkAllocator`] on drop.

use std::alloc::Layout;
use std::fmt;

use crate::allocator::{ChunkAllocator, Global};
use crate::error::ArenaError;
use crate::raw::RawBlock;

/// A range handed out by [`BumpArena::allocate`].
///
/// Handles carry no lifetime. A handle that outlives a rewind or reset
/// still resolves, but to bytes that may since have been reallocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct BumpBlock {
    offset: usize,
    len: usize,
}

impl BumpBlock {
    /// Byte offset from the start of the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Requested length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this is a zero-length allocation.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Bump allocator over a fixed, aligned byte buffer.
///
/// Every allocation starts on an `align` boundary: requests are rounded
/// up to a multiple of `align` before the cursor moves. The buffer goes
/// back to the allocator it came from when the arena is dropped.
///
/// ```
/// use skein_arena::BumpArena;
///
/// let mut bump = BumpArena::new(64, 8).unwrap();
/// let a = bump.allocate(5).unwrap();
/// let b = bump.allocate(8).unwrap();
/// assert_eq!(b.offset(), 8);
///
/// // Only the latest allocation can be reclaimed.
/// assert!(!bump.deallocate(a));
/// assert!(bump.deallocate(b));
/// assert_eq!(bump.used(), 8);
/// ```
pub struct BumpArena<A: ChunkAllocator = Global> {
    /// Backing storage, allocated once at full capacity. Only `Drop`
    /// takes it out.
    block: Option<RawBlock>,
    /// Next free offset; always a multiple of `align`.
    cursor: usize,
    align: usize,
    allocator: A,
}

impl BumpArena<Global> {
    /// Create a bump arena of `capacity` bytes from the system allocator.
    ///
    /// `align` must be a power of two and `capacity` non-zero.
    pub fn new(capacity: usize, align: usize) -> Result<Self, ArenaError> {
        Self::with_allocator(capacity, align, Global)
    }
}

impl<A: ChunkAllocator> BumpArena<A> {
    /// Create a bump arena whose buffer comes from, and returns to,
    /// `allocator`.
    pub fn with_allocator(
        capacity: usize,
        align: usize,
        mut allocator: A,
    ) -> Result<Self, ArenaError> {
        if capacity == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "bump arena capacity must be non-zero".to_string(),
            });
        }
        let layout =
            Layout::from_size_align(capacity, align).map_err(|e| ArenaError::InvalidConfig {
                reason: format!("bump arena layout {capacity} bytes / align {align}: {e}"),
            })?;
        let block = allocator.allocate(layout)?;
        if block.layout() != layout {
            allocator.deallocate(block);
            return Err(ArenaError::AllocationFailure {
                requested: capacity,
                align,
            });
        }
        Ok(Self {
            block: Some(block),
            cursor: 0,
            align,
            allocator,
        })
    }

    fn buffer(&self) -> &RawBlock {
        match &self.block {
            Some(block) => block,
            None => unreachable!("bump buffer released before drop"),
        }
    }

    fn buffer_mut(&mut self) -> &mut RawBlock {
        match &mut self.block {
            Some(block) => block,
            None => unreachable!("bump buffer released before drop"),
        }
    }

    fn align_up(&self, n: usize) -> Option<usize> {
        let mask = self.align - 1;
        n.checked_add(mask).map(|v| v & !mask)
    }

    /// Reserve `n` bytes.
    ///
    /// Returns `None` if the rounded-up request does not fit in the
    /// remaining space.
    pub fn allocate(&mut self, n: usize) -> Option<BumpBlock> {
        let new_cursor = self.cursor.checked_add(self.align_up(n)?)?;
        if new_cursor > self.capacity() {
            return None;
        }
        let block = BumpBlock {
            offset: self.cursor,
            len: n,
        };
        self.cursor = new_cursor;
        Some(block)
    }

    /// Hand `block` back.
    ///
    /// Rewinds the cursor and returns `true` only if `block` is the most
    /// recent live allocation; otherwise does nothing and returns `false`.
    pub fn deallocate(&mut self, block: BumpBlock) -> bool {
        let end = self
            .align_up(block.len)
            .and_then(|len| block.offset.checked_add(len));
        if end == Some(self.cursor) {
            self.cursor = block.offset;
            true
        } else {
            false
        }
    }

    /// The bytes of `block`.
    ///
    /// # Panics
    ///
    /// Panics if `block` extends past the buffer.
    pub fn slice(&self, block: BumpBlock) -> &[u8] {
        &self.buffer().as_slice()[block.offset..block.offset + block.len]
    }

    /// The bytes of `block`, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `block` extends past the buffer.
    pub fn slice_mut(&mut self, block: BumpBlock) -> &mut [u8] {
        &mut self.buffer_mut().as_mut_slice()[block.offset..block.offset + block.len]
    }

    /// Forget every allocation.
    ///
    /// Stale bytes are not zeroed.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Bytes consumed, including alignment padding.
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Total buffer size in bytes.
    pub fn capacity(&self) -> usize {
        self.buffer().len()
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.cursor
    }

    /// Allocation granularity in bytes.
    pub fn align(&self) -> usize {
        self.align
    }

    /// The allocator the buffer came from.
    pub fn allocator(&self) -> &A {
        &self.allocator
    }
}

impl<A: ChunkAllocator> Drop for BumpArena<A> {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            self.allocator.deallocate(block);
        }
    }
}

impl<A: ChunkAllocator> fmt::Debug for BumpArena<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BumpArena")
            .field("capacity", &self.capacity())
            .field("used", &self.cursor)
            .field("align", &self.align)
            .finish_non_exhaustive()
    }
}
