//! The chunk allocator seam.
//!
//! Arenas never call the system allocator directly; they go through a
//! [`ChunkAllocator`] so that tests can count or fail allocations.

use std::alloc::Layout;

use skein_core::AllocError;

use crate::raw::RawBlock;

/// Source of chunk storage.
pub trait ChunkAllocator {
    /// Allocate a zeroed block with the given layout.
    ///
    /// Must return `Err(AllocError)` rather than a short or empty block.
    fn allocate(&mut self, layout: Layout) -> Result<RawBlock, AllocError>;

    /// Return a block previously handed out by [`ChunkAllocator::allocate`].
    fn deallocate(&mut self, block: RawBlock);
}

/// The system allocator.
#[derive(Clone, Copy, Debug, Default)]
pub struct Global;

impl ChunkAllocator for Global {
    fn allocate(&mut self, layout: Layout) -> Result<RawBlock, AllocError> {
        RawBlock::alloc_zeroed(layout).ok_or(AllocError {
            size: layout.size(),
            align: layout.align(),
        })
    }

    fn deallocate(&mut self, block: RawBlock) {
        drop(block);
    }
}

impl<A: ChunkAllocator + ?Sized> ChunkAllocator for &mut A {
    fn allocate(&mut self, layout: Layout) -> Result<RawBlock, AllocError> {
        (**self).allocate(layout)
    }

    fn deallocate(&mut self, block: RawBlock) {
        (**self).deallocate(block)
    }
}

impl<A: ChunkAllocator + ?Sized> ChunkAllocator for Box<A> {
    fn allocate(&mut self, layout: Layout) -> Result<RawBlock, AllocError> {
        (**self).allocate(layout)
    }

    fn deallocate(&mut self, block: RawBlock) {
        (**self).deallocate(block)
    }
}
