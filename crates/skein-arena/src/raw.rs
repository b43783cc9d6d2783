//! Low-level primitives for arena memory operations.
//!
//! [`RawBlock`] is the only owner of system-allocated memory in the
//! workspace. Every `unsafe` block in the crate lives here, each with a
//! `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::NonNull;

/// An aligned, zero-initialised heap block.
///
/// The block frees itself on drop. Allocators hand blocks out from
/// [`ChunkAllocator::allocate`](crate::ChunkAllocator::allocate) and take
/// them back in [`ChunkAllocator::deallocate`](crate::ChunkAllocator::deallocate),
/// which is the only point where instrumentation can observe a release.
pub struct RawBlock {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl RawBlock {
    /// Allocate a zeroed block with the given layout from the system allocator.
    ///
    /// Returns `None` for zero-sized layouts and when the system allocator
    /// reports failure.
    pub fn alloc_zeroed(layout: Layout) -> Option<Self> {
        if layout.size() == 0 {
            return None;
        }
        // SAFETY: `layout` has a non-zero size, checked above.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        NonNull::new(ptr).map(|ptr| Self { ptr, layout })
    }

    /// The layout this block was allocated with.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Block size in bytes.
    pub fn len(&self) -> usize {
        self.layout.size()
    }

    /// Always `false`: zero-sized blocks are never allocated.
    pub fn is_empty(&self) -> bool {
        self.layout.size() == 0
    }

    /// Start address of the block, for alignment checks and tracing.
    pub fn addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// The block's bytes.
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `ptr` is valid for `layout.size()` initialised bytes for
        // as long as `self` lives, and the shared borrow of `self` prevents
        // concurrent mutation.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }

    /// The block's bytes, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as in `as_slice`; the exclusive borrow of `self` makes
        // this the only live reference into the block.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl Drop for RawBlock {
    fn drop(&mut self) {
        // SAFETY: `ptr` was returned by `alloc_zeroed` with exactly this
        // layout and has not been freed: `RawBlock` is not `Clone` and
        // this is its only deallocation site.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

impl fmt::Debug for RawBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBlock")
            .field("addr", &format_args!("{:#x}", self.addr()))
            .field("size", &self.layout.size())
            .field("align", &self.layout.align())
            .finish()
    }
}
