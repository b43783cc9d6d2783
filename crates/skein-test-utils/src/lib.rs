//! Test utilities and instrumented allocators for Skein development.
//!
//! - [`CountingAllocator`] forwards to the system allocator and records
//!   every block handed out and returned.
//! - [`FailingAllocator`] fails one chosen request (or every request from
//!   then on), for transactional-growth tests.
//! - [`RecordingObserver`] keeps every [`ChunkEvent`] an arena reports.
//!
//! All three share their records through `Rc` handles so tests can keep
//! inspecting them after the arena that owned the instrument is dropped.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::alloc::Layout;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use skein_arena::{ChunkAllocator, Global, RawBlock};
use skein_core::{AllocError, ChunkEvent, ChunkObserver};

/// Allocation and release history shared by instrumented allocators.
#[derive(Debug, Default)]
pub struct AllocLog {
    /// Start addresses of blocks handed out, in request order.
    pub allocated: Vec<usize>,
    /// Start addresses of blocks returned, in return order.
    pub released: Vec<usize>,
    /// Number of requests refused.
    pub failures: usize,
}

impl AllocLog {
    /// Blocks handed out and not yet returned.
    pub fn live(&self) -> usize {
        self.allocated.len().saturating_sub(self.released.len())
    }

    /// Whether any address was returned more than once.
    pub fn has_double_release(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.released.len());
        !self.released.iter().all(|addr| seen.insert(*addr))
    }
}

/// Shared handle to an [`AllocLog`].
pub type SharedLog = Rc<RefCell<AllocLog>>;

/// Counts allocations and releases; never fails on its own.
#[derive(Debug, Default)]
pub struct CountingAllocator {
    log: SharedLog,
}

impl CountingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that stays readable after the allocator is dropped.
    pub fn log(&self) -> SharedLog {
        Rc::clone(&self.log)
    }
}

impl ChunkAllocator for CountingAllocator {
    fn allocate(&mut self, layout: Layout) -> Result<RawBlock, AllocError> {
        let block = Global.allocate(layout)?;
        self.log.borrow_mut().allocated.push(block.addr());
        Ok(block)
    }

    fn deallocate(&mut self, block: RawBlock) {
        self.log.borrow_mut().released.push(block.addr());
        Global.deallocate(block);
    }
}

/// When a [`FailingAllocator`] refuses requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePlan {
    /// Refuse only the n-th request (1-based).
    Once(usize),
    /// Refuse the n-th request (1-based) and every request after it.
    From(usize),
}

/// Refuses requests according to a [`FailurePlan`], counting otherwise.
#[derive(Debug)]
pub struct FailingAllocator {
    inner: CountingAllocator,
    plan: FailurePlan,
    requests: usize,
}

impl FailingAllocator {
    pub fn new(plan: FailurePlan) -> Self {
        Self {
            inner: CountingAllocator::new(),
            plan,
            requests: 0,
        }
    }

    /// Refuse only the `n`-th request.
    pub fn fail_on(n: usize) -> Self {
        Self::new(FailurePlan::Once(n))
    }

    /// Refuse the `n`-th request and every one after it.
    pub fn fail_from(n: usize) -> Self {
        Self::new(FailurePlan::From(n))
    }

    pub fn log(&self) -> SharedLog {
        self.inner.log()
    }

    fn should_fail(&self) -> bool {
        match self.plan {
            FailurePlan::Once(n) => self.requests == n,
            FailurePlan::From(n) => self.requests >= n,
        }
    }
}

impl ChunkAllocator for FailingAllocator {
    fn allocate(&mut self, layout: Layout) -> Result<RawBlock, AllocError> {
        self.requests += 1;
        if self.should_fail() {
            self.inner.log.borrow_mut().failures += 1;
            return Err(AllocError {
                size: layout.size(),
                align: layout.align(),
            });
        }
        self.inner.allocate(layout)
    }

    fn deallocate(&mut self, block: RawBlock) {
        self.inner.deallocate(block)
    }
}

/// Records every event an arena reports.
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    events: Rc<RefCell<Vec<ChunkEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events so far.
    pub fn events(&self) -> Vec<ChunkEvent> {
        self.events.borrow().clone()
    }

    /// Number of `Allocated` events.
    pub fn allocated(&self) -> usize {
        self.count(|e| matches!(e, ChunkEvent::Allocated { .. }))
    }

    /// Number of `Released` events.
    pub fn released(&self) -> usize {
        self.count(|e| matches!(e, ChunkEvent::Released { .. }))
    }

    fn count(&self, pred: impl Fn(&ChunkEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }
}

impl ChunkObserver for RecordingObserver {
    fn on_event(&mut self, event: &ChunkEvent) {
        self.events.borrow_mut().push(*event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout::from_size_align(56, 8).unwrap()
    }

    #[test]
    fn counting_allocator_tracks_live_blocks() {
        let mut alloc = CountingAllocator::new();
        let log = alloc.log();
        let a = alloc.allocate(layout()).unwrap();
        let b = alloc.allocate(layout()).unwrap();
        assert_eq!(log.borrow().live(), 2);
        alloc.deallocate(a);
        alloc.deallocate(b);
        assert_eq!(log.borrow().live(), 0);
        assert!(!log.borrow().has_double_release());
    }

    #[test]
    fn fail_on_refuses_only_that_request() {
        let mut alloc = FailingAllocator::fail_on(2);
        let first = alloc.allocate(layout()).unwrap();
        assert!(alloc.allocate(layout()).is_err());
        let third = alloc.allocate(layout()).unwrap();
        assert_eq!(alloc.log().borrow().failures, 1);
        alloc.deallocate(first);
        alloc.deallocate(third);
    }

    #[test]
    fn fail_from_refuses_the_rest() {
        let mut alloc = FailingAllocator::fail_from(1);
        assert!(alloc.allocate(layout()).is_err());
        assert!(alloc.allocate(layout()).is_err());
        assert_eq!(alloc.log().borrow().failures, 2);
    }

    #[test]
    fn double_release_is_detected() {
        let log = AllocLog {
            allocated: vec![0x10],
            released: vec![0x10, 0x10],
            failures: 0,
        };
        assert!(log.has_double_release());
    }
}
