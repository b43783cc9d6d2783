//! The chunk arena: a growable chain of fixed-size chunks.
//!
//! [`ChunkArena`] owns the head link of the chain and caches the id of
//! the tail chunk, so [`ChunkArena::grow`] splices a new chunk in without
//! walking the chain. Every link carries an ownership tag; the arena's
//! release walk follows owning links only, which is what lets the ring
//! topology close back onto the head without freeing anything twice.
//!
//! # Growth
//!
//! ```text
//! before:  head ─own─► A ─own─► B ─(obs A | empty)
//!                               ▲ tail
//! after:   head ─own─► A ─own─► B ─own─► C ─(obs A | empty)
//!                                        ▲ tail
//! ```
//!
//! The new chunk inherits whatever the old tail's `next` held (empty, or
//! the ring's observer edge) by move, and the old tail's `next` becomes
//! the sole owner of the new chunk. Allocation happens before any link is
//! touched, so a failed `grow` leaves the chain as it was.

use std::alloc::Layout;
use std::fmt;
use std::iter::FusedIterator;

use skein_core::{ChunkEvent, ChunkId, ChunkObserver, ChunkSerial};
use tracing::{debug, trace, warn};

use crate::allocator::{ChunkAllocator, Global};
use crate::audit::OwnershipAudit;
use crate::chunk::Chunk;
use crate::config::{ArenaConfig, Topology};
use crate::error::ArenaError;
use crate::link::ChunkRef;

/// A growable chain of fixed-size chunks with a single owner per chunk.
///
/// Not thread-safe: every mutation takes `&mut self`, and callers that
/// need concurrent growth must serialise access themselves.
pub struct ChunkArena<A: ChunkAllocator = Global> {
    /// Owning link to the first chunk; empty when the arena is empty.
    head: ChunkRef,
    /// Chunk whose `next` the following `grow` rewrites.
    tail: Option<ChunkId>,
    /// Chunk storage; slot `i` holds the chunk with id `base + i`. Slots
    /// are only vacated by the release walk.
    slots: Vec<Option<Chunk>>,
    /// Id of slot 0. Advances past every released id on reset so stale
    /// ids stop resolving.
    base: usize,
    /// Number of live chunks.
    count: usize,
    next_serial: ChunkSerial,
    layout: Layout,
    config: ArenaConfig,
    allocator: A,
    observer: Option<Box<dyn ChunkObserver>>,
}

impl ChunkArena<Global> {
    /// Create an empty arena backed by the system allocator.
    ///
    /// Returns `Err(ArenaError::InvalidConfig)` if `config` fails validation.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        Self::with_allocator(config, Global)
    }
}

impl<A: ChunkAllocator> ChunkArena<A> {
    /// Create an empty arena that takes chunk storage from `allocator`.
    pub fn with_allocator(config: ArenaConfig, allocator: A) -> Result<Self, ArenaError> {
        config.validate()?;
        let layout = config.payload_layout()?;
        Ok(Self {
            head: ChunkRef::empty(),
            tail: None,
            slots: Vec::new(),
            base: 0,
            count: 0,
            next_serial: ChunkSerial(0),
            layout,
            config,
            allocator,
            observer: None,
        })
    }

    /// Attach an observer that receives every chunk lifecycle event.
    pub fn with_observer(mut self, observer: impl ChunkObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// The arena's configuration.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// The allocator chunks are taken from.
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Number of live chunks.
    pub fn chunk_count(&self) -> usize {
        self.count
    }

    /// Whether the arena holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of payload elements one chunk can hold.
    pub fn payload_capacity_per_chunk(&self) -> usize {
        self.config.elements_per_chunk()
    }

    /// Payload bytes per chunk.
    pub fn payload_bytes_per_chunk(&self) -> usize {
        self.layout.size()
    }

    /// Total payload bytes across all live chunks.
    pub fn capacity_bytes(&self) -> usize {
        self.count * self.layout.size()
    }

    /// The first chunk in link order.
    pub fn head(&self) -> Option<ChunkId> {
        self.head.target()
    }

    /// The arena's own link to the head chunk.
    pub fn head_ref(&self) -> &ChunkRef {
        &self.head
    }

    /// The cached tail chunk: the one the next `grow` links after.
    pub fn tail(&self) -> Option<ChunkId> {
        self.tail
    }

    /// Look up a live chunk.
    ///
    /// Ids handed out before a [`reset`](ChunkArena::reset) resolve to
    /// `None` afterwards.
    pub fn chunk(&self, id: ChunkId) -> Option<&Chunk> {
        self.slots.get(id.index().checked_sub(self.base)?)?.as_ref()
    }

    /// Look up a live chunk for payload writes.
    pub fn chunk_mut(&mut self, id: ChunkId) -> Option<&mut Chunk> {
        self.slots.get_mut(id.index().checked_sub(self.base)?)?.as_mut()
    }

    /// Chunks in link order, starting at the head.
    ///
    /// In a ring the iteration stops after one lap.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            slots: &self.slots,
            base: self.base,
            current: self.head.target(),
            remaining: self.count,
        }
    }

    /// Live chunks in slot order, reachable or not.
    pub(crate) fn live_chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.slots.iter().flatten()
    }

    /// Append one chunk to the end of the chain.
    ///
    /// Returns the new chunk's id. On error the arena is unchanged:
    /// - `CapacityExceeded` if `max_chunks` chunks are already live;
    /// - `AllocationFailure` if the allocator has no storage, or hands
    ///   back a block whose layout differs from the one requested.
    ///
    /// O(1) in release builds. Debug builds also walk the chain to check
    /// the cached tail, which makes each call O(chain length) there.
    pub fn grow(&mut self) -> Result<ChunkId, ArenaError> {
        if self.count >= self.config.max_chunks {
            return Err(ArenaError::CapacityExceeded {
                max_chunks: self.config.max_chunks,
            });
        }
        let id = ChunkId::new(self.base + self.slots.len())?;
        let block = match self.allocator.allocate(self.layout) {
            Ok(block) => block,
            Err(e) => {
                warn!(chunk = %id, size = e.size, align = e.align, "chunk allocation failed");
                return Err(e.into());
            }
        };
        if block.layout() != self.layout {
            warn!(
                chunk = %id,
                size = block.len(),
                expected = self.layout.size(),
                "allocator returned a mismatched block"
            );
            self.allocator.deallocate(block);
            return Err(ArenaError::AllocationFailure {
                requested: self.layout.size(),
                align: self.layout.align(),
            });
        }
        let serial = self.next_serial;
        self.next_serial = serial.next();

        let next = match self.tail {
            None => {
                debug_assert!(self.head.is_empty());
                self.head = ChunkRef::owned(id);
                match self.config.topology {
                    Topology::Linear => ChunkRef::empty(),
                    // Observes itself until a second chunk exists.
                    Topology::Circular => ChunkRef::observer(id),
                }
            }
            Some(tail) => {
                let old_tail = live_mut(&mut self.slots, self.base, tail);
                let inherited = old_tail.next_mut().take();
                debug_assert!(!inherited.is_owning());
                *old_tail.next_mut() = ChunkRef::owned(id);
                inherited
            }
        };
        self.slots.push(Some(Chunk::new(id, serial, block, next)));
        self.tail = Some(id);
        self.count += 1;

        debug!(chunk = %id, serial = serial.0, count = self.count, "grew arena");
        self.notify(ChunkEvent::Allocated { id, serial });
        debug_assert_eq!(self.locate_tail_by_walk(), self.tail);
        Ok(id)
    }

    /// Find the tail by following owning links from the head.
    ///
    /// O(chain length). The result always equals [`ChunkArena::tail`];
    /// this exists as a consistency check, never as the growth path.
    pub fn locate_tail_by_walk(&self) -> Option<ChunkId> {
        let mut current = self.head.target()?;
        loop {
            let next = self.chunk(current)?.next();
            if !next.is_owning() {
                return Some(current);
            }
            current = next.get();
        }
    }

    /// Advance the ring's head by one link without moving any payload.
    ///
    /// The old head becomes the tail. Ownership moves in two swaps: the
    /// arena's head link trades tags with the tail's back-reference, then
    /// the old head's owning link to its successor trades tags with a
    /// fresh observer that becomes the new head link.
    ///
    /// A no-op with fewer than two chunks. Returns
    /// `Err(ArenaError::NotCircular)` on a linear arena.
    pub fn rotate(&mut self) -> Result<(), ArenaError> {
        if self.config.topology != Topology::Circular {
            return Err(ArenaError::NotCircular);
        }
        let (Some(old_head), Some(tail)) = (self.head.target(), self.tail) else {
            return Ok(());
        };
        if self.count < 2 {
            return Ok(());
        }

        let tail_link = live_mut(&mut self.slots, self.base, tail).next_mut();
        ChunkRef::swap_ownership(&mut self.head, tail_link);

        let first = live_mut(&mut self.slots, self.base, old_head);
        let mut new_head = ChunkRef::observer(first.next().get());
        ChunkRef::swap_ownership(first.next_mut(), &mut new_head);
        let head = new_head.get();
        self.head = new_head;
        self.tail = Some(old_head);

        debug!(head = %head, tail = %old_head, "rotated ring");
        self.notify(ChunkEvent::Rotated { head });
        debug_assert!(self.audit().is_sound());
        Ok(())
    }

    /// Release every chunk and return to the empty state.
    ///
    /// Each chunk goes back to the allocator exactly once, in link order.
    /// Serials keep counting from where they were, and new ids start past
    /// every released one, so ids from before the reset no longer resolve.
    /// Ids wrap back to 0 only once a further `max_chunks` ids would not
    /// fit below [`ChunkId::MAX_INDEX`].
    pub fn reset(&mut self) {
        let released = self.release_chain();
        debug!(released, "arena reset");
    }

    /// Tally owning and observing links for every live chunk.
    pub fn audit(&self) -> OwnershipAudit {
        OwnershipAudit::scan(self)
    }

    fn release_chain(&mut self) -> usize {
        let mut link = self.head.take();
        let mut released = 0;
        // Observer and empty links end the walk; the ring's closing edge
        // is never owning, so the walk terminates.
        while link.is_owning() {
            let id = link.get();
            let Some(chunk) = id
                .index()
                .checked_sub(self.base)
                .and_then(|slot| self.slots.get_mut(slot))
                .and_then(Option::take)
            else {
                break;
            };
            let serial = chunk.serial();
            let (next, block) = chunk.into_parts();
            self.allocator.deallocate(block);
            trace!(chunk = %id, serial = serial.0, "released chunk");
            self.notify(ChunkEvent::Released { id, serial });
            released += 1;
            link = next;
        }
        debug_assert_eq!(released, self.count, "release walk missed live chunks");
        let next_base = self.base + self.slots.len();
        self.base = if next_base.saturating_add(self.config.max_chunks)
            <= ArenaConfig::DEFAULT_MAX_CHUNKS
        {
            next_base
        } else {
            0
        };
        self.slots.clear();
        self.tail = None;
        self.count = 0;
        released
    }

    fn notify(&mut self, event: ChunkEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_event(&event);
        }
    }
}

impl<A: ChunkAllocator> Drop for ChunkArena<A> {
    fn drop(&mut self) {
        if !self.head.is_empty() {
            self.release_chain();
        }
    }
}

impl<A: ChunkAllocator> fmt::Debug for ChunkArena<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkArena")
            .field("topology", &self.config.topology)
            .field("chunks", &self.count)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .finish_non_exhaustive()
    }
}

impl<'a, A: ChunkAllocator> IntoIterator for &'a ChunkArena<A> {
    type Item = &'a Chunk;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

fn live_mut(slots: &mut [Option<Chunk>], base: usize, id: ChunkId) -> &mut Chunk {
    let slot = id.index().checked_sub(base).and_then(|i| slots.get_mut(i));
    match slot.and_then(Option::as_mut) {
        Some(chunk) => chunk,
        None => panic!("chunk {id} is linked but not live"),
    }
}

/// Iterator over an arena's chunks in link order.
///
/// Created by [`ChunkArena::iter`].
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    slots: &'a [Option<Chunk>],
    base: usize,
    current: Option<ChunkId>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Chunk;

    fn next(&mut self) -> Option<&'a Chunk> {
        if self.remaining == 0 {
            return None;
        }
        let slot = self.current?.index().checked_sub(self.base)?;
        let chunk = self.slots.get(slot)?.as_ref()?;
        self.remaining -= 1;
        self.current = chunk.next().target();
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
