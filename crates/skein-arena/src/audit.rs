//! Ownership audit over an arena's links.
//!
//! [`OwnershipAudit`] counts, for every live chunk, how many links own it
//! and how many observe it. An arena is sound when each live chunk has
//! exactly one owner and no link addresses a dead slot.

use indexmap::IndexMap;
use skein_core::ChunkId;
use smallvec::SmallVec;

use crate::allocator::ChunkAllocator;
use crate::chain::ChunkArena;
use crate::link::ChunkRef;

/// Link counts for one chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinkTally {
    /// Links carrying the owning tag.
    pub owners: u32,
    /// Links observing the chunk.
    pub observers: u32,
}

/// Per-chunk ownership tallies, in link order.
///
/// Chunks reachable from the head come first, in link order; live chunks
/// that are unreachable (which a sound arena never has) follow in slot
/// order.
#[derive(Clone, Debug, Default)]
pub struct OwnershipAudit {
    tallies: IndexMap<ChunkId, LinkTally>,
    dangling: SmallVec<[ChunkId; 4]>,
}

impl OwnershipAudit {
    pub(crate) fn scan<A: ChunkAllocator>(arena: &ChunkArena<A>) -> Self {
        let mut tallies = IndexMap::with_capacity(arena.chunk_count());
        for chunk in arena.iter() {
            tallies.insert(chunk.id(), LinkTally::default());
        }
        for chunk in arena.live_chunks() {
            tallies.entry(chunk.id()).or_default();
        }

        let mut audit = Self {
            tallies,
            dangling: SmallVec::new(),
        };
        audit.record(arena.head_ref());
        for chunk in arena.live_chunks() {
            audit.record(chunk.next());
        }
        audit
    }

    fn record(&mut self, link: &ChunkRef) {
        let Some(id) = link.target() else {
            return;
        };
        match self.tallies.get_mut(&id) {
            Some(tally) if link.is_owning() => tally.owners += 1,
            Some(tally) => tally.observers += 1,
            None => self.dangling.push(id),
        }
    }

    /// Whether every live chunk has exactly one owner and no link dangles.
    pub fn is_sound(&self) -> bool {
        self.dangling.is_empty() && self.tallies.values().all(|t| t.owners == 1)
    }

    /// Tally for one chunk, or `None` if it is not live.
    pub fn tally(&self, id: ChunkId) -> Option<LinkTally> {
        self.tallies.get(&id).copied()
    }

    /// Chunks and tallies in audit order.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkId, LinkTally)> + '_ {
        self.tallies.iter().map(|(&id, &t)| (id, t))
    }

    /// Number of live chunks audited.
    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    /// Whether the audited arena was empty.
    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    /// Targets of links that address no live chunk.
    pub fn dangling(&self) -> &[ChunkId] {
        &self.dangling
    }
}
