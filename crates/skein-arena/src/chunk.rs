//! Fixed-size storage chunks.
//!
//! A [`Chunk`] is one aligned payload block plus the outgoing link to the
//! next chunk. Its slot in the arena is its identity, so chunks are never
//! cloned or moved between slots once linked.

use skein_core::{ChunkId, ChunkSerial};

use crate::link::ChunkRef;
use crate::raw::RawBlock;

/// A block of payload storage linked into an arena's chain.
#[derive(Debug)]
pub struct Chunk {
    id: ChunkId,
    serial: ChunkSerial,
    block: RawBlock,
    next: ChunkRef,
}

impl Chunk {
    pub(crate) fn new(id: ChunkId, serial: ChunkSerial, block: RawBlock, next: ChunkRef) -> Self {
        Self {
            id,
            serial,
            block,
            next,
        }
    }

    /// The slot this chunk occupies.
    pub fn id(&self) -> ChunkId {
        self.id
    }

    /// Construction serial, unique within the owning arena.
    pub fn serial(&self) -> ChunkSerial {
        self.serial
    }

    /// The payload window.
    pub fn payload(&self) -> &[u8] {
        self.block.as_slice()
    }

    /// The payload window, mutably.
    pub fn payload_mut(&mut self) -> &mut [u8] {
        self.block.as_mut_slice()
    }

    /// Start address of the payload window.
    pub fn payload_addr(&self) -> usize {
        self.block.addr()
    }

    /// The outgoing link.
    pub fn next(&self) -> &ChunkRef {
        &self.next
    }

    pub(crate) fn next_mut(&mut self) -> &mut ChunkRef {
        &mut self.next
    }

    /// Detach the chunk, yielding its outgoing link and its storage.
    pub(crate) fn into_parts(self) -> (ChunkRef, RawBlock) {
        (self.next, self.block)
    }
}
