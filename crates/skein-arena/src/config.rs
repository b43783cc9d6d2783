//! Arena configuration parameters.

use std::alloc::Layout;

use skein_core::ChunkId;

use crate::error::ArenaError;

/// Bytes reserved per chunk for its outgoing link.
///
/// One pointer-sized link word; the payload window is what remains of
/// `chunk_bytes` after this reservation.
pub const LINK_BYTES: usize = 8;

/// Shape of the chunk chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Topology {
    /// The tail's `next` link is empty.
    #[default]
    Linear,
    /// The tail's `next` link observes the head, closing a ring.
    Circular,
}

/// Configuration for a [`ChunkArena`](crate::ChunkArena).
///
/// Controls chunk sizing, payload alignment, chain shape, and the growth
/// limit. Validated at arena construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Total size of one chunk in bytes, including [`LINK_BYTES`].
    ///
    /// Default: 512. Must be a power of two and leave room for at least
    /// one payload element after the link reservation.
    pub chunk_bytes: usize,

    /// Alignment of each chunk's payload window in bytes.
    ///
    /// Default: `align_of::<u64>()`. Must be a power of two and at least
    /// `element_align`.
    pub align: usize,

    /// Size of one payload element in bytes. Must be non-zero.
    pub element_size: usize,

    /// Alignment required by one payload element. Must be a power of two.
    pub element_align: usize,

    /// Whether the chain is linear or closed into a ring.
    pub topology: Topology,

    /// Maximum number of chunks the arena may hold at once.
    ///
    /// Default: every id representable by [`ChunkId`].
    pub max_chunks: usize,
}

impl ArenaConfig {
    /// Default chunk size in bytes.
    pub const DEFAULT_CHUNK_BYTES: usize = 512;

    /// Default payload alignment.
    pub const DEFAULT_ALIGN: usize = std::mem::align_of::<u64>();

    /// Default growth limit: the full packed id range.
    pub const DEFAULT_MAX_CHUNKS: usize = ChunkId::MAX_INDEX as usize + 1;

    /// Create a byte-payload config with the given chunk size.
    ///
    /// Uses default values for all other parameters.
    pub fn new(chunk_bytes: usize) -> Self {
        Self {
            chunk_bytes,
            align: Self::DEFAULT_ALIGN,
            element_size: 1,
            element_align: 1,
            topology: Topology::Linear,
            max_chunks: Self::DEFAULT_MAX_CHUNKS,
        }
    }

    /// Create a config whose payload holds elements of type `T`.
    pub fn for_element<T>(chunk_bytes: usize) -> Self {
        let element_align = std::mem::align_of::<T>();
        Self {
            element_size: std::mem::size_of::<T>(),
            element_align,
            align: element_align.max(Self::DEFAULT_ALIGN),
            ..Self::new(chunk_bytes)
        }
    }

    /// Switch to circular topology.
    pub fn circular(mut self) -> Self {
        self.topology = Topology::Circular;
        self
    }

    /// Cap the number of chunks.
    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Bytes available for payload in each chunk.
    pub fn payload_bytes(&self) -> usize {
        self.chunk_bytes.saturating_sub(LINK_BYTES)
    }

    /// Number of whole elements that fit in one chunk's payload.
    pub fn elements_per_chunk(&self) -> usize {
        match self.element_size {
            0 => 0,
            size => self.payload_bytes() / size,
        }
    }

    /// Check every constraint documented on the fields.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if !self.chunk_bytes.is_power_of_two() {
            return Err(invalid(format!(
                "chunk_bytes must be a power of two (got {})",
                self.chunk_bytes
            )));
        }
        if self.element_size == 0 {
            return Err(invalid("element_size must be non-zero".to_string()));
        }
        if !self.element_align.is_power_of_two() {
            return Err(invalid(format!(
                "element_align must be a power of two (got {})",
                self.element_align
            )));
        }
        if self.chunk_bytes < LINK_BYTES + self.element_size {
            return Err(invalid(format!(
                "chunk_bytes {} cannot hold the {LINK_BYTES}-byte link and one {}-byte element",
                self.chunk_bytes, self.element_size
            )));
        }
        if !self.align.is_power_of_two() || self.align < self.element_align {
            return Err(invalid(format!(
                "align must be a power of two >= element_align {} (got {})",
                self.element_align, self.align
            )));
        }
        if self.max_chunks == 0 || self.max_chunks > Self::DEFAULT_MAX_CHUNKS {
            return Err(invalid(format!(
                "max_chunks must be in 1..={} (got {})",
                Self::DEFAULT_MAX_CHUNKS,
                self.max_chunks
            )));
        }
        Ok(())
    }

    /// Layout of one chunk's payload block.
    pub fn payload_layout(&self) -> Result<Layout, ArenaError> {
        Layout::from_size_align(self.payload_bytes(), self.align).map_err(|e| {
            invalid(format!(
                "payload layout {} bytes / align {}: {e}",
                self.payload_bytes(),
                self.align
            ))
        })
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CHUNK_BYTES)
    }
}

fn invalid(reason: String) -> ArenaError {
    ArenaError::InvalidConfig { reason }
}
