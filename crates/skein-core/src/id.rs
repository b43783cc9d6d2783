//! Strongly-typed chunk identifiers.

use std::fmt;

use crate::error::IndexOverflow;

/// Identifies a chunk within a single arena.
///
/// A `ChunkId` is the index of the chunk's slot in the arena's backing
/// store. Identities are only meaningful for the arena that issued them.
///
/// The index range is capped at [`ChunkId::MAX_INDEX`] so that an id can
/// be packed, together with a one-bit ownership tag, into a single `u32`
/// word (see `skein_arena::link::ChunkRef`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(u32);

impl ChunkId {
    /// Largest representable chunk index.
    ///
    /// The packed form is `(index + 1) << 1`, which must fit in a `u32`.
    pub const MAX_INDEX: u32 = (u32::MAX >> 1) - 1;

    /// Create an id for the given slot index.
    ///
    /// Returns `Err(IndexOverflow)` if `index` exceeds [`ChunkId::MAX_INDEX`].
    pub fn new(index: usize) -> Result<Self, IndexOverflow> {
        match u32::try_from(index) {
            Ok(i) if i <= Self::MAX_INDEX => Ok(Self(i)),
            _ => Err(IndexOverflow { index }),
        }
    }

    /// The slot index this id refers to.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The raw index as a `u32`.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-arena construction serial number of a chunk.
///
/// Serials are assigned from a monotonic counter owned by each arena and
/// are never reused by that arena, even across `reset()`. They exist so
/// that construction and release order can be traced without any
/// process-global state: two arenas may hand out the same serial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkSerial(pub u64);

impl ChunkSerial {
    /// The serial following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ChunkSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip() {
        let id = ChunkId::new(42).unwrap();
        assert_eq!(id.index(), 42);
        assert_eq!(id.as_u32(), 42);
    }

    #[test]
    fn max_index_is_accepted() {
        let id = ChunkId::new(ChunkId::MAX_INDEX as usize).unwrap();
        assert_eq!(id.as_u32(), ChunkId::MAX_INDEX);
    }

    #[test]
    fn index_past_max_is_rejected() {
        let index = ChunkId::MAX_INDEX as usize + 1;
        assert_eq!(ChunkId::new(index), Err(IndexOverflow { index }));
    }

    #[test]
    fn packed_form_of_max_index_fits_u32() {
        let packed = (u64::from(ChunkId::MAX_INDEX) + 1) << 1 | 1;
        assert!(packed <= u64::from(u32::MAX));
    }

    #[test]
    fn serials_are_ordered() {
        let first = ChunkSerial(0);
        assert!(first.next() > first);
        assert_eq!(first.next(), ChunkSerial(1));
    }

    #[test]
    fn display_formats() {
        assert_eq!(ChunkId::new(7).unwrap().to_string(), "#7");
        assert_eq!(ChunkSerial(3).to_string(), "3");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn in_range_indices_round_trip(index in 0usize..=ChunkId::MAX_INDEX as usize) {
                let id = ChunkId::new(index).unwrap();
                prop_assert_eq!(id.index(), index);
            }
        }
    }
}
