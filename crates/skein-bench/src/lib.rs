//! Benchmark profiles and baselines for the Skein chunked arena.
//!
//! - [`small_chunk_profile`]: 64-byte chunks of `u32`, the smallest useful size
//! - [`page_profile`]: 4 KiB chunks of `u64`
//! - [`grow_by_walk`]: growth that rediscovers the tail by walking the chain
//!   first, the baseline the cached tail is measured against

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use skein_arena::{ArenaConfig, ArenaError, ChunkAllocator, ChunkArena, Topology};

/// 64-byte chunks holding `u32` elements (14 per chunk).
pub fn small_chunk_profile(topology: Topology) -> ArenaConfig {
    let mut config = ArenaConfig::for_element::<u32>(64);
    config.topology = topology;
    config
}

/// Page-sized chunks holding `u64` elements.
pub fn page_profile(topology: Topology) -> ArenaConfig {
    let mut config = ArenaConfig::for_element::<u64>(4096);
    config.topology = topology;
    config
}

/// Grow by one chunk after locating the tail with a full walk.
///
/// O(chain length) per call, so `n` calls cost O(n²) in total.
pub fn grow_by_walk<A: ChunkAllocator>(arena: &mut ChunkArena<A>) -> Result<(), ArenaError> {
    let tail = arena.locate_tail_by_walk();
    debug_assert_eq!(tail, arena.tail());
    arena.grow().map(drop)
}

/// Build an arena of `chunks` chunks with `config`.
pub fn filled(config: ArenaConfig, chunks: usize) -> Result<ChunkArena, ArenaError> {
    let mut arena = ChunkArena::new(config)?;
    for _ in 0..chunks {
        arena.grow()?;
    }
    Ok(arena)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_validate() {
        for topology in [Topology::Linear, Topology::Circular] {
            assert!(small_chunk_profile(topology).validate().is_ok());
            assert!(page_profile(topology).validate().is_ok());
        }
        assert_eq!(small_chunk_profile(Topology::Linear).elements_per_chunk(), 14);
        assert_eq!(page_profile(Topology::Linear).elements_per_chunk(), 511);
    }

    #[test]
    fn walk_baseline_builds_the_same_chain() {
        let mut arena = ChunkArena::new(small_chunk_profile(Topology::Circular)).unwrap();
        for _ in 0..20 {
            grow_by_walk(&mut arena).unwrap();
        }
        assert_eq!(arena.chunk_count(), 20);
        assert!(arena.audit().is_sound());
    }

    #[test]
    fn filled_reaches_requested_count() {
        let arena = filled(page_profile(Topology::Linear), 8).unwrap();
        assert_eq!(arena.chunk_count(), 8);
        assert_eq!(arena.locate_tail_by_walk(), arena.tail());
    }
}
