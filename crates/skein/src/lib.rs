//! Skein: chunked arena allocation with tagged single-ownership links.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Skein sub-crates. For most users, adding `skein` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use skein::prelude::*;
//!
//! // 64-byte chunks of u32: an 8-byte link leaves room for 14 elements.
//! let config = ArenaConfig::for_element::<u32>(64).circular();
//! let mut arena = ChunkArena::new(config).unwrap();
//!
//! let head = arena.grow().unwrap();
//! let tail = arena.grow().unwrap();
//! assert_eq!(arena.payload_capacity_per_chunk(), 14);
//!
//! // The ring closes with an observing link, so nothing is owned twice.
//! let back = arena.chunk(tail).unwrap().next();
//! assert!(back.is_observer());
//! assert_eq!(back.get(), head);
//! assert!(arena.audit().is_sound());
//!
//! // Dropping the arena releases each chunk exactly once.
//! drop(arena);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `skein-arena` | Chunk arena, ownership links, audit, bump arena |
//! | [`types`] | `skein-core` | Chunk ids, serials, allocation errors, observer trait |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Chunk arena, ownership links, and bump allocation (`skein-arena`).
///
/// Most users only need [`arena::ChunkArena`] and [`arena::ArenaConfig`];
/// both are also available in the [`prelude`].
pub use skein_arena as arena;

/// Identifiers, allocation errors, and the lifecycle observer trait
/// (`skein-core`).
pub use skein_core as types;

/// Common imports for typical Skein usage.
///
/// ```rust
/// use skein::prelude::*;
/// ```
pub mod prelude {
    // Arenas
    pub use skein_arena::{ArenaConfig, BumpArena, BumpBlock, ChunkArena, Topology};

    // Links and inspection
    pub use skein_arena::{Chunk, ChunkRef, OwnershipAudit};

    // Allocation seam
    pub use skein_arena::{ChunkAllocator, Global};

    // Errors
    pub use skein_arena::ArenaError;

    // Core types
    pub use skein_core::{ChunkEvent, ChunkId, ChunkObserver};
}
