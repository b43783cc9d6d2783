//! Growable chunked arena with tagged ownership links.
//!
//! Storage grows one fixed-size chunk at a time. Chunks are linked into a
//! chain (or a ring) through [`ChunkRef`] links, each of which carries a
//! runtime tag saying whether that link owns the chunk it points at or
//! merely observes it. Growth moves the owning tag forward so that every
//! live chunk has exactly one owner, even when the ring's closing edge
//! points back at the head.
//!
//! This crate is the only one in the workspace that may contain `unsafe`
//! code, and it is confined to [`raw`].
//!
//! # Architecture
//!
//! ```text
//! ChunkArena<A: ChunkAllocator>
//! ├── head: ChunkRef ──owns──► Chunk #0 ──owns──► Chunk #1 ──owns──► Chunk #2
//! │                               ▲                                    │
//! │                               └──────────── observes (ring) ───────┘
//! ├── tail: Option<ChunkId>   (cached, O(1) growth)
//! └── slots: Vec<Option<Chunk>>
//!         └── Chunk { RawBlock (aligned payload), next: ChunkRef }
//!
//! BumpArena (fixed RawBlock, monotonic cursor, LIFO-only rewind)
//! ```
//!
//! # Topologies
//!
//! - **Linear:** the tail's `next` is empty.
//! - **Circular:** the tail's `next` observes the head. The head stays
//!   owned by the arena, so the ring is never an ownership cycle.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod allocator;
pub mod audit;
pub mod bump;
pub mod chain;
pub mod chunk;
pub mod config;
pub mod error;
pub mod link;
pub mod raw;

// Public re-exports for the primary API surface.
pub use allocator::{ChunkAllocator, Global};
pub use audit::{LinkTally, OwnershipAudit};
pub use bump::{BumpArena, BumpBlock};
pub use chain::{ChunkArena, Iter};
pub use chunk::Chunk;
pub use config::{ArenaConfig, Topology, LINK_BYTES};
pub use error::ArenaError;
pub use link::ChunkRef;
pub use raw::RawBlock;
