//! Core types and traits for the Skein chunk arena.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the identifiers shared by every arena component, the allocation
//! error type, and the observer trait used to trace chunk lifecycles.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod traits;

pub use error::{AllocError, IndexOverflow};
pub use id::{ChunkId, ChunkSerial};
pub use traits::{ChunkEvent, ChunkObserver};
