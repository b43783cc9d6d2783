//! Tagged ownership references between chunks.
//!
//! A [`ChunkRef`] names a chunk and says whether it is *the* link that
//! owns it. The identity and the tag share one `u32` word:
//!
//! ```text
//! word = ((index + 1) << 1) | owning
//!        └──── identity ───┘   └ tag
//! word == 0  →  empty
//! ```
//!
//! The shifted identity is always even, so the low bit is free for the
//! tag, and `+ 1` keeps slot 0 distinguishable from the empty reference.
//!
//! References are move-only. The single-owner invariant is kept by never
//! duplicating an owning tag: ownership leaves a link only through
//! [`ChunkRef::take`] (the source becomes empty) or
//! [`ChunkRef::swap_ownership`] (the two tags trade places).

use std::fmt;
use std::mem;

use skein_core::ChunkId;

const OWNING: u32 = 1;

/// A link to a chunk that either owns it or observes it.
#[derive(Default, PartialEq, Eq)]
#[must_use]
pub struct ChunkRef {
    word: u32,
}

impl ChunkRef {
    /// A reference to nothing.
    pub const fn empty() -> Self {
        Self { word: 0 }
    }

    /// A reference that owns `id`.
    ///
    /// The caller must guarantee that no other live reference owns `id`.
    /// That is not checked here; [`OwnershipAudit`](crate::OwnershipAudit)
    /// detects a violation after the fact.
    pub fn owned(id: ChunkId) -> Self {
        Self {
            word: Self::pack(id) | OWNING,
        }
    }

    /// A reference that observes `id` and never releases it.
    pub fn observer(id: ChunkId) -> Self {
        Self {
            word: Self::pack(id),
        }
    }

    fn pack(id: ChunkId) -> u32 {
        // ChunkId::MAX_INDEX guarantees this cannot overflow.
        (id.as_u32() + 1) << 1
    }

    /// Move the identity and tag out, leaving this reference empty.
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Exchange ownership tags between two references to the same chunk.
    ///
    /// Whichever reference owned the chunk now observes it, and vice
    /// versa. Identities are unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the references are empty or address different chunks.
    pub fn swap_ownership(a: &mut Self, b: &mut Self) {
        assert!(
            !a.is_empty() && a.word & !OWNING == b.word & !OWNING,
            "ownership swap between different chunks: {a:?} and {b:?}"
        );
        let a_tag = a.word & OWNING;
        a.word = (a.word & !OWNING) | (b.word & OWNING);
        b.word = (b.word & !OWNING) | a_tag;
    }

    /// The referenced chunk.
    ///
    /// # Panics
    ///
    /// Panics if the reference is empty.
    pub fn get(&self) -> ChunkId {
        match self.target() {
            Some(id) => id,
            None => panic!("dereferenced an empty chunk reference"),
        }
    }

    /// The referenced chunk, or `None` if empty.
    pub fn target(&self) -> Option<ChunkId> {
        match self.word >> 1 {
            0 => None,
            // Any word built by `pack` decodes to an in-range id.
            n => ChunkId::new((n - 1) as usize).ok(),
        }
    }

    /// Whether this reference is responsible for releasing its chunk.
    pub fn is_owning(&self) -> bool {
        self.word & OWNING != 0
    }

    /// Whether this reference addresses a chunk without owning it.
    pub fn is_observer(&self) -> bool {
        !self.is_empty() && !self.is_owning()
    }

    /// Whether this reference addresses nothing.
    pub fn is_empty(&self) -> bool {
        self.word == 0
    }

    /// Whether this reference addresses `id`, regardless of tag.
    pub fn points_to(&self, id: ChunkId) -> bool {
        self.word & !OWNING == Self::pack(id)
    }

    /// The packed word, for diagnostics.
    pub fn word(&self) -> u32 {
        self.word
    }
}

impl fmt::Debug for ChunkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target() {
            None => write!(f, "ChunkRef(empty)"),
            Some(id) if self.is_owning() => write!(f, "ChunkRef(owns {id})"),
            Some(id) => write!(f, "ChunkRef(observes {id})"),
        }
    }
}
