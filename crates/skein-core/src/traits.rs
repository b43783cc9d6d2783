//! Observer trait for chunk lifecycle tracing.

use crate::id::{ChunkId, ChunkSerial};

/// A chunk lifecycle event reported by an arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkEvent {
    /// A chunk was allocated and spliced into the chain.
    Allocated {
        /// Slot the chunk occupies.
        id: ChunkId,
        /// Construction serial.
        serial: ChunkSerial,
    },
    /// A chunk's storage was handed back to the allocator.
    Released {
        /// Slot the chunk occupied.
        id: ChunkId,
        /// Construction serial.
        serial: ChunkSerial,
    },
    /// Ownership of the ring was advanced by one link.
    Rotated {
        /// The chunk that is now the head.
        head: ChunkId,
    },
}

/// Receives chunk lifecycle events from an arena.
///
/// Observers are injected per arena instance; there is no global
/// registry. Implementations must not panic.
pub trait ChunkObserver {
    /// Called once per event, in the order the events happen.
    fn on_event(&mut self, event: &ChunkEvent);
}

impl<F> ChunkObserver for F
where
    F: FnMut(&ChunkEvent),
{
    fn on_event(&mut self, event: &ChunkEvent) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_observers() {
        let mut seen = Vec::new();
        {
            let mut observer = |e: &ChunkEvent| seen.push(*e);
            let id = ChunkId::new(0).unwrap();
            observer.on_event(&ChunkEvent::Allocated {
                id,
                serial: ChunkSerial(0),
            });
            observer.on_event(&ChunkEvent::Rotated { head: id });
        }
        assert_eq!(seen.len(), 2);
        assert!(matches!(seen[1], ChunkEvent::Rotated { .. }));
    }
}
