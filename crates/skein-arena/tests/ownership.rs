//! Integration tests: single ownership, leak-freedom, and transactional
//! growth, observed through instrumented allocators.

use std::collections::HashSet;

use skein_arena::{ArenaConfig, ArenaError, ChunkArena, Topology};
use skein_core::ChunkEvent;
use skein_test_utils::{CountingAllocator, FailingAllocator, RecordingObserver};

fn u32_config(topology: Topology) -> ArenaConfig {
    let mut config = ArenaConfig::for_element::<u32>(64);
    config.topology = topology;
    config
}

// ── Concrete scenario ────────────────────────────────────────────────

#[test]
fn three_grows_then_drop_releases_three_distinct_chunks() {
    let alloc = CountingAllocator::new();
    let log = alloc.log();
    {
        let mut arena = ChunkArena::with_allocator(u32_config(Topology::Linear), alloc).unwrap();
        assert_eq!(arena.payload_capacity_per_chunk(), 14);
        for _ in 0..3 {
            arena.grow().unwrap();
        }
        assert_eq!(arena.chunk_count(), 3);
        assert_eq!(log.borrow().live(), 3);
    }
    let log = log.borrow();
    assert_eq!(log.failures, 0);
    assert_eq!(log.released.len(), 3);
    assert!(!log.has_double_release());
    let allocated: HashSet<_> = log.allocated.iter().collect();
    let released: HashSet<_> = log.released.iter().collect();
    assert_eq!(allocated, released);
}

// ── Failure scenario ─────────────────────────────────────────────────

#[test]
fn second_allocation_failure_keeps_one_chunk() {
    let alloc = FailingAllocator::fail_on(2);
    let log = alloc.log();
    let mut arena = ChunkArena::with_allocator(u32_config(Topology::Linear), alloc).unwrap();

    arena.grow().unwrap();
    assert_eq!(arena.chunk_count(), 1);

    let err = arena.grow().unwrap_err();
    assert!(matches!(err, ArenaError::AllocationFailure { .. }));
    assert_eq!(arena.chunk_count(), 1);
    assert_eq!(arena.tail(), arena.head());
    assert!(arena.audit().is_sound());
    assert_eq!(log.borrow().failures, 1);

    // The failure was transient; growth resumes from the same tail.
    arena.grow().unwrap();
    assert_eq!(arena.chunk_count(), 2);
    assert_eq!(arena.iter().count(), 2);
}

#[test]
fn failed_ring_growth_keeps_the_ring_closed() {
    let alloc = FailingAllocator::fail_from(3);
    let mut arena = ChunkArena::with_allocator(u32_config(Topology::Circular), alloc).unwrap();
    let head = arena.grow().unwrap();
    let tail = arena.grow().unwrap();
    assert!(arena.grow().is_err());

    let back = arena.chunk(tail).unwrap().next();
    assert!(back.is_observer());
    assert_eq!(back.get(), head);
    assert!(arena.audit().is_sound());
}

// ── No leak on destruction ───────────────────────────────────────────

#[test]
fn drop_releases_exactly_n_chunks_for_both_topologies() {
    for topology in [Topology::Linear, Topology::Circular] {
        for n in [0usize, 1, 2, 7, 64] {
            let alloc = CountingAllocator::new();
            let log = alloc.log();
            {
                let mut arena = ChunkArena::with_allocator(u32_config(topology), alloc).unwrap();
                for _ in 0..n {
                    arena.grow().unwrap();
                }
            }
            let log = log.borrow();
            assert_eq!(log.allocated.len(), n, "{topology:?} n={n}");
            assert_eq!(log.released.len(), n, "{topology:?} n={n}");
            assert!(!log.has_double_release());
        }
    }
}

#[test]
fn rotations_never_cause_double_release() {
    let alloc = CountingAllocator::new();
    let log = alloc.log();
    {
        let mut arena = ChunkArena::with_allocator(u32_config(Topology::Circular), alloc).unwrap();
        for i in 0..10 {
            arena.grow().unwrap();
            for _ in 0..i {
                arena.rotate().unwrap();
            }
            assert!(arena.audit().is_sound());
        }
    }
    let log = log.borrow();
    assert_eq!(log.released.len(), 10);
    assert!(!log.has_double_release());
}

// ── Single ownership ─────────────────────────────────────────────────

#[test]
fn every_live_chunk_has_one_owner_after_each_grow() {
    for topology in [Topology::Linear, Topology::Circular] {
        let mut arena = ChunkArena::new(u32_config(topology)).unwrap();
        for expected in 1..=32 {
            arena.grow().unwrap();
            let audit = arena.audit();
            assert!(audit.is_sound(), "{topology:?} after {expected} grows");
            assert_eq!(audit.len(), expected);
            let owners: u32 = audit.iter().map(|(_, t)| t.owners).sum();
            assert_eq!(owners as usize, expected);
        }
    }
}

// ── Tail cache and ring closure ──────────────────────────────────────

#[test]
fn tail_cache_names_the_chunk_the_next_grow_rewrites() {
    let mut arena = ChunkArena::new(u32_config(Topology::Linear)).unwrap();
    let mut previous = arena.grow().unwrap();
    for _ in 0..16 {
        assert_eq!(arena.tail(), Some(previous));
        let next = arena.grow().unwrap();
        let link = arena.chunk(previous).unwrap().next();
        assert!(link.is_owning());
        assert_eq!(link.get(), next);
        previous = next;
    }
}

#[test]
fn ring_of_k_chunks_returns_to_head_after_k_hops() {
    let mut arena = ChunkArena::new(u32_config(Topology::Circular)).unwrap();
    arena.grow().unwrap();
    for k in 2..=12 {
        arena.grow().unwrap();
        let head = arena.head().unwrap();
        let mut current = head;
        let mut observers = 0;
        for _ in 0..k {
            let link = arena.chunk(current).unwrap().next();
            if link.is_observer() {
                observers += 1;
            }
            current = link.get();
        }
        assert_eq!(current, head);
        assert_eq!(observers, 1, "exactly one back-reference in a ring of {k}");
    }
}

// ── Observer tracing ─────────────────────────────────────────────────

#[test]
fn observer_sees_one_release_per_allocation() {
    let observer = RecordingObserver::new();
    {
        let mut arena = ChunkArena::new(u32_config(Topology::Circular))
            .unwrap()
            .with_observer(observer.clone());
        for _ in 0..5 {
            arena.grow().unwrap();
        }
        arena.rotate().unwrap();
    }
    assert_eq!(observer.allocated(), 5);
    assert_eq!(observer.released(), 5);

    let serials: Vec<_> = observer
        .events()
        .into_iter()
        .filter_map(|e| match e {
            ChunkEvent::Released { serial, .. } => Some(serial.0),
            _ => None,
        })
        .collect();
    // Rotation moved the head to the chunk with serial 1.
    assert_eq!(serials, vec![1, 2, 3, 4, 0]);
}

#[test]
fn payload_writes_survive_growth() {
    let mut arena = ChunkArena::new(u32_config(Topology::Linear)).unwrap();
    let first = arena.grow().unwrap();
    let per_chunk = arena.payload_capacity_per_chunk();
    {
        let payload = arena.chunk_mut(first).unwrap().payload_mut();
        for (i, slot) in payload.chunks_exact_mut(4).take(per_chunk).enumerate() {
            slot.copy_from_slice(&(i as u32).to_ne_bytes());
        }
    }
    for _ in 0..8 {
        arena.grow().unwrap();
    }
    let payload = arena.chunk(first).unwrap().payload();
    for (i, slot) in payload.chunks_exact(4).take(per_chunk).enumerate() {
        assert_eq!(u32::from_ne_bytes(slot.try_into().unwrap()), i as u32);
    }
}
