//! Criterion micro-benchmarks for chain growth, rotation, release, and bump allocation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use skein_arena::{BumpArena, ChunkArena, Topology};
use skein_bench::{filled, grow_by_walk, page_profile, small_chunk_profile};

const CHAIN_LENGTHS: [usize; 3] = [64, 512, 4096];

/// Cached-tail growth against walk-then-grow, for increasing chain lengths.
fn bench_grow(c: &mut Criterion) {
    let mut group = c.benchmark_group("grow");
    for &n in &CHAIN_LENGTHS {
        group.bench_with_input(BenchmarkId::new("cached_tail", n), &n, |b, &n| {
            b.iter(|| {
                let mut arena = ChunkArena::new(small_chunk_profile(Topology::Linear)).unwrap();
                for _ in 0..n {
                    black_box(arena.grow().unwrap());
                }
                black_box(arena.chunk_count());
            });
        });
        group.bench_with_input(BenchmarkId::new("walk_to_tail", n), &n, |b, &n| {
            b.iter(|| {
                let mut arena = ChunkArena::new(small_chunk_profile(Topology::Linear)).unwrap();
                for _ in 0..n {
                    grow_by_walk(&mut arena).unwrap();
                }
                black_box(arena.chunk_count());
            });
        });
    }
    group.finish();
}

fn bench_ring_grow_page(c: &mut Criterion) {
    c.bench_function("ring_grow_page_512", |b| {
        b.iter(|| {
            let arena = filled(page_profile(Topology::Circular), 512).unwrap();
            black_box(arena.capacity_bytes());
        });
    });
}

fn bench_rotate(c: &mut Criterion) {
    let mut arena = filled(small_chunk_profile(Topology::Circular), 1024).unwrap();
    c.bench_function("rotate_ring_1k", |b| {
        b.iter(|| {
            arena.rotate().unwrap();
            black_box(arena.head());
        });
    });
}

fn bench_iter(c: &mut Criterion) {
    let arena = filled(small_chunk_profile(Topology::Circular), 4096).unwrap();
    c.bench_function("iter_ring_4k", |b| {
        b.iter(|| {
            let total: usize = arena.iter().map(|chunk| chunk.payload().len()).sum();
            black_box(total);
        });
    });
}

fn bench_bump(c: &mut Criterion) {
    let mut bump = BumpArena::new(64 * 1024, 16).unwrap();
    c.bench_function("bump_alloc_lifo_1k", |b| {
        b.iter(|| {
            let mut blocks = Vec::with_capacity(1024);
            for i in 0..1024 {
                if let Some(block) = bump.allocate(1 + i % 48) {
                    blocks.push(block);
                }
            }
            while let Some(block) = blocks.pop() {
                black_box(bump.deallocate(block));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_grow,
    bench_ring_grow_page,
    bench_rotate,
    bench_iter,
    bench_bump
);
criterion_main!(benches);
