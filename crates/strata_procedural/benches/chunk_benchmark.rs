//! Benchmark for chunk generation and window streaming.
//!
//! Run with: cargo bench --package strata_procedural --bench chunk_benchmark

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata_procedural::{
    Chunk, ChunkCoord, StreamerConfig, TerrainGenerator, WorldSeed, WorldStreamer,
};

fn benchmark_single_chunk(c: &mut Criterion) {
    let gen = TerrainGenerator::with_seed(WorldSeed::new(42));

    c.bench_function("single_chunk_generation", |b| {
        let mut coord = 0i32;
        b.iter(|| {
            // Cycle well inside the world limit
            coord = (coord + 1) % 4096;
            black_box(Chunk::generate(ChunkCoord::new(coord, coord / 2), 16, &gen))
        });
    });
}

fn benchmark_chunk_grid(c: &mut Criterion) {
    let gen = TerrainGenerator::with_seed(WorldSeed::new(42));

    let mut group = c.benchmark_group("chunk_grid");

    // 16x16 chunks = 256x256 columns
    group.throughput(Throughput::Elements(16 * 16));
    group.bench_function("16x16_chunks", |b| {
        b.iter(|| {
            for z in 0..16 {
                for x in 0..16 {
                    let _ = black_box(Chunk::generate(ChunkCoord::new(x, z), 16, &gen));
                }
            }
        });
    });

    group.finish();
}

fn benchmark_streaming_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("streaming");
    group.sample_size(10);

    for workers in [1usize, 4] {
        group.bench_function(format!("walk_64_chunks_{workers}_workers"), |b| {
            b.iter(|| {
                let generator = Arc::new(TerrainGenerator::with_seed(WorldSeed::new(42)));
                let config = StreamerConfig {
                    chunk_size: 16,
                    render_distance: 3,
                    worker_threads: workers,
                };
                let Ok(mut world) = WorldStreamer::new(generator, config) else {
                    return;
                };
                for step in 0..64 {
                    let x = step as f32 * 16.0 + 8.0;
                    let _ = black_box(world.check_boundary([x, 50.0, 8.0]));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_single_chunk,
    benchmark_chunk_grid,
    benchmark_streaming_walk
);
criterion_main!(benches);
