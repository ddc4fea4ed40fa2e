//! Benchmark for lattice and value noise sampling.
//!
//! Compares the permutation-table and direct-hash lattice strategies.
//!
//! Run with: cargo bench --package strata_procedural --bench noise_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata_procedural::noise::{CoordinateNoiseField, LatticeStrategy, WorldSeed};
use strata_procedural::octave::OctaveSynthesizer;

fn benchmark_lattice_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lattice_lookup");

    for (name, strategy) in [
        ("permutation", LatticeStrategy::Permutation),
        ("direct_hash", LatticeStrategy::DirectHash),
    ] {
        let field = CoordinateNoiseField::new(WorldSeed::new(42), strategy);
        group.bench_function(name, |b| {
            let mut x = 0i32;
            b.iter(|| {
                x = x.wrapping_add(1);
                black_box(field.value_at(black_box(x), black_box(x / 3)))
            });
        });
    }

    group.finish();
}

fn benchmark_value_noise(c: &mut Criterion) {
    let field = CoordinateNoiseField::new(WorldSeed::new(42), LatticeStrategy::Permutation);

    let mut group = c.benchmark_group("value_noise");
    group.throughput(Throughput::Elements(1_000_000));
    group.sample_size(10);

    group.bench_function("1M_samples", |b| {
        b.iter(|| {
            for i in 0..1_000_000 {
                let x = f64::from(i % 1000) * 0.1;
                let z = f64::from(i / 1000) * 0.1;
                black_box(field.sample(x, z));
            }
        });
    });

    group.finish();
}

fn benchmark_octaves(c: &mut Criterion) {
    let field = CoordinateNoiseField::new(WorldSeed::new(42), LatticeStrategy::Permutation);

    let mut group = c.benchmark_group("octave_synthesis");
    for octaves in [1u32, 4, 8] {
        let synth = OctaveSynthesizer::new(octaves, 0.5, 1.0);
        group.bench_function(format!("{octaves}_octaves"), |b| {
            let mut x = 0.0f64;
            b.iter(|| {
                x += 0.02;
                black_box(synth.synthesize(&field, black_box(x), black_box(x * 0.7)))
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_lattice_lookup,
    benchmark_value_noise,
    benchmark_octaves
);
criterion_main!(benches);
