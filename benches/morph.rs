//! Benchmarks for cloud generation and the per-frame morph step.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use nebula::{CloudKind, Morph, Palette, ParticleClouds, SpawnContext, PARTICLE_COUNT};

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    let palette = Palette::celestial();

    for count in [1_000usize, PARTICLE_COUNT] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut ctx = SpawnContext::from_seed(1);
            b.iter(|| black_box(ParticleClouds::generate(count, &palette, &mut ctx)))
        });
    }

    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("morph_tick");
    let mut ctx = SpawnContext::from_seed(2);
    let clouds = match ParticleClouds::generate(PARTICLE_COUNT, &Palette::celestial(), &mut ctx) {
        Ok(clouds) => clouds,
        Err(err) => panic!("generation failed: {}", err),
    };

    for kind in [CloudKind::Heart, CloudKind::Explosion] {
        group.bench_function(format!("{:?}", kind), |b| {
            let mut morph = Morph::new(clouds.positions(CloudKind::Tree), 0.08, 0.001);
            let target = clouds.positions(kind);
            b.iter(|| {
                morph.tick(black_box(target));
                black_box(morph.positions()[0])
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_generate, bench_tick);
criterion_main!(benches);
