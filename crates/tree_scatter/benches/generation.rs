mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tree_scatter::prelude::{
    serialize, DensitySampler, FlatGround, GeneratorConfig, LuminanceMap, PlacementGenerator,
};

const COUNTS: [usize; 3] = [1_000, 10_000, 100_000];

fn radial_map(size: u32) -> LuminanceMap {
    let c = (size as f32 - 1.0) * 0.5;
    let data = (0..size * size)
        .map(|i| {
            let dx = (i % size) as f32 - c;
            let dy = (i / size) as f32 - c;
            (1.0 - (dx * dx + dy * dy).sqrt() / c).clamp(0.0, 1.0)
        })
        .collect();
    LuminanceMap::new(size, size, data).expect("valid map")
}

fn generation_benches(c: &mut Criterion) {
    let ground = FlatGround::new(0.0);
    let density = DensitySampler::with_map(radial_map(256));

    for (label, with_map) in [("uniform", false), ("density_map", true)] {
        let mut group = c.benchmark_group(format!("generation/{label}"));
        for &count in &COUNTS {
            group.throughput(common::candidates(count));
            let config = GeneratorConfig::new(count, 7500.0).with_progress_interval(0);
            let mut generator = PlacementGenerator::try_new(config, &ground).expect("valid");
            if with_map {
                generator = generator.with_density(density.clone());
            }
            let mut rng = common::seeded_rng(label, count);

            group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
                b.iter(|| {
                    let doc = generator.generate(&mut rng);
                    black_box(doc.objects.len());
                });
            });
        }
        group.finish();
    }
}

fn serialization_benches(c: &mut Criterion) {
    let ground = FlatGround::new(0.0);
    let config = GeneratorConfig::new(10_000, 7500.0).with_progress_interval(0);
    let generator = PlacementGenerator::try_new(config, &ground).expect("valid");
    let doc = generator.generate(&mut common::seeded_rng("serialize", 10_000));

    let mut group = c.benchmark_group("serialize");
    group.throughput(common::candidates(doc.objects.len()));
    for pretty in [false, true] {
        let doc = doc.clone().with_pretty_print(pretty);
        group.bench_with_input(BenchmarkId::from_parameter(pretty), &pretty, |b, _| {
            b.iter(|| black_box(serialize(&doc).expect("serialize").len()));
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = common::placement_criterion();
    targets = generation_benches, serialization_benches
}
criterion_main!(benches);
