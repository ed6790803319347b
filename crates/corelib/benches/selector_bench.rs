// Criterion benchmarks for dispatch-core selectors
//
// Run benchmarks with:
//   cargo bench -p dispatch-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dispatch_core::node::Node;
use dispatch_core::partitioner::Xxh3Partitioner;
use dispatch_core::ring::{HashRing, RingBuilder};
use dispatch_core::wrr::WeightedRoundRobin;

fn nodes(count: u32) -> Vec<Node> {
    (0..count)
        .map(|i| Node::new(format!("node-{}", i), format!("node-{}", i)).with_weight(i % 5 + 1))
        .collect()
}

fn bench_wrr_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("wrr_select");

    for count in [3, 10, 50].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let mut rr = WeightedRoundRobin::new(&nodes(count));
            b.iter(|| black_box(rr.select()));
        });
    }

    group.finish();
}

fn bench_ring_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_select");

    for count in [3, 10, 50].iter() {
        group.bench_with_input(BenchmarkId::new("string_hash", count), count, |b, &count| {
            let ring = HashRing::new(&nodes(count));
            b.iter(|| black_box(ring.select(black_box("user-4242"))));
        });
        group.bench_with_input(BenchmarkId::new("xxh3", count), count, |b, &count| {
            let ring = RingBuilder::new()
                .ring_size(1 << 16)
                .partitioner(Xxh3Partitioner)
                .add_nodes(&nodes(count))
                .build();
            b.iter(|| black_box(ring.select(black_box("user-4242"))));
        });
    }

    group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild");
    let pool = nodes(50);

    group.bench_function("wrr_50_nodes", |b| {
        b.iter(|| WeightedRoundRobin::new(black_box(&pool)));
    });
    group.bench_function("ring_50_nodes", |b| {
        b.iter(|| HashRing::new(black_box(&pool)));
    });

    group.finish();
}

criterion_group!(benches, bench_wrr_select, bench_ring_select, bench_rebuild);
criterion_main!(benches);
