//! Benchmarks for trellis-incremental.
//!
//! Target: a small-delta pipeline step should stay well under a millisecond
//! against a large accumulated state.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trellis_algebra::{IndexedZSet, IntWeight, ZSet};
use trellis_core::Value;
use trellis_incremental::{
    IncrementalDistinct, IncrementalJoin, IncrementalRelation, Pipeline,
};

fn leaf(range: impl Iterator<Item = i64>) -> IndexedZSet<Value, IntWeight> {
    IndexedZSet::from_zset(
        ZSet::from_entries(range.map(|v| (Value::Int(v), IntWeight(1)))).unwrap(),
    )
}

fn loaded_pipeline(size: i64) -> Pipeline<IntWeight> {
    let join = IncrementalJoin::new(
        1,
        vec![
            IncrementalRelation::new(vec![0]).unwrap(),
            IncrementalRelation::new(vec![0]).unwrap(),
        ],
    )
    .unwrap();
    let mut pipeline = Pipeline::new(join, vec![Box::new(IncrementalDistinct::new())]);
    // Preload both relations with `size` facts sharing every other key.
    pipeline
        .step(vec![
            leaf((0..size).map(|v| v * 2)),
            leaf((0..size).map(|v| v * 3)),
        ])
        .unwrap();
    pipeline
}

fn bench_pipeline_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_step");

    for size in [100i64, 1_000, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("single_insert", size),
            &size,
            |b, &size| {
                let mut pipeline = loaded_pipeline(size);
                let mut key = 1i64;
                b.iter(|| {
                    // A fresh key per iteration keeps the state growing.
                    key += 2;
                    let out = pipeline
                        .step(vec![leaf([key].into_iter()), leaf([key].into_iter())])
                        .unwrap();
                    black_box(out)
                })
            },
        );
    }

    group.finish();
}

fn bench_distinct_delta(c: &mut Criterion) {
    let mut group = c.benchmark_group("distinct");

    for size in [1usize, 10, 100, 1_000] {
        group.bench_with_input(
            BenchmarkId::new("toggle_batch", size),
            &size,
            |b, &size| {
                let mut pipeline = loaded_pipeline(10_000);
                let batch: Vec<i64> = (0..size as i64).map(|v| v * 6).collect();
                b.iter(|| {
                    let insert = pipeline
                        .step(vec![
                            leaf(batch.iter().copied()),
                            leaf(batch.iter().copied()),
                        ])
                        .unwrap();
                    let delete = pipeline
                        .step(vec![
                            leaf(batch.iter().copied()).negate().unwrap(),
                            leaf(batch.iter().copied()).negate().unwrap(),
                        ])
                        .unwrap();
                    black_box((insert, delete))
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline_step, bench_distinct_delta);
criterion_main!(benches);
