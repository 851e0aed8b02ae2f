//! Benchmarks for the full block pipeline: queue, render, pull.

use std::hint::black_box;

use blockwave::voices::{epiano, vinyl};
use blockwave::{BlockScheduler, EngineConfig};
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_scheduler(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/scheduler");

    for &size in BLOCK_SIZES {
        let config = EngineConfig {
            sample_rate: 48_000,
            block_len: size,
        };
        let (mut scheduler, mut worker, handle) =
            BlockScheduler::with_config(config).unwrap();
        handle.plug(epiano(440.0) * 0.5);
        handle.plug(vinyl() * 0.3);
        handle.play();

        let mut out = vec![0i16; size];
        scheduler.pull(&mut out); // prime the pipeline

        group.bench_with_input(BenchmarkId::new("mix", size), &size, |b, _| {
            b.iter(|| {
                worker.run_once();
                scheduler.pull(black_box(&mut out));
            })
        });
    }

    group.finish();
}
