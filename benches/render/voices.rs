//! Benchmarks for the stock instrument patches.

use std::hint::black_box;

use blockwave::voices::{crackle, epiano, vinyl};
use criterion::{BenchmarkId, Criterion};

use super::block_ts;
use crate::BLOCK_SIZES;

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/voices");

    for &size in BLOCK_SIZES {
        let ts = block_ts(0.0, size);
        let mut out = vec![0.0f64; size];

        let pops = crackle(8.0);
        group.bench_with_input(BenchmarkId::new("crackle", size), &size, |b, _| {
            b.iter(|| pops.eval_into(black_box(&ts), black_box(&mut out)))
        });

        let surface = vinyl();
        group.bench_with_input(BenchmarkId::new("vinyl", size), &size, |b, _| {
            b.iter(|| surface.eval_into(black_box(&ts), black_box(&mut out)))
        });

        // eight sine partials per sample
        let keys = epiano(440.0);
        group.bench_with_input(BenchmarkId::new("epiano", size), &size, |b, _| {
            b.iter(|| keys.eval_into(black_box(&ts), black_box(&mut out)))
        });
    }

    group.finish();
}
