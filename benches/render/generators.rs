//! Benchmarks for the leaf generators.

use std::hint::black_box;

use blockwave::{decay, noise, saw, shot_noise, sine, square};
use criterion::{BenchmarkId, Criterion};

use super::block_ts;
use crate::BLOCK_SIZES;

pub fn bench_generators(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/generators");

    for &size in BLOCK_SIZES {
        let ts = block_ts(0.0, size);
        let mut out = vec![0.0f64; size];

        let tone = sine(440.0);
        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, _| {
            b.iter(|| tone.eval_into(black_box(&ts), black_box(&mut out)))
        });

        let ramp = saw(440.0);
        group.bench_with_input(BenchmarkId::new("saw", size), &size, |b, _| {
            b.iter(|| ramp.eval_into(black_box(&ts), black_box(&mut out)))
        });

        let pulse = square(440.0);
        group.bench_with_input(BenchmarkId::new("square", size), &size, |b, _| {
            b.iter(|| pulse.eval_into(black_box(&ts), black_box(&mut out)))
        });

        let fade = decay(3.0);
        group.bench_with_input(BenchmarkId::new("decay", size), &size, |b, _| {
            b.iter(|| fade.eval_into(black_box(&ts), black_box(&mut out)))
        });

        // thread-local RNG per sample
        let hiss = noise();
        group.bench_with_input(BenchmarkId::new("noise", size), &size, |b, _| {
            b.iter(|| hiss.eval_into(black_box(&ts), black_box(&mut out)))
        });

        let pops = shot_noise(1000.0);
        group.bench_with_input(BenchmarkId::new("shot_noise", size), &size, |b, _| {
            b.iter(|| pops.eval_into(black_box(&ts), black_box(&mut out)))
        });
    }

    group.finish();
}
