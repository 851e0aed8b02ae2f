//! Benchmarks for note-stream rendering.

use std::hint::black_box;

use blockwave::sequencing::{Pitch, Pitcher, Sequencer};
use blockwave::sine;
use blockwave::voices::epiano;
use criterion::{BenchmarkId, Criterion};

use super::block_ts;
use crate::BLOCK_SIZES;

pub fn bench_track(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/track");
    let steps = Sequencer::with_steps(16, 0.125);

    let plain = Pitcher::new()
        .source(&steps)
        .base(sine(Pitch::C4.frequency()))
        .build()
        .unwrap();
    let rich = Pitcher::new()
        .source(&steps)
        .base(epiano(Pitch::C4.frequency()))
        .build()
        .unwrap();

    for &size in BLOCK_SIZES {
        // one second in: active notes plus lingering release tails
        let ts = block_ts(1.0, size);
        let mut out = vec![0.0f64; size];

        group.bench_with_input(BenchmarkId::new("sine_base", size), &size, |b, _| {
            b.iter(|| plain.eval_into(black_box(&ts), black_box(&mut out)))
        });

        group.bench_with_input(BenchmarkId::new("epiano_base", size), &size, |b, _| {
            b.iter(|| rich.eval_into(black_box(&ts), black_box(&mut out)))
        });
    }

    group.finish();
}
