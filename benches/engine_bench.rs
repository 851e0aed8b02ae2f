//! Benchmarks for signal evaluation and the block pipeline.
//!
//! Run with: cargo bench
//!
//! Every block must render comfortably inside its playback window for
//! the one-block-ahead pipeline to hold. Reference deadlines at 48kHz:
//!   - 256 samples  = 5.33ms
//!   - 1024 samples = 21.33ms
//!   - 4096 samples = 85.33ms

use criterion::{criterion_group, criterion_main};

mod render;

/// Block lengths exercised by every group.
pub const BLOCK_SIZES: &[usize] = &[256, 1024, 4096];

criterion_group!(
    benches,
    render::bench_generators,
    render::bench_voices,
    render::bench_track,
    render::bench_scheduler,
);
criterion_main!(benches);
