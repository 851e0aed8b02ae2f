//! Benchmarks for block rendering paths.

mod generators;
mod scheduler;
mod track;
mod voices;

pub use generators::bench_generators;
pub use scheduler::bench_scheduler;
pub use track::bench_track;
pub use voices::bench_voices;

use blockwave::DEFAULT_SAMPLE_RATE;

/// Timestamps for one block starting at `from` seconds.
pub fn block_ts(from: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| from + i as f64 / DEFAULT_SAMPLE_RATE as f64)
        .collect()
}
