use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rtrb::{Consumer, Producer};

use super::scheduler::{RenderTask, ResultBlock, Shared};
use super::{clip, quantize};

/// How long `run` parks between polls when no wake arrives.
const IDLE_POLL: Duration = Duration::from_millis(1);

/// The background half of the engine: pops [`RenderTask`]s, evaluates
/// every plugged signal over the block's timestamps, mixes, clips, and
/// quantizes into a recycled i16 buffer.
///
/// `run` is the thread loop the [`Player`](super::Player) spawns;
/// `run_once` processes a single task synchronously, which lets tests
/// step the pipeline without threads or a device.
pub struct RenderWorker {
    shared: Arc<Shared>,
    jobs: Consumer<RenderTask>,
    results: Producer<ResultBlock>,
    spares: Consumer<Vec<i16>>,
    ts: Vec<f64>,
    mix: Vec<f64>,
    voice: Vec<f64>,
    /// Miss count already reported, so the log only moves on change.
    seen_missed: u64,
}

impl RenderWorker {
    pub(crate) fn new(
        shared: Arc<Shared>,
        jobs: Consumer<RenderTask>,
        results: Producer<ResultBlock>,
        spares: Consumer<Vec<i16>>,
    ) -> Self {
        let n = shared.config.block_len;
        RenderWorker {
            shared,
            jobs,
            results,
            spares,
            ts: vec![0.0; n],
            mix: vec![0.0; n],
            voice: vec![0.0; n],
            seen_missed: 0,
        }
    }

    /// Renders queued tasks until shutdown. Parks while idle; the
    /// scheduler unparks it whenever a task is queued.
    pub fn run(mut self) {
        let _ = self.shared.worker_thread.set(thread::current());
        tracing::debug!("render worker up");
        while !self.shared.shutdown.load(Ordering::Acquire) {
            if !self.run_once() {
                thread::park_timeout(IDLE_POLL);
            }
        }
        tracing::debug!("render worker down");
    }

    /// Pops and renders at most one task. Returns whether one ran.
    pub fn run_once(&mut self) -> bool {
        let Ok(task) = self.jobs.pop() else {
            return false;
        };
        self.render(task);
        true
    }

    fn render(&mut self, task: RenderTask) {
        let config = self.shared.config;
        let n = config.block_len;

        let first = task.block * n as u64;
        for (i, t) in self.ts.iter_mut().enumerate() {
            *t = (first + i as u64) as f64 / config.sample_rate as f64;
        }

        self.mix.fill(0.0);
        {
            let inputs = self.shared.inputs.lock().unwrap();
            for signal in inputs.iter() {
                signal.eval_into(&self.ts, &mut self.voice);
                for (m, v) in self.mix.iter_mut().zip(&self.voice) {
                    *m += v;
                }
            }
        }

        let mut samples = self.spares.pop().unwrap_or_else(|_| vec![0; n]);
        samples.resize(n, 0);
        for (s, &v) in samples.iter_mut().zip(&self.mix) {
            *s = quantize(clip(v));
        }

        // if the device side stopped draining, the block is dropped
        let _ = self.results.push(ResultBlock {
            epoch: task.epoch,
            samples,
        });

        self.shared.pending.fetch_sub(1, Ordering::AcqRel);
        self.shared.mark_completed();

        // the callback only counts misses; reporting happens here
        let missed = self.shared.missed.load(Ordering::Relaxed);
        if missed != self.seen_missed {
            self.seen_missed = missed;
            tracing::warn!(missed, "device pulled before the block was ready");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scheduler::BlockScheduler;
    use crate::engine::EngineConfig;
    use crate::signal::Signal;

    #[test]
    fn idle_worker_reports_nothing_to_do() {
        let (_scheduler, mut worker, _handle) = BlockScheduler::new();
        assert!(!worker.run_once());
    }

    #[test]
    fn mixed_inputs_sum_before_the_clip() {
        let config = EngineConfig {
            sample_rate: 48_000,
            block_len: 64,
        };
        let (mut scheduler, mut worker, handle) =
            BlockScheduler::with_config(config).unwrap();
        handle.plug(Signal::constant(0.75));
        handle.plug(Signal::constant(0.75));
        handle.play();

        let mut out = vec![0i16; 64];
        scheduler.pull(&mut out);
        assert!(worker.run_once());
        scheduler.pull(&mut out);
        // 0.75 + 0.75 saturates the clip stage
        assert!(out.iter().all(|&s| s == 32767));
    }

    #[test]
    fn non_finite_samples_leave_the_engine_as_silence() {
        let config = EngineConfig {
            sample_rate: 48_000,
            block_len: 32,
        };
        let (mut scheduler, mut worker, handle) =
            BlockScheduler::with_config(config).unwrap();
        handle.plug(Signal::from_rule("nan", |_| f64::NAN));
        handle.play();

        let mut out = vec![0i16; 32];
        scheduler.pull(&mut out);
        assert!(worker.run_once());
        scheduler.pull(&mut out);
        assert!(out.iter().all(|&s| s == 0));
    }

    #[test]
    fn completion_counter_tracks_rendered_tasks() {
        let (mut scheduler, mut worker, handle) = BlockScheduler::new();
        handle.play();
        let mut out = vec![0i16; 1024];

        assert_eq!(handle.rendered_blocks(), 0);
        scheduler.pull(&mut out);
        assert!(worker.run_once());
        assert_eq!(handle.rendered_blocks(), 1);
        scheduler.pull(&mut out);
        assert!(worker.run_once());
        assert_eq!(handle.rendered_blocks(), 2);
        assert!(handle.wait_until_rendered(2, Duration::from_millis(1)));
    }
}
