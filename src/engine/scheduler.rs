use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, OnceLock};
use std::thread::Thread;
use std::time::{Duration, Instant};

use rtrb::{Consumer, Producer, RingBuffer};

use crate::signal::Signal;

use super::worker::RenderWorker;
use super::{EngineConfig, EngineError};

/*
One Block Ahead
===============

The sound card asks for samples on a hard deadline, so nothing may be
computed inside its callback. Instead the engine keeps exactly one
block of slack: while the device plays block n, the worker renders
block n + 1. The callback side of that bargain is the BlockScheduler,
whose pull() does three cheap things and nothing else:

  copy     hand the most recently finished block to the device
  advance  bump the block cursor
  queue    push a RenderTask for the block the next pull will need

All traffic between the callback and the worker flows through three
wait-free rings:

  jobs     RenderTask requests, scheduler -> worker
  results  finished i16 blocks, worker -> scheduler
  spares   empty i16 buffers going back around for reuse

Sample buffers cycle spares -> worker -> results -> ready -> spares,
so the steady state allocates nothing on either side.

Late blocks
-----------

If the worker misses its deadline the scheduler replays the previous
block, counts a missed deadline, and keeps queueing. Once the worker
catches up, draining the results ring keeps only the newest block and
recycles the rest, which skips the late content instead of letting the
stream drift behind real time.

Reset
-----

reset() rewinds the cursor to zero and bumps an epoch counter. Blocks
rendered under an older epoch are recycled unheard on the next pull,
so a reset never lets stale audio through. It refuses to run during
playback or while a render is in flight.
*/

const RING_CAPACITY: usize = 4;

/// One queued unit of render-ahead work: evaluate the inputs over the
/// given block and quantize the mix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderTask {
    /// Index of the block to render, counted from the last reset.
    pub block: u64,
    pub(crate) epoch: u64,
}

/// A finished block on its way back to the device side.
pub(crate) struct ResultBlock {
    pub(crate) epoch: u64,
    pub(crate) samples: Vec<i16>,
}

/// State shared by the scheduler, the worker, and every handle.
pub(crate) struct Shared {
    pub(crate) config: EngineConfig,
    pub(crate) inputs: Mutex<Vec<Signal>>,
    /// Block cursor: index of the next block the device will receive.
    pub(crate) blocks: AtomicU64,
    /// Tasks queued but not yet rendered.
    pub(crate) pending: AtomicUsize,
    pub(crate) missed: AtomicU64,
    pub(crate) epoch: AtomicU64,
    pub(crate) playing: AtomicBool,
    pub(crate) shutdown: AtomicBool,
    /// Total tasks rendered, guarded so waiters can sleep on it.
    pub(crate) completed: Mutex<u64>,
    pub(crate) completed_cv: Condvar,
    pub(crate) worker_thread: OnceLock<Thread>,
}

impl Shared {
    fn new(config: EngineConfig) -> Self {
        Shared {
            config,
            inputs: Mutex::new(Vec::new()),
            blocks: AtomicU64::new(0),
            pending: AtomicUsize::new(0),
            missed: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
            playing: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            completed: Mutex::new(0),
            completed_cv: Condvar::new(),
            worker_thread: OnceLock::new(),
        }
    }

    pub(crate) fn wake_worker(&self) {
        if let Some(thread) = self.worker_thread.get() {
            thread.unpark();
        }
    }

    pub(crate) fn mark_completed(&self) {
        let mut done = self.completed.lock().unwrap();
        *done += 1;
        self.completed_cv.notify_all();
    }
}

/// The device-facing half of the engine. Owned by the audio callback;
/// `pull` must be the only thing called from the real-time thread.
pub struct BlockScheduler {
    shared: Arc<Shared>,
    jobs: Producer<RenderTask>,
    results: Consumer<ResultBlock>,
    spares: Producer<Vec<i16>>,
    ready: Vec<i16>,
    last_epoch: u64,
}

impl BlockScheduler {
    /// Builds a scheduler with the default 48 kHz / 1024-sample config.
    pub fn new() -> (BlockScheduler, RenderWorker, EngineHandle) {
        Self::with_config(EngineConfig::default()).expect("default config is valid")
    }

    pub fn with_config(
        config: EngineConfig,
    ) -> Result<(BlockScheduler, RenderWorker, EngineHandle), EngineError> {
        config.validate()?;
        let shared = Arc::new(Shared::new(config));
        let (jobs_tx, jobs_rx) = RingBuffer::<RenderTask>::new(RING_CAPACITY);
        let (results_tx, results_rx) = RingBuffer::<ResultBlock>::new(RING_CAPACITY);
        let (mut spares_tx, spares_rx) = RingBuffer::<Vec<i16>>::new(RING_CAPACITY);
        for _ in 0..RING_CAPACITY {
            let _ = spares_tx.push(vec![0; config.block_len]);
        }

        let scheduler = BlockScheduler {
            shared: Arc::clone(&shared),
            jobs: jobs_tx,
            results: results_rx,
            spares: spares_tx,
            ready: vec![0; config.block_len],
            last_epoch: 0,
        };
        let worker = RenderWorker::new(Arc::clone(&shared), jobs_rx, results_tx, spares_rx);
        let handle = EngineHandle { shared };
        Ok((scheduler, worker, handle))
    }

    /// Fills `out` with the next block of the stream.
    ///
    /// Called once per block from the device callback. While the
    /// transport is stopped it writes silence and holds position.
    pub fn pull(&mut self, out: &mut [i16]) {
        assert_eq!(out.len(), self.shared.config.block_len);
        if !self.shared.playing.load(Ordering::Acquire) {
            out.fill(0);
            return;
        }

        let epoch = self.shared.epoch.load(Ordering::Acquire);
        if epoch != self.last_epoch {
            self.last_epoch = epoch;
            self.ready.fill(0);
        }

        let mut took = false;
        while let Ok(block) = self.results.pop() {
            if block.epoch == epoch {
                // Newest finished block wins; earlier ones are skipped.
                let old = std::mem::replace(&mut self.ready, block.samples);
                let _ = self.spares.push(old);
                took = true;
            } else {
                let _ = self.spares.push(block.samples);
            }
        }

        if !took {
            if self.shared.pending.load(Ordering::Acquire) == 0 {
                // Empty pipeline: first pull after play() or reset().
                // Queue the block we are standing on and play silence
                // once while the worker fills the slack.
                out.fill(0);
                let block = self.shared.blocks.load(Ordering::Acquire);
                self.queue(RenderTask { block, epoch });
                return;
            }
            self.shared.missed.fetch_add(1, Ordering::Relaxed);
        }

        out.copy_from_slice(&self.ready);
        let next = self.shared.blocks.fetch_add(1, Ordering::AcqRel) + 1;
        self.queue(RenderTask { block: next, epoch });
    }

    fn queue(&mut self, task: RenderTask) {
        if self.jobs.push(task).is_ok() {
            self.shared.pending.fetch_add(1, Ordering::AcqRel);
            self.shared.wake_worker();
        } else {
            // Worker hopelessly behind; the request itself is lost.
            self.shared.missed.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Cloneable control surface for one engine instance.
#[derive(Clone)]
pub struct EngineHandle {
    shared: Arc<Shared>,
}

impl EngineHandle {
    pub fn config(&self) -> EngineConfig {
        self.shared.config
    }

    /// Adds a signal to the mix. Takes effect from the next block.
    pub fn plug(&self, signal: Signal) {
        self.shared.inputs.lock().unwrap().push(signal);
    }

    pub fn plug_all(&self, signals: impl IntoIterator<Item = Signal>) {
        let mut inputs = self.shared.inputs.lock().unwrap();
        inputs.extend(signals);
    }

    /// Plugs a batch of fallible signals all-or-nothing: if any item
    /// is an error, no input is added and the error comes back.
    pub fn try_plug_all<E>(
        &self,
        signals: impl IntoIterator<Item = Result<Signal, E>>,
    ) -> Result<usize, E> {
        let collected: Vec<Signal> = signals.into_iter().collect::<Result<_, _>>()?;
        let count = collected.len();
        self.shared.inputs.lock().unwrap().extend(collected);
        Ok(count)
    }

    /// Removes and returns the input at `index`, in plug order.
    pub fn unplug(&self, index: usize) -> Result<Signal, EngineError> {
        let mut inputs = self.shared.inputs.lock().unwrap();
        if index >= inputs.len() {
            return Err(EngineError::NoSuchInput(index));
        }
        Ok(inputs.remove(index))
    }

    /// Empties the mix, handing every plugged signal back.
    pub fn unplug_all(&self) -> Vec<Signal> {
        std::mem::take(&mut *self.shared.inputs.lock().unwrap())
    }

    pub fn input_count(&self) -> usize {
        self.shared.inputs.lock().unwrap().len()
    }

    pub fn play(&self) {
        self.shared.playing.store(true, Ordering::Release);
    }

    pub fn stop(&self) {
        self.shared.playing.store(false, Ordering::Release);
    }

    pub fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::Acquire)
    }

    /// Rewinds the stream to block zero.
    ///
    /// Refused while playing or while a queued block is still being
    /// rendered; stop first and let the pipeline drain.
    pub fn reset(&self) -> Result<(), EngineError> {
        if self.shared.playing.load(Ordering::Acquire) {
            return Err(EngineError::ResetWhilePlaying);
        }
        if self.shared.pending.load(Ordering::Acquire) != 0 {
            return Err(EngineError::ResetWhileRendering);
        }
        self.shared.blocks.store(0, Ordering::Release);
        self.shared.epoch.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    pub fn position_blocks(&self) -> u64 {
        self.shared.blocks.load(Ordering::Acquire)
    }

    pub fn position_seconds(&self) -> f64 {
        self.position_blocks() as f64 * self.shared.config.block_seconds()
    }

    /// Device pulls that found no fresh block, plus queue overflows.
    /// Cumulative across resets.
    pub fn missed_deadlines(&self) -> u64 {
        self.shared.missed.load(Ordering::Relaxed)
    }

    /// Total blocks the worker has finished rendering.
    pub fn rendered_blocks(&self) -> u64 {
        *self.shared.completed.lock().unwrap()
    }

    /// Blocks until the worker has rendered at least `blocks` tasks in
    /// total, or the timeout passes. Returns whether the count was hit.
    pub fn wait_until_rendered(&self, blocks: u64, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut done = self.shared.completed.lock().unwrap();
        while *done < blocks {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (next, _) = self
                .shared
                .completed_cv
                .wait_timeout(done, deadline - now)
                .unwrap();
            done = next;
        }
        true
    }

    /// Asks the worker thread to exit after its current task.
    pub fn shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.wake_worker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{clip, quantize};
    use crate::signal::{sine, Signal};

    fn quantized(v: f64) -> i16 {
        quantize(clip(v))
    }

    #[test]
    fn first_pull_is_silent_and_primes_the_pipeline() {
        let (mut scheduler, _worker, handle) = BlockScheduler::new();
        handle.plug(Signal::constant(0.5));
        handle.play();

        let mut out = vec![123i16; 1024];
        scheduler.pull(&mut out);
        assert!(out.iter().all(|&s| s == 0));
        // the bootstrap pull queues without advancing
        assert_eq!(handle.position_blocks(), 0);
        assert_eq!(handle.missed_deadlines(), 0);
    }

    #[test]
    fn rendered_blocks_arrive_one_pull_later() {
        let (mut scheduler, mut worker, handle) = BlockScheduler::new();
        handle.plug(Signal::constant(0.5));
        handle.play();

        let mut out = vec![0i16; 1024];
        scheduler.pull(&mut out);
        assert!(worker.run_once());
        scheduler.pull(&mut out);

        assert!(out.iter().all(|&s| s == quantized(0.5)));
        assert_eq!(handle.position_blocks(), 1);
        assert_eq!(handle.missed_deadlines(), 0);
    }

    #[test]
    fn blocks_advance_through_the_signal_timeline() {
        let (mut scheduler, mut worker, handle) = BlockScheduler::new();
        // ramp makes each block's first sample the block start time
        handle.plug(Signal::from_rule("ramp", |t| t));
        handle.play();

        let mut out = vec![0i16; 1024];
        scheduler.pull(&mut out);
        assert!(worker.run_once());
        scheduler.pull(&mut out);
        assert_eq!(out[0], quantized(0.0));
        assert!(worker.run_once());
        scheduler.pull(&mut out);
        assert_eq!(out[0], quantized(1024.0 / 48_000.0));
        assert_eq!(out[1], quantized(1025.0 / 48_000.0));
    }

    #[test]
    fn late_worker_counts_a_miss_and_newest_block_wins() {
        let (mut scheduler, mut worker, handle) = BlockScheduler::new();
        handle.plug(Signal::from_rule("ramp", |t| t));
        handle.play();

        let mut out = vec![0i16; 1024];
        scheduler.pull(&mut out); // queues block 0
        scheduler.pull(&mut out); // nothing ready: replay + queue block 1
        assert_eq!(handle.missed_deadlines(), 1);
        assert!(out.iter().all(|&s| s == 0));

        // worker catches up on both queued blocks
        assert!(worker.run_once());
        assert!(worker.run_once());
        assert!(!worker.run_once());

        // only the newest block plays; block 0's content is skipped
        scheduler.pull(&mut out);
        assert_eq!(out[0], quantized(1024.0 / 48_000.0));
        assert_eq!(handle.missed_deadlines(), 1);
    }

    #[test]
    fn stopped_transport_holds_position_and_outputs_silence() {
        let (mut scheduler, mut worker, handle) = BlockScheduler::new();
        handle.plug(Signal::constant(0.9));
        handle.play();

        let mut out = vec![0i16; 1024];
        scheduler.pull(&mut out);
        assert!(worker.run_once());
        scheduler.pull(&mut out);
        let position = handle.position_blocks();

        handle.stop();
        scheduler.pull(&mut out);
        scheduler.pull(&mut out);
        assert!(out.iter().all(|&s| s == 0));
        assert_eq!(handle.position_blocks(), position);

        // resume continues where the transport stopped
        handle.play();
        assert!(worker.run_once());
        scheduler.pull(&mut out);
        assert_eq!(handle.position_blocks(), position + 1);
    }

    #[test]
    fn reset_refuses_to_race_the_pipeline() {
        let (mut scheduler, mut worker, handle) = BlockScheduler::new();
        handle.plug(sine(220.0));
        handle.play();
        assert!(matches!(
            handle.reset(),
            Err(EngineError::ResetWhilePlaying)
        ));

        let mut out = vec![0i16; 1024];
        scheduler.pull(&mut out);
        handle.stop();
        assert!(matches!(
            handle.reset(),
            Err(EngineError::ResetWhileRendering)
        ));

        assert!(worker.run_once());
        assert!(handle.reset().is_ok());
        assert_eq!(handle.position_blocks(), 0);
    }

    #[test]
    fn blocks_rendered_before_a_reset_never_play_after_it() {
        let (mut scheduler, mut worker, handle) = BlockScheduler::new();
        handle.plug(Signal::constant(0.5));
        handle.play();

        let mut out = vec![0i16; 1024];
        scheduler.pull(&mut out);
        assert!(worker.run_once()); // block 0 rendered, still undrained
        handle.stop();
        handle.reset().unwrap();

        handle.play();
        scheduler.pull(&mut out);
        // the stale block was recycled, not played
        assert!(out.iter().all(|&s| s == 0));
        assert_eq!(handle.position_blocks(), 0);
    }

    #[test]
    fn try_plug_all_is_all_or_nothing() {
        let (_scheduler, _worker, handle) = BlockScheduler::new();
        let bad: Vec<Result<Signal, &str>> = vec![
            Ok(sine(220.0)),
            Err("bad line"),
            Ok(sine(440.0)),
        ];
        assert_eq!(handle.try_plug_all(bad), Err("bad line"));
        assert_eq!(handle.input_count(), 0);

        let good: Vec<Result<Signal, &str>> = vec![Ok(sine(220.0)), Ok(sine(440.0))];
        assert_eq!(handle.try_plug_all(good), Ok(2));
        assert_eq!(handle.input_count(), 2);
    }

    #[test]
    fn unplugging_hands_the_signals_back() {
        let (_scheduler, _worker, handle) = BlockScheduler::new();
        handle.plug(sine(110.0));
        handle.plug(sine(220.0));
        handle.plug(sine(440.0));

        let middle = handle.unplug(1).unwrap();
        assert_eq!(middle.descriptor(), "sine(220)");
        assert_eq!(handle.input_count(), 2);

        assert!(matches!(
            handle.unplug(5),
            Err(EngineError::NoSuchInput(5))
        ));

        let rest = handle.unplug_all();
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[1].descriptor(), "sine(440)");
        assert_eq!(handle.input_count(), 0);
    }

    #[test]
    fn plugging_mid_flight_lands_in_the_next_block() {
        let (mut scheduler, mut worker, handle) = BlockScheduler::new();
        handle.play();

        let mut out = vec![0i16; 1024];
        scheduler.pull(&mut out);
        assert!(worker.run_once());
        scheduler.pull(&mut out);
        assert!(out.iter().all(|&s| s == 0)); // nothing plugged yet

        handle.plug(Signal::constant(0.25));
        assert!(worker.run_once());
        scheduler.pull(&mut out);
        assert!(out.iter().all(|&s| s == quantized(0.25)));
    }
}
