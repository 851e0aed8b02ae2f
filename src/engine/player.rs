use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};

use super::scheduler::{BlockScheduler, EngineHandle};
use super::worker::RenderWorker;
use super::{EngineConfig, EngineError};

/// Blocks of slack in the sample tap ring. A reader polling at frame
/// rate stays well inside this; beyond it the oldest samples drop.
const TAP_BLOCKS: usize = 4;

/// Read side of the player's sample tap, for scopes and meters. The
/// device callback pushes every block it pulls; draining catches the
/// reader up and keeps the freshest window.
pub struct BlockTap {
    samples: Consumer<i16>,
}

impl BlockTap {
    /// Appends everything played since the last call to `window`,
    /// trimming the front to at most `keep` samples. Returns how many
    /// new samples arrived.
    pub fn drain_into(&mut self, window: &mut Vec<i16>, keep: usize) -> usize {
        let mut arrived = 0;
        while let Ok(sample) = self.samples.pop() {
            window.push(sample);
            arrived += 1;
        }
        if window.len() > keep {
            let excess = window.len() - keep;
            window.drain(..excess);
        }
        arrived
    }
}

/// Owns the output stream and the render thread.
///
/// The stream and thread come up lazily on the first [`play`]; until
/// then the engine parts sit idle and the player works entirely
/// offline through its [`EngineHandle`]. If opening the device fails,
/// this player stays silent for good; build a fresh one to retry.
///
/// [`play`]: Player::play
pub struct Player {
    handle: EngineHandle,
    idle: Option<(BlockScheduler, RenderWorker, Producer<i16>)>,
    stream: Option<cpal::Stream>,
    worker_thread: Option<thread::JoinHandle<()>>,
    tap: Option<Consumer<i16>>,
}

impl Player {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default()).expect("default config is valid")
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, EngineError> {
        let (scheduler, worker, handle) = BlockScheduler::with_config(config)?;
        let (tap_tx, tap_rx) = RingBuffer::new(config.block_len * TAP_BLOCKS);
        Ok(Player {
            handle,
            idle: Some((scheduler, worker, tap_tx)),
            stream: None,
            worker_thread: None,
            tap: Some(tap_rx),
        })
    }

    pub fn handle(&self) -> &EngineHandle {
        &self.handle
    }

    /// Hands out the sample tap. There is exactly one; later calls
    /// return `None`.
    pub fn take_tap(&mut self) -> Option<BlockTap> {
        self.tap.take().map(|samples| BlockTap { samples })
    }

    /// Adds a signal to the mix. Takes effect from the next block.
    pub fn plug(&self, signal: crate::signal::Signal) {
        self.handle.plug(signal);
    }

    /// Starts the transport, opening the device stream and spawning
    /// the render thread on the first call.
    pub fn play(&mut self) -> Result<(), EngineError> {
        if let Some((scheduler, worker, tap)) = self.idle.take() {
            let thread = thread::Builder::new()
                .name("blockwave-render".into())
                .spawn(move || worker.run())
                .map_err(EngineError::SpawnWorker)?;
            self.worker_thread = Some(thread);

            let config = self.handle.config();
            let stream = open_stream(scheduler, config, tap)?;
            stream.play()?;
            self.stream = Some(stream);
            tracing::info!(
                sample_rate = config.sample_rate,
                block_len = config.block_len,
                "output stream up"
            );
        }
        self.handle.play();
        Ok(())
    }

    /// Stops the transport. The stream stays open and pulls silence,
    /// so a later [`play`](Player::play) resumes in place.
    pub fn stop(&self) {
        self.handle.stop();
    }

    pub fn reset(&self) -> Result<(), EngineError> {
        self.handle.reset()
    }

    pub fn is_playing(&self) -> bool {
        self.handle.is_playing()
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.handle.stop();
        // close the device before tearing the worker down
        self.stream.take();
        self.handle.shutdown();
        if let Some(thread) = self.worker_thread.take() {
            let _ = thread.join();
        }
    }
}

fn open_stream(
    scheduler: BlockScheduler,
    config: EngineConfig,
    tap: Producer<i16>,
) -> Result<cpal::Stream, EngineError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(EngineError::NoOutputDevice)?;
    let supported = device.default_output_config()?;
    let stream_config = cpal::StreamConfig {
        channels: supported.channels(),
        sample_rate: cpal::SampleRate(config.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };
    match supported.sample_format() {
        cpal::SampleFormat::I16 => {
            build_stream::<i16>(&device, &stream_config, scheduler, config.block_len, tap)
        }
        cpal::SampleFormat::F32 => {
            build_stream::<f32>(&device, &stream_config, scheduler, config.block_len, tap)
        }
        other => Err(EngineError::UnsupportedFormat(other.to_string())),
    }
}

/// The device callback: pull whole blocks, fan the mono stream out to
/// every channel, and carry leftovers across callbacks whose length
/// does not line up with the block size.
fn build_stream<T>(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    mut scheduler: BlockScheduler,
    block_len: usize,
    mut tap: Producer<i16>,
) -> Result<cpal::Stream, EngineError>
where
    T: cpal::SizedSample + cpal::FromSample<i16>,
{
    let channels = stream_config.channels as usize;
    let mut block = vec![0i16; block_len];
    let mut offset = block_len;
    let stream = device.build_output_stream(
        stream_config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let frames = data.len() / channels;
            let mut frame = 0;
            while frame < frames {
                if offset == block.len() {
                    scheduler.pull(&mut block);
                    // a full ring only costs the scopes their feed
                    for &s in &block {
                        let _ = tap.push(s);
                    }
                    offset = 0;
                }
                let run = (frames - frame).min(block.len() - offset);
                for i in 0..run {
                    let sample = T::from_sample(block[offset + i]);
                    for ch in 0..channels {
                        data[(frame + i) * channels + ch] = sample;
                    }
                }
                frame += run;
                offset += run;
            }
        },
        |err| tracing::error!("output stream error: {err}"),
        None,
    )?;
    Ok(stream)
}
