pub mod engine; // Block-scheduled real-time playback
pub mod sequencing; // Notes, pitches, and note-stream rendering
pub mod signal; // Composable signal expressions
pub mod voices; // Ready-made instrument patches

/// Sample rate assumed wherever one is not configured explicitly.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;
/// Samples per rendered block.
pub const DEFAULT_BLOCK_LEN: usize = 1024;
/// Largest block length accepted by [`engine::EngineConfig`].
pub const MAX_BLOCK_LEN: usize = 8192;
/// Tempo used to convert beat positions to seconds.
pub const DEFAULT_BPM: f64 = 120.0;

pub use engine::{BlockScheduler, EngineConfig, EngineError, EngineHandle, Player, RenderWorker};
pub use sequencing::{Note, NoteGate, NoteSource, Pitch, Pitcher, Sequencer};
pub use signal::{axis, decay, noise, saw, shot_noise, sine, square, Signal};
