//! Real-time block engine.
//!
//! Rendering happens one block ahead of the sound card: the device
//! callback hands out a block that a background worker finished
//! earlier, then queues the next one. The pieces are split so each
//! runs on its own thread:
//!
//! - [`BlockScheduler`] lives in the device callback and only copies,
//!   queues, and advances
//! - [`RenderWorker`] evaluates the plugged signals block by block
//! - [`EngineHandle`] is the control surface: transport, inputs,
//!   position, and counters
//!
//! [`Player`] wires the three to a cpal output stream; everything
//! else works without a device, which is how the tests drive it.

pub mod player;
pub mod scheduler;
pub mod worker;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use player::{BlockTap, Player};
pub use scheduler::{BlockScheduler, EngineHandle, RenderTask};
pub use worker::RenderWorker;

use crate::{DEFAULT_BLOCK_LEN, DEFAULT_SAMPLE_RATE, MAX_BLOCK_LEN};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("sample rate must be positive")]
    ZeroSampleRate,
    #[error("block length {0} must be between 1 and {MAX_BLOCK_LEN}")]
    BadBlockLen(usize),
    #[error("cannot reset while the transport is playing")]
    ResetWhilePlaying,
    #[error("cannot reset while a block render is in flight")]
    ResetWhileRendering,
    #[error("no plugged input at index {0}")]
    NoSuchInput(usize),
    #[error("no default audio output device")]
    NoOutputDevice,
    #[error("unsupported output sample format {0}")]
    UnsupportedFormat(String),
    #[error("could not start the render thread")]
    SpawnWorker(#[source] std::io::Error),
    #[error(transparent)]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),
    #[error(transparent)]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error(transparent)]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// Sample rate and block size of one engine instance.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub sample_rate: u32,
    pub block_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_len: DEFAULT_BLOCK_LEN,
        }
    }
}

impl EngineConfig {
    pub(crate) fn validate(&self) -> Result<(), EngineError> {
        if self.sample_rate == 0 {
            return Err(EngineError::ZeroSampleRate);
        }
        if self.block_len == 0 || self.block_len > MAX_BLOCK_LEN {
            return Err(EngineError::BadBlockLen(self.block_len));
        }
        Ok(())
    }

    /// Seconds covered by one block.
    pub fn block_seconds(&self) -> f64 {
        self.block_len as f64 / self.sample_rate as f64
    }
}

/// Clamps an amplitude into `[-1, 1]`; non-finite samples become silence.
pub fn clip(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(-1.0, 1.0)
    }
}

/// Scales a clipped amplitude to a 16-bit sample, truncating toward zero.
pub fn quantize(v: f64) -> i16 {
    (v * 32767.0) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_clamps_and_silences_nan() {
        assert_eq!(clip(0.3), 0.3);
        assert_eq!(clip(2.0), 1.0);
        assert_eq!(clip(-7.5), -1.0);
        assert_eq!(clip(f64::NAN), 0.0);
        assert_eq!(clip(f64::INFINITY), 1.0);
        assert_eq!(clip(f64::NEG_INFINITY), -1.0);
    }

    #[test]
    fn quantize_spans_the_i16_range() {
        assert_eq!(quantize(1.0), 32767);
        assert_eq!(quantize(-1.0), -32767);
        assert_eq!(quantize(0.0), 0);
        // truncation, not rounding
        assert_eq!(quantize(0.5), 16383);
        assert_eq!(quantize(-0.5), -16383);
    }

    #[test]
    fn config_rejects_degenerate_values() {
        assert!(EngineConfig::default().validate().is_ok());
        let zero_rate = EngineConfig {
            sample_rate: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            zero_rate.validate(),
            Err(EngineError::ZeroSampleRate)
        ));
        let huge_block = EngineConfig {
            block_len: MAX_BLOCK_LEN + 1,
            ..EngineConfig::default()
        };
        assert!(matches!(
            huge_block.validate(),
            Err(EngineError::BadBlockLen(_))
        ));
    }

    #[test]
    fn default_block_covers_21ms_at_48k() {
        let cfg = EngineConfig::default();
        assert!((cfg.block_seconds() - 1024.0 / 48_000.0).abs() < 1e-12);
    }
}
