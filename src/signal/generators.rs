/*
Generator Leaves
================

The parametrized sound sources at the bottom of every signal tree.

Periodic oscillators are deterministic functions of `2π·freq·t`:

  sine(f)    sin(2π f t)                  the pure tone
  square(f)  sign(sin(2π f t))            odd harmonics, hollow
  saw(f)     2·(t·f mod 1) − 1            all harmonics, buzzy

`decay(a)` is `exp(−a·t)`, the usual envelope multiplier. The noise
sources draw fresh randomness on every evaluation: `noise()` samples a
standard normal scaled by 1/3, `shot_noise(rate)` counts Poisson events
at `rate` events per second folded down to a per-sample rate, which is
what makes it usable as a sparse trigger process (almost always 0, the
occasional 1).
*/

use std::f64::consts::TAU;

use rand::Rng;
use rand_distr::{Poisson, StandardNormal};

use super::{Signal, SignalNode};
use crate::DEFAULT_SAMPLE_RATE;

/// Parametrized leaf kinds. Stateless except for the noise sources.
#[derive(Clone, Copy, Debug)]
pub enum Generator {
    Sine { freq: f64 },
    Square { freq: f64 },
    Saw { freq: f64 },
    Decay { amount: f64 },
    Noise,
    ShotNoise { rate: f64, dist: Poisson<f64> },
}

impl Generator {
    /// One amplitude sample at time `t` seconds.
    pub fn sample(&self, t: f64) -> f64 {
        match self {
            Generator::Sine { freq } => (TAU * freq * t).sin(),
            Generator::Square { freq } => {
                let s = (TAU * freq * t).sin();
                if s == 0.0 {
                    0.0
                } else {
                    s.signum()
                }
            }
            Generator::Saw { freq } => {
                let x = t * freq;
                2.0 * (x - x.floor()) - 1.0
            }
            Generator::Decay { amount } => (-amount * t).exp(),
            Generator::Noise => {
                let x: f64 = rand::thread_rng().sample(StandardNormal);
                x / 3.0
            }
            Generator::ShotNoise { dist, .. } => rand::thread_rng().sample(*dist),
        }
    }

    /// One draw per timestamp, written into `out`.
    pub fn fill(&self, ts: &[f64], out: &mut [f64]) {
        for (o, &t) in out.iter_mut().zip(ts) {
            *o = self.sample(t);
        }
    }
}

/// Sine oscillator at `freq` Hz.
pub fn sine(freq: f64) -> Signal {
    Signal::from_node(SignalNode::Gen(Generator::Sine { freq }))
}

/// Square oscillator at `freq` Hz.
pub fn square(freq: f64) -> Signal {
    Signal::from_node(SignalNode::Gen(Generator::Square { freq }))
}

/// Saw oscillator at `freq` Hz.
pub fn saw(freq: f64) -> Signal {
    Signal::from_node(SignalNode::Gen(Generator::Saw { freq }))
}

/// Exponential decay envelope, `exp(-amount * t)`.
pub fn decay(amount: f64) -> Signal {
    Signal::from_node(SignalNode::Gen(Generator::Decay { amount }))
}

/// Gaussian noise: independent normal draws scaled by 1/3.
pub fn noise() -> Signal {
    Signal::from_node(SignalNode::Gen(Generator::Noise))
}

/// Shot noise: independent Poisson event counts.
///
/// `rate` is in events per second; it is folded down to an events-per-sample
/// rate against [`DEFAULT_SAMPLE_RATE`] when the leaf is built. The
/// descriptor keeps the raw rate, so a reloaded patch rebuilds the same
/// process.
///
/// # Panics
///
/// If `rate` is not a positive finite number.
pub fn shot_noise(rate: f64) -> Signal {
    assert!(
        rate.is_finite() && rate > 0.0,
        "shot noise rate must be positive, got {rate}"
    );
    let per_sample = rate / DEFAULT_SAMPLE_RATE as f64;
    let dist = Poisson::new(per_sample).expect("positive finite rate");
    Signal::from_node(SignalNode::Gen(Generator::ShotNoise { rate, dist }))
}
