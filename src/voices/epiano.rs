//! Electric piano voice - a soft additive bell.
//!
//! A geometric harmonic series over a base oscillator: partial `i`
//! sounds at `i * freq` with amplitude `decay^i`. The stock voice
//! stacks sines; halving each partial keeps the sum just under full
//! scale at eight harmonics, so the voice never needs an extra gain
//! stage.
//!
//! # Variations
//!
//! - Fewer harmonics = duller, more muted keys
//! - Slower decay (0.7) = brighter, reedier tone
//! - A square or saw base = grittier, organ-like keys

use crate::signal::{sine, Signal};

pub const E_PIANO_HARMONIC_DECAY: f64 = 0.5;
pub const E_PIANO_HARMONICS: u32 = 8;

/// Create the stock electric piano voice at `freq` Hz.
pub fn epiano(freq: f64) -> Signal {
    Signal::labeled(
        format!("epiano({freq})"),
        epiano_with(freq, sine, E_PIANO_HARMONIC_DECAY, E_PIANO_HARMONICS),
    )
}

/// The additive series with its knobs exposed. `base` builds each
/// partial's oscillator from its frequency; the returned signal
/// prints as the full partial sum.
///
/// # Panics
///
/// If `harmonics` is zero.
pub fn epiano_with(
    freq: f64,
    base: impl Fn(f64) -> Signal,
    harmonic_decay: f64,
    harmonics: u32,
) -> Signal {
    assert!(harmonics >= 1, "an additive voice needs at least one partial");
    let mut sum = harmonic_decay * base(freq);
    for i in 2..=harmonics {
        sum = sum + harmonic_decay.powi(i as i32) * base(i as f64 * freq);
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::square;
    use std::f64::consts::TAU;

    #[test]
    fn stock_voice_prints_its_name() {
        assert_eq!(epiano(440.0).descriptor(), "epiano(440)");
    }

    #[test]
    fn expanded_voice_prints_the_partial_sum() {
        let full = epiano_with(440.0, sine, 0.5, 3);
        assert_eq!(
            full.descriptor(),
            "0.5 * sine(440) + 0.25 * sine(880) + 0.125 * sine(1320)"
        );
    }

    #[test]
    fn partials_follow_the_geometric_series() {
        let voice = epiano_with(100.0, sine, 0.5, 2);
        for &t in &[0.0, 0.0013, 0.0071, 0.02] {
            let expected = 0.5 * (TAU * 100.0 * t).sin() + 0.25 * (TAU * 200.0 * t).sin();
            assert!((voice.at(t) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn base_oscillator_is_swappable() {
        let voice = epiano_with(100.0, square, 0.5, 2);
        assert_eq!(voice.descriptor(), "0.5 * square(100) + 0.25 * square(200)");
        // early in the cycle both squares sit at +1
        assert!((voice.at(0.001) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn stock_voice_stays_inside_full_scale() {
        let voice = epiano(55.0);
        let ts: Vec<f64> = (0..4096).map(|i| i as f64 / 48_000.0).collect();
        assert!(voice.eval(&ts).iter().all(|v| v.abs() < 1.0));
    }
}
