//! Vinyl voice - worn record surface noise.
//!
//! Two layers make the illusion:
//!
//! 1. A slow crackle, the dust pops between grooves
//! 2. A quiet hiss whose level breathes with each revolution,
//!    modulated by a squared sub-hertz sine
//!
//! The modulator `amount * (sine(f)^2 - 1) + 1` swings between
//! `1 - amount` and `1`, so the hiss dips once per half period
//! instead of pumping above its set level.
//!
//! # Variations
//!
//! - More crackle rate = an older, dustier record
//! - Slower modulation = a 33 rpm feel over the stock 45-ish wobble
//! - More hiss = worn-out stylus

use crate::signal::{noise, sine, Signal};

use super::crackle::crackle;

pub const VINYL_CRACKLE_RATE: f64 = 8.0;
pub const VINYL_CRACKLE_LEVEL: f64 = 1.0;
pub const VINYL_HISS_LEVEL: f64 = 0.025;
pub const VINYL_HISS_MOD_FREQ: f64 = 0.125;
pub const VINYL_HISS_MOD_AMOUNT: f64 = 0.2;

/// Create the stock vinyl voice.
pub fn vinyl() -> Signal {
    Signal::labeled(
        "vinyl()",
        vinyl_with(
            VINYL_CRACKLE_RATE,
            VINYL_CRACKLE_LEVEL,
            VINYL_HISS_LEVEL,
            VINYL_HISS_MOD_FREQ,
            VINYL_HISS_MOD_AMOUNT,
        ),
    )
}

/// The vinyl composition with every layer exposed. The returned
/// signal prints as its full expression rather than `vinyl()`.
pub fn vinyl_with(
    crackle_rate: f64,
    crackle_level: f64,
    hiss_level: f64,
    hiss_mod_freq: f64,
    hiss_mod_amount: f64,
) -> Signal {
    let modulator = hiss_mod_amount * (sine(hiss_mod_freq).pow(2.0) - 1.0) + 1.0;
    crackle_level * crackle(crackle_rate) + hiss_level * noise() * modulator
}
