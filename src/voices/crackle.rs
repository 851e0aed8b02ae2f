//! Crackle voice - sparse random pops.
//!
//! Shot noise gates Gaussian noise: most samples are zero, and each
//! Poisson event lets one noisy sample through at a random amplitude.
//! At low rates this is fire crackle; pushed higher it turns into
//! rain on a tin roof.

use crate::signal::{noise, shot_noise, Signal};

/// Create a crackle voice firing `rate` pops per second on average.
///
/// # Panics
///
/// If `rate` is not a positive finite number.
pub fn crackle(rate: f64) -> Signal {
    Signal::labeled(format!("crackle({rate})"), shot_noise(rate) * noise())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mostly_silent_with_occasional_pops() {
        let c = crackle(50.0);
        let ts: Vec<f64> = (0..48_000).map(|i| i as f64 / 48_000.0).collect();
        let vals = c.eval(&ts);
        let quiet = vals.iter().filter(|v| **v == 0.0).count();
        assert!(quiet > 47_000, "only {quiet} silent samples");
        assert!(vals.iter().any(|v| *v != 0.0));
    }

    #[test]
    fn descriptor_hides_the_composition() {
        assert_eq!(crackle(8.0).descriptor(), "crackle(8)");
    }
}
