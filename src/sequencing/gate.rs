/*
Note Gates
==========

The amplitude contour a single note carves out of time:

        1 -|        ________________
           |       /                \
           |      |                  \__
        0 -|______|                     \______
                  ^start            ^end

Silence before the onset, `1 - exp(-(t - start)/attack)` while the
note holds, `exp(-(t - end)/decay)` from the release instant on. The
note's beat positions convert to seconds at the gate's tempo. The
release instant itself takes the decay branch, where the exponential
is exactly 1, so the hold tops out at full level before the tail
falls away.
*/

use super::note::Note;
use crate::signal::Signal;
use crate::DEFAULT_BPM;

/// Attack/decay envelope for one [`Note`].
#[derive(Clone, Copy, Debug)]
pub struct NoteGate {
    note: Note,
    attack: f64,
    decay: f64,
    bpm: f64,
}

impl NoteGate {
    /// Gate with a 10 ms attack and 100 ms release at the default tempo.
    pub fn new(note: Note) -> Self {
        NoteGate {
            note,
            attack: 0.01,
            decay: 0.1,
            bpm: DEFAULT_BPM,
        }
    }

    pub fn with_attack(mut self, attack: f64) -> Self {
        assert!(attack > 0.0, "attack must be positive, got {attack}");
        self.attack = attack;
        self
    }

    pub fn with_decay(mut self, decay: f64) -> Self {
        assert!(decay > 0.0, "decay must be positive, got {decay}");
        self.decay = decay;
        self
    }

    pub fn with_bpm(mut self, bpm: f64) -> Self {
        assert!(bpm > 0.0, "bpm must be positive, got {bpm}");
        self.bpm = bpm;
        self
    }

    /// Gate level at `t` seconds, in `[0, 1]`.
    pub fn level(&self, t: f64) -> f64 {
        let start = self.note.start_seconds(self.bpm);
        let end = self.note.end_seconds(self.bpm);
        if t < start {
            0.0
        } else if t >= end {
            (-(t - end) / self.decay).exp()
        } else {
            1.0 - (-(t - start) / self.attack).exp()
        }
    }

    /// The gate as a signal leaf, usable inside expressions.
    pub fn into_signal(self) -> Signal {
        let label = format!("gate({})", self.note);
        Signal::from_rule(label, move |t| self.level(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencing::pitch::Pitch;

    fn beat_note() -> Note {
        // one beat at 120 bpm spans 0.5 s
        Note::new(Pitch::C4).with_start(2.0).with_duration(1.0)
    }

    #[test]
    fn silent_before_the_onset() {
        let gate = NoteGate::new(beat_note());
        assert_eq!(gate.level(0.0), 0.0);
        assert_eq!(gate.level(0.999), 0.0);
    }

    #[test]
    fn attack_rises_from_zero() {
        let gate = NoteGate::new(beat_note());
        assert_eq!(gate.level(1.0), 0.0);
        let early = gate.level(1.005);
        let later = gate.level(1.05);
        assert!(early > 0.0 && early < later);
        assert!(gate.level(1.4) > 0.99);
    }

    #[test]
    fn release_decays_from_full() {
        let gate = NoteGate::new(beat_note());
        // the release instant lands on the decay branch at exactly 1
        assert_eq!(gate.level(1.5), 1.0);
        let just_after = gate.level(1.5 + 1e-9);
        assert!(just_after > 0.99 && just_after < 1.0);
        // one decay constant later the tail has dropped to 1/e
        let tail = gate.level(1.6);
        assert!((tail - (-1.0f64).exp()).abs() < 1e-9);
        assert!(gate.level(3.0) < 1e-6);
    }

    #[test]
    fn tempo_scales_the_window() {
        let gate = NoteGate::new(beat_note()).with_bpm(60.0);
        // at 60 bpm the same note starts at 2 s instead of 1 s
        assert_eq!(gate.level(1.5), 0.0);
        assert!(gate.level(2.4) > 0.99);
    }

    #[test]
    fn gate_embeds_in_signal_expressions() {
        let gate = NoteGate::new(beat_note());
        let sig = gate.into_signal() * 0.5;
        assert_eq!(sig.at(0.5), 0.0);
        assert!((sig.at(1.4) - 0.5 * gate.level(1.4)).abs() < 1e-12);
        assert!(gate.into_signal().descriptor().starts_with("gate(Note(C4"));
    }
}
