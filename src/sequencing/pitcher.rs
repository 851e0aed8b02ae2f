/*
Pitcher
=======

Renders one base signal against a stream of notes. Every note plays
the same underlying expression, retuned and re-placed:

  voice(t) = base((t - onset) * freq / C4) * velocity * gate(t)

Shifting time by the onset makes each note restart the base from its
own beginning; stretching it by the frequency ratio retunes whatever
the base does to the note's pitch, with middle C as the identity. The
gate applies the attack and release contour, and overlapping voices
simply add.

Rendering a batch first drops every note that cannot reach it: notes
starting after the batch, and notes whose release tail has already
faded before it. The tail margin is how much sound a note is assumed
to make past its gate; the default comfortably covers the stock decay
and can be tuned per pitcher.
*/

use std::fmt;

use thiserror::Error;

use super::gate::NoteGate;
use super::note::Note;
use super::pitch::Pitch;
use crate::signal::{Signal, SignalNode};
use crate::DEFAULT_BPM;

/// Seconds a released note keeps contributing before the windowing
/// pass may drop it.
pub const DEFAULT_RELEASE_TAIL: f64 = 1.0;

/// Anything that can produce a concrete note list.
pub trait NoteSource {
    fn notes(&self) -> Vec<Note>;
}

impl NoteSource for Note {
    fn notes(&self) -> Vec<Note> {
        vec![*self]
    }
}

/// A bare pitch plays as one default note on that pitch.
impl NoteSource for Pitch {
    fn notes(&self) -> Vec<Note> {
        vec![Note::new(*self)]
    }
}

impl NoteSource for Vec<Note> {
    fn notes(&self) -> Vec<Note> {
        self.clone()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PitcherError {
    #[error("pitcher has no note source")]
    MissingNotes,
    #[error("pitcher has no base signal")]
    MissingBase,
}

/// Builder plugging a note source and a base signal together.
pub struct Pitcher {
    notes: Option<Vec<Note>>,
    base: Option<Signal>,
    bpm: f64,
    attack: f64,
    decay: f64,
    release_tail: f64,
}

impl Default for Pitcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Pitcher {
    pub fn new() -> Self {
        Pitcher {
            notes: None,
            base: None,
            bpm: DEFAULT_BPM,
            attack: 0.01,
            decay: 0.1,
            release_tail: DEFAULT_RELEASE_TAIL,
        }
    }

    /// Takes the note list to render. The source is read once, here.
    pub fn source(mut self, source: &impl NoteSource) -> Self {
        self.notes = Some(source.notes());
        self
    }

    /// Takes the signal every note replays.
    pub fn base(mut self, base: Signal) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_bpm(mut self, bpm: f64) -> Self {
        assert!(bpm > 0.0, "bpm must be positive, got {bpm}");
        self.bpm = bpm;
        self
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

    pub fn with_release_tail(mut self, seconds: f64) -> Self {
        assert!(
            seconds >= 0.0,
            "release tail cannot be negative, got {seconds}"
        );
        self.release_tail = seconds;
        self
    }

    /// Finishes the pitcher into a playable signal.
    pub fn build(self) -> Result<Signal, PitcherError> {
        let notes = self.notes.ok_or(PitcherError::MissingNotes)?;
        let base = self.base.ok_or(PitcherError::MissingBase)?;
        Ok(Signal::from_node(SignalNode::Track(NoteTrack {
            notes,
            base,
            bpm: self.bpm,
            attack: self.attack,
            decay: self.decay,
            release_tail: self.release_tail,
        })))
    }
}

/// A materialized note list bound to its base signal, living as a
/// leaf inside a signal tree.
pub struct NoteTrack {
    notes: Vec<Note>,
    base: Signal,
    bpm: f64,
    attack: f64,
    decay: f64,
    release_tail: f64,
}

impl NoteTrack {
    fn gate(&self, note: Note) -> NoteGate {
        NoteGate::new(note)
            .with_attack(self.attack)
            .with_decay(self.decay)
            .with_bpm(self.bpm)
    }

    /// True if the note cannot be heard anywhere in `[t_first, t_last]`.
    fn out_of_window(&self, start: f64, end: f64, t_first: f64, t_last: f64) -> bool {
        start > t_last || end + self.release_tail < t_first
    }

    pub(crate) fn render_at(&self, t: f64) -> f64 {
        let reference = Pitch::C4.frequency();
        let mut acc = 0.0;
        for note in &self.notes {
            let start = note.start_seconds(self.bpm);
            let end = note.end_seconds(self.bpm);
            if self.out_of_window(start, end, t, t) {
                continue;
            }
            let ratio = note.frequency() / reference;
            let gate = self.gate(*note);
            acc += self.base.at((t - start) * ratio) * note.velocity * gate.level(t);
        }
        acc
    }

    /// Sums every reachable note's voice over the batch. `ts` must be
    /// ordered; the first and last entries bound the window test.
    pub(crate) fn render(&self, ts: &[f64], out: &mut [f64]) {
        out.fill(0.0);
        let (Some(&t_first), Some(&t_last)) = (ts.first(), ts.last()) else {
            return;
        };
        let reference = Pitch::C4.frequency();
        let mut warped = vec![0.0; ts.len()];
        let mut voice = vec![0.0; ts.len()];
        for note in &self.notes {
            let start = note.start_seconds(self.bpm);
            let end = note.end_seconds(self.bpm);
            if self.out_of_window(start, end, t_first, t_last) {
                continue;
            }
            let ratio = note.frequency() / reference;
            for (w, &t) in warped.iter_mut().zip(ts) {
                *w = (t - start) * ratio;
            }
            self.base.eval_into(&warped, &mut voice);
            let gate = self.gate(*note);
            for ((o, &t), &v) in out.iter_mut().zip(ts).zip(&voice) {
                *o += v * note.velocity * gate.level(t);
            }
        }
    }
}

impl fmt::Display for NoteTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pitcher({} notes, {})", self.notes.len(), self.base)
    }
}
