/*
Step Sequencer
==============

An equidistant note grid: every step has the same length and the next
step starts exactly where the previous one ends. The grid loops; a
16-step pattern of eighth-beat notes spans two beats and then repeats
at two-beat offsets for as many cycles as configured.

Arbitrary note lists can be loaded, but they must keep the grid's
shape. Validation compares beat positions with a small tolerance so
patterns built from decimal step lengths are not rejected over
floating-point dust.
*/

use thiserror::Error;

use super::note::Note;
use super::pitch::Pitch;
use super::pitcher::NoteSource;

/// Tolerance for comparing beat positions during validation.
const GRID_EPS: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum SequenceError {
    #[error("a sequence needs at least one note")]
    Empty,
    #[error("note {index} lasts {found} beats, expected {expected}")]
    UnevenDuration {
        index: usize,
        expected: f64,
        found: f64,
    },
    #[error("note {index} starts at beat {found}, expected {expected}")]
    Gap {
        index: usize,
        expected: f64,
        found: f64,
    },
}

/// A looping, equidistant sequence of notes.
#[derive(Clone, Debug)]
pub struct Sequencer {
    notes: Vec<Note>,
    note_length: f64,
    repeats: usize,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    /// Sixteen eighth-beat steps of middle C, looping 1024 times.
    pub fn new() -> Self {
        Self::with_steps(16, 0.125)
    }

    /// An all-middle-C grid of `steps` notes, each `note_length` beats.
    pub fn with_steps(steps: usize, note_length: f64) -> Self {
        assert!(
            note_length > 0.0,
            "step length must be positive, got {note_length}"
        );
        Sequencer {
            notes: grid(steps, note_length),
            note_length,
            repeats: 1024,
        }
    }

    /// Builds a sequencer from an explicit note list, which must form
    /// an equidistant grid.
    pub fn from_notes(notes: Vec<Note>) -> Result<Self, SequenceError> {
        check_grid(&notes)?;
        let note_length = notes[0].duration;
        Ok(Sequencer {
            notes,
            note_length,
            repeats: 1024,
        })
    }

    pub fn with_repeats(mut self, repeats: usize) -> Self {
        self.repeats = repeats;
        self
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note_length(&self) -> f64 {
        self.note_length
    }

    pub fn repeats(&self) -> usize {
        self.repeats
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Beats covered by one pass over the grid.
    pub fn cycle_length(&self) -> f64 {
        self.notes.len() as f64 * self.note_length
    }

    /// Replaces the grid with `steps` fresh middle-C notes at the
    /// current step length. Pitches and velocities are reset.
    pub fn set_num_notes(&mut self, steps: usize) {
        self.notes = grid(steps, self.note_length);
    }

    /// Rescales every step to `note_length` beats, keeping pitches and
    /// velocities in place.
    pub fn set_note_length(&mut self, note_length: f64) {
        assert!(
            note_length > 0.0,
            "step length must be positive, got {note_length}"
        );
        self.note_length = note_length;
        for (i, note) in self.notes.iter_mut().enumerate() {
            note.start = note_length * i as f64;
            note.duration = note_length;
        }
    }

    /// Swaps in an explicit note list after validating its shape.
    pub fn set_sequence(&mut self, notes: Vec<Note>) -> Result<(), SequenceError> {
        check_grid(&notes)?;
        self.note_length = notes[0].duration;
        self.notes = notes;
        Ok(())
    }

    /// Re-pitches the step at `index`.
    ///
    /// # Panics
    ///
    /// If `index` is out of range.
    pub fn set_pitch(&mut self, index: usize, pitch: Pitch) {
        self.notes[index].pitch = pitch;
    }

    /// Sets the velocity of the step at `index`.
    ///
    /// # Panics
    ///
    /// If `index` is out of range.
    pub fn set_velocity(&mut self, index: usize, velocity: f64) {
        self.notes[index].velocity = velocity;
    }
}

impl NoteSource for Sequencer {
    /// The grid unrolled over its repeats, each cycle shifted by one
    /// grid length.
    fn notes(&self) -> Vec<Note> {
        let cycle = self.cycle_length();
        let mut out = Vec::with_capacity(self.notes.len() * self.repeats);
        for rep in 0..self.repeats {
            let offset = rep as f64 * cycle;
            out.extend(self.notes.iter().map(|n| n.shifted(offset)));
        }
        out
    }
}

fn grid(steps: usize, note_length: f64) -> Vec<Note> {
    (0..steps)
        .map(|i| {
            Note::new(Pitch::C4)
                .with_start(note_length * i as f64)
                .with_duration(note_length)
        })
        .collect()
}

fn check_grid(notes: &[Note]) -> Result<(), SequenceError> {
    let first = notes.first().ok_or(SequenceError::Empty)?;
    let expected = first.duration;
    for (index, note) in notes.iter().enumerate().skip(1) {
        if (note.duration - expected).abs() > GRID_EPS {
            return Err(SequenceError::UnevenDuration {
                index,
                expected,
                found: note.duration,
            });
        }
        let prev_end = notes[index - 1].end();
        if (note.start - prev_end).abs() > GRID_EPS {
            return Err(SequenceError::Gap {
                index,
                expected: prev_end,
                found: note.start,
            });
        }
    }
    Ok(())
}
