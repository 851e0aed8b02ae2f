//! A note event: a pitch placed on the beat grid.
//!
//! `start` and `duration` are measured in beats, so the same note list
//! plays at any tempo; velocity scales the rendered amplitude.
//! Comparison between notes looks at pitch alone, which is what scale
//! and chord logic wants.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::pitch::Pitch;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug)]
pub struct Note {
    pub pitch: Pitch,
    /// Onset in beats from the start of the track.
    pub start: f64,
    /// Length in beats.
    pub duration: f64,
    /// Amplitude scale, 1.0 meaning full strength.
    pub velocity: f64,
}

impl Note {
    /// A full-velocity note on the given pitch, one beat long at beat 0.
    pub fn new(pitch: Pitch) -> Self {
        Note {
            pitch,
            start: 0.0,
            duration: 1.0,
            velocity: 1.0,
        }
    }

    pub fn with_start(mut self, start: f64) -> Self {
        self.start = start;
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = velocity;
        self
    }

    /// Same note re-pitched to an absolute semitone index.
    pub fn with_semitone(mut self, semitone: i32) -> Self {
        self.pitch = Pitch::from_semitone(semitone);
        self
    }

    pub fn semitone(&self) -> i32 {
        self.pitch.semitone()
    }

    pub fn frequency(&self) -> f64 {
        self.pitch.frequency()
    }

    /// Same note moved up (or down, for negative counts) by semitones.
    pub fn transposed(&self, semitones: i32) -> Self {
        Note {
            pitch: self.pitch.transposed(semitones),
            ..*self
        }
    }

    /// Same note with its onset moved by `beats`.
    pub fn shifted(&self, beats: f64) -> Self {
        Note {
            start: self.start + beats,
            ..*self
        }
    }

    /// Beat at which the note stops sounding (release tail aside).
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Onset in seconds at the given tempo.
    pub fn start_seconds(&self, bpm: f64) -> f64 {
        self.start * 60.0 / bpm
    }

    /// Release instant in seconds at the given tempo.
    pub fn end_seconds(&self, bpm: f64) -> f64 {
        self.end() * 60.0 / bpm
    }
}

impl Add<i32> for Note {
    type Output = Note;

    fn add(self, semitones: i32) -> Note {
        self.transposed(semitones)
    }
}

impl Sub<i32> for Note {
    type Output = Note;

    fn sub(self, semitones: i32) -> Note {
        self.transposed(-semitones)
    }
}

impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.pitch == other.pitch
    }
}

impl PartialOrd for Note {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.pitch.cmp(&other.pitch))
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Note({}, {}, {}, {})",
            self.pitch, self.start, self.duration, self.velocity
        )
    }
}
