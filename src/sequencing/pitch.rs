/*
Pitch Names
===========

Pitches are counted in semitones from middle C: 0 = C4, 12 = C5,
-12 = C3. A440 sits at semitone 9, and frequencies follow equal
temperament from there:

  frequency(st) = 440 * 2^((st - 9) / 12)

Names parse as letter, optional accidental, octave: "C4", "F#2",
"Bb-1". Rendering always picks the sharp spelling of an accidental
(E# over F for semitone 5), so every canonical name ends in a digit
run and `Pitch::name` round-trips through `parse` for any semitone.
*/

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semitone offsets of the natural letters within an octave.
const NATURALS: [(char, i32); 7] = [
    ('C', 0),
    ('D', 2),
    ('E', 4),
    ('F', 5),
    ('G', 7),
    ('A', 9),
    ('B', 11),
];

/// Canonical spelling per semitone offset. Where a natural and the
/// sharp of the letter below land on the same semitone, the sharp
/// wins, so offset 5 renders as E# rather than F.
const SPELLINGS: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "E#", "F#", "G", "G#", "A", "A#", "B",
];

/// C major scale as semitone offsets from the root.
pub const C_MAJOR: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];
/// Natural minor scale as semitone offsets from the root.
pub const C_MINOR: [i32; 7] = [0, 2, 3, 5, 7, 8, 10];
/// Dorian mode as semitone offsets from the root.
pub const C_DORIAN: [i32; 7] = [0, 2, 3, 5, 7, 9, 10];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PitchError {
    #[error("empty pitch name")]
    Empty,
    #[error("unknown note letter {0:?}")]
    UnknownLetter(char),
    #[error("malformed octave in {0:?}")]
    BadOctave(String),
}

/// A pitch, stored as semitones from middle C.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pitch {
    semitone: i32,
}

impl Pitch {
    /// Middle C, semitone 0.
    pub const C4: Pitch = Pitch { semitone: 0 };
    /// The A440 tuning reference, semitone 9.
    pub const A4: Pitch = Pitch { semitone: 9 };

    pub const fn from_semitone(semitone: i32) -> Self {
        Pitch { semitone }
    }

    pub const fn semitone(self) -> i32 {
        self.semitone
    }

    /// Equal-tempered frequency in Hz.
    pub fn frequency(self) -> f64 {
        440.0 * 2f64.powf((self.semitone - 9) as f64 / 12.0)
    }

    /// Shifted by `semitones`, positive meaning up.
    pub const fn transposed(self, semitones: i32) -> Self {
        Pitch {
            semitone: self.semitone + semitones,
        }
    }

    /// Canonical name, e.g. `"C4"`, `"G#3"`, `"A#-1"`.
    pub fn name(self) -> String {
        let octave = self.semitone.div_euclid(12) + 4;
        let offset = self.semitone.rem_euclid(12) as usize;
        format!("{}{octave}", SPELLINGS[offset])
    }
}

impl FromStr for Pitch {
    type Err = PitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let letter = chars.next().ok_or(PitchError::Empty)?;
        let base = NATURALS
            .iter()
            .find(|(l, _)| *l == letter.to_ascii_uppercase())
            .map(|(_, offset)| *offset)
            .ok_or(PitchError::UnknownLetter(letter))?;
        let rest = chars.as_str();
        let (accidental, octave_text) = match rest.as_bytes().first() {
            Some(b'#') => (1, &rest[1..]),
            Some(b'b') => (-1, &rest[1..]),
            _ => (0, rest),
        };
        let octave: i32 = octave_text
            .parse()
            .map_err(|_| PitchError::BadOctave(s.to_string()))?;
        Ok(Pitch {
            semitone: base + accidental + (octave - 4) * 12,
        })
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl fmt::Debug for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pitch({})", self.name())
    }
}
