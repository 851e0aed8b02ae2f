pub mod gate;
pub mod note;
pub mod pitch;
pub mod pitcher;
pub mod sequencer;

pub use gate::NoteGate;
pub use note::Note;
pub use pitch::{Pitch, PitchError, C_DORIAN, C_MAJOR, C_MINOR};
pub use pitcher::{NoteSource, NoteTrack, Pitcher, PitcherError, DEFAULT_RELEASE_TAIL};
pub use sequencer::{SequenceError, Sequencer};
