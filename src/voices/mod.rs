//! Ready-made instrument signals.
//!
//! Each voice composes the generator algebra into a finished sound and
//! wraps it under a short descriptor, so a saved patch stays readable.
//! The `_with` variants skip the wrapper and hand back the raw
//! expression for tweaking.
//!
//! # Example
//!
//! ```ignore
//! use blockwave::voices;
//!
//! let dusty = voices::vinyl() + voices::epiano(220.0) * 0.5;
//! println!("{dusty}");  // vinyl() + epiano(220) * 0.5
//! ```

mod crackle;
mod epiano;
mod vinyl;

pub use crackle::crackle;
pub use epiano::{epiano, epiano_with};
pub use vinyl::{vinyl, vinyl_with};
