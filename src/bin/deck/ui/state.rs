//! View state handed from the deck to the widgets, one per frame.

/// Everything one frame of the UI needs to know, borrowed from the app.
pub struct DeckView<'a> {
    pub script: &'a str,
    pub playing: bool,
    pub position_seconds: f64,
    pub missed_deadlines: u64,
    pub inputs: usize,
    pub sample_rate: u32,
    pub reset_armed: bool,
    /// Freshest tapped samples, scaled to `[-1, 1]`.
    pub samples: &'a [f32],
    /// Current spectrum curve as `(frequency_hz, magnitude_db)`.
    pub spectrum: &'a [(f64, f64)],
}
