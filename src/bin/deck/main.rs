//! deck - terminal front end for a blockwave session
//!
//! Run with: cargo run --bin deck

mod app;
mod ui;

use app::Deck;
use blockwave::sequencing::{Pitch, Pitcher, Sequencer};
use blockwave::signal::Patch;
use blockwave::voices;
use blockwave::Player;
use color_eyre::eyre::Result;

const SESSION_BPM: f64 = 96.0;

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // an eight-step e-piano line over vinyl ambience
    let mut steps = Sequencer::with_steps(8, 0.5);
    for (i, name) in ["C3", "Eb3", "G3", "C4", "G4", "C4", "G3", "Eb3"]
        .iter()
        .enumerate()
    {
        steps.set_pitch(i, name.parse::<Pitch>()?);
    }
    let keys = Pitcher::new()
        .source(&steps)
        .base(voices::epiano(Pitch::C4.frequency()))
        .with_bpm(SESSION_BPM)
        .build()?;

    let patch = Patch::new()
        .with("air", voices::vinyl() * 0.4)
        .with("keys", keys * 0.8);

    let mut player = Player::new();
    player
        .handle()
        .plug_all(patch.iter().map(|(_, signal)| signal.clone()));
    player.play()?;

    Deck::new(player, patch.script()).run()
}
