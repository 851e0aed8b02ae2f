//! Render a short session offline and write it as raw PCM.
//!
//! Run with: cargo run --example offline_bounce
//!
//! The output is headerless mono i16 at 48 kHz:
//!   ffplay -f s16le -ar 48000 -ch_layout mono bounce.raw

use std::fs::File;
use std::io::{BufWriter, Write};

use blockwave::sequencing::{Pitch, Pitcher, Sequencer};
use blockwave::voices::{epiano, vinyl};
use blockwave::{BlockScheduler, EngineConfig};
use color_eyre::eyre::Result;

const SECONDS: f64 = 8.0;
const BPM: f64 = 96.0;

fn main() -> Result<()> {
    color_eyre::install()?;

    let config = EngineConfig::default();
    let (mut scheduler, mut worker, handle) = BlockScheduler::with_config(config)?;

    let mut steps = Sequencer::with_steps(8, 0.5);
    for (i, name) in ["C3", "Eb3", "G3", "Bb3", "C4", "Bb3", "G3", "Eb3"]
        .iter()
        .enumerate()
    {
        steps.set_pitch(i, name.parse::<Pitch>()?);
    }
    let keys = Pitcher::new()
        .source(&steps)
        .base(epiano(Pitch::C4.frequency()))
        .with_bpm(BPM)
        .build()?;
    handle.plug_all([keys * 0.8, vinyl() * 0.3]);
    handle.play();

    let blocks = (SECONDS / config.block_seconds()).ceil() as u64;
    let mut block = vec![0i16; config.block_len];
    let mut writer = BufWriter::new(File::create("bounce.raw")?);
    let mut peak = 0i16;

    scheduler.pull(&mut block); // bootstrap block is silent
    for _ in 0..blocks {
        worker.run_once();
        scheduler.pull(&mut block);
        for &s in &block {
            writer.write_all(&s.to_le_bytes())?;
            peak = peak.max(s.saturating_abs());
        }
    }
    writer.flush()?;

    println!(
        "wrote {} blocks ({:.1}s) to bounce.raw, peak {:.2}",
        blocks,
        blocks as f64 * config.block_seconds(),
        peak as f64 / 32767.0
    );
    Ok(())
}
