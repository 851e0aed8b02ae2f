//! Parse a patch script and play part of it on the default output.
//!
//! Run with: cargo run --example live_patch

use std::thread;
use std::time::Duration;

use blockwave::signal::parse_patch;
use blockwave::Player;
use color_eyre::eyre::{eyre, Result};

const SCRIPT: &str = "\
#!blockwave
# lo-fi bed with a slow lead
bed = vinyl() * 0.4
carrier = sine(220) * 0.3 + sine(110) * 0.2
lead = carrier * decay(0.5) + epiano(440) / 6
";

fn main() -> Result<()> {
    color_eyre::install()?;

    let patch = parse_patch(SCRIPT)?;
    print!("{}", patch.script());

    let mut player = Player::new();
    let plugged = player.handle().try_plug_all(["bed", "lead"].iter().map(|&name| {
        patch
            .get(name)
            .cloned()
            .ok_or_else(|| eyre!("no binding named {name}"))
    }))?;
    println!("playing {plugged} inputs for 10 seconds");

    player.play()?;
    thread::sleep(Duration::from_secs(10));
    player.stop();
    Ok(())
}
