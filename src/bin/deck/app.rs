//! Deck - session state and key handling around a [`Player`]

use std::time::Duration;

use blockwave::engine::BlockTap;
use blockwave::{EngineError, Player};
use color_eyre::eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;

use crate::ui::{self, SpectrumAnalyzer};

pub struct Deck {
    player: Player,
    tap: BlockTap,
    script: String,
    /// Set while waiting for the render pipeline to drain so a rewind
    /// can land; cleared once the reset goes through.
    reset_armed: bool,
    resume_after_reset: bool,
    should_quit: bool,
    /// Freshest tapped window, scaled to floats for the scopes.
    vis: Vec<f32>,
    window: Vec<i16>,
    window_len: usize,
    spectrum: SpectrumAnalyzer,
}

impl Deck {
    pub fn new(mut player: Player, script: String) -> Self {
        let tap = player.take_tap().expect("the deck is the only tap consumer");
        let config = player.handle().config();
        let spectrum = SpectrumAnalyzer::new(config.block_len, config.sample_rate as f32);
        Deck {
            player,
            tap,
            script,
            reset_armed: false,
            resume_after_reset: false,
            should_quit: false,
            vis: Vec::new(),
            window: Vec::new(),
            window_len: config.block_len,
            spectrum,
        }
    }

    /// Run the terminal event loop until quit.
    pub fn run(mut self) -> Result<()> {
        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal);
        ratatui::restore();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.should_quit {
            self.poll_audio();
            self.settle_reset()?;

            let view = self.view();
            terminal.draw(|frame| ui::render(frame, &view))?;

            // non-blocking input at roughly 60 fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn poll_audio(&mut self) {
        if self.tap.drain_into(&mut self.window, self.window_len) == 0 {
            return;
        }
        self.vis.clear();
        self.vis
            .extend(self.window.iter().map(|&s| s as f32 / 32768.0));
        self.spectrum.update(&self.vis);
    }

    /// A rewind has to wait for the in-flight block; retry each tick
    /// until the engine accepts it.
    fn settle_reset(&mut self) -> Result<()> {
        if !self.reset_armed {
            return Ok(());
        }
        match self.player.reset() {
            Ok(()) => {
                self.reset_armed = false;
                if self.resume_after_reset {
                    self.resume_after_reset = false;
                    self.player.play()?;
                }
            }
            Err(EngineError::ResetWhileRendering) => {}
            // resuming playback cancels a pending rewind
            Err(EngineError::ResetWhilePlaying) => {
                self.reset_armed = false;
                self.resume_after_reset = false;
            }
            Err(err) => {
                self.reset_armed = false;
                return Err(err.into());
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) -> Result<()> {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                if self.player.is_playing() {
                    self.player.stop();
                } else {
                    self.player.play()?;
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.resume_after_reset = self.player.is_playing();
                self.player.stop();
                self.reset_armed = true;
            }
            _ => {}
        }
        Ok(())
    }

    fn view(&self) -> ui::DeckView<'_> {
        let handle = self.player.handle();
        ui::DeckView {
            script: &self.script,
            playing: handle.is_playing(),
            position_seconds: handle.position_seconds(),
            missed_deadlines: handle.missed_deadlines(),
            inputs: handle.input_count(),
            sample_rate: handle.config().sample_rate,
            reset_armed: self.reset_armed,
            samples: &self.vis,
            spectrum: self.spectrum.data(),
        }
    }
}
