//! Terminal widgets for the deck
//!
//! Transport bar, the patch script, and scopes fed by the player's
//! block tap.

pub mod state;

mod spectrum;
mod transport;
mod waveform;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub use spectrum::SpectrumAnalyzer;
pub use state::DeckView;

use spectrum::render_spectrum;
use transport::render_transport;
use waveform::render_waveform;

pub fn render(frame: &mut Frame, view: &DeckView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // transport bar
            Constraint::Min(4),    // patch script
            Constraint::Length(8), // waveform
            Constraint::Length(8), // spectrum
            Constraint::Length(1), // help bar
        ])
        .split(frame.area());

    render_transport(frame, chunks[0], view);
    render_patch(frame, chunks[1], view.script);
    render_waveform(frame, chunks[2], view.samples);
    render_spectrum(frame, chunks[3], view.spectrum);

    let help = Paragraph::new(" [Q] Quit  [Space] Play/Pause  [R] Rewind")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[4]);
}

fn render_patch(frame: &mut Frame, area: Rect, script: &str) {
    let block = Block::default().title(" Patch ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(script).block(block), area);
}
