//! Transport bar widget - play state, position, and deadline stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::DeckView;

struct AudioStats {
    peak: f32,
    rms: f32,
}

impl AudioStats {
    fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub fn render_transport(frame: &mut Frame, area: Rect, view: &DeckView) {
    let block = Block::default().title(" deck ").borders(Borders::ALL);
    let stats = AudioStats::from_buffer(view.samples);

    let play_symbol = if view.playing { "▶" } else { "⏸" };
    let play_state = if view.reset_armed {
        "Rewinding"
    } else if view.playing {
        "Playing"
    } else {
        "Paused"
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} {}  ", play_symbol, play_state),
            Style::default().fg(if view.playing {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(
            format!("{:>8.2}s  ", view.position_seconds),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{} inputs  ", view.inputs),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{:.1}kHz  ", view.sample_rate as f64 / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}  ", stats.peak, stats.rms),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            format!("Missed: {}", view.missed_deadlines),
            Style::default().fg(if view.missed_deadlines == 0 {
                Color::DarkGray
            } else {
                Color::Red
            }),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
