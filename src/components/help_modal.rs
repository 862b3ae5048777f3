use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::{centered_modal, Theme};

/// Help modal component
pub struct HelpModal;

const SHORTCUTS: &[(&str, &str)] = &[
    ("Tab/→  ", "Next view (Chart/Table/Stats)"),
    ("S-Tab/←", "Previous view"),
    ("1-9    ", "Show/hide a schedule in the chart"),
    ("a      ", "Show all schedules"),
    ("j/↓    ", "Scroll down (table)"),
    ("k/↑    ", "Scroll up (table)"),
    ("g      ", "Go to top"),
    ("G      ", "Go to bottom"),
    ("r      ", "Reload logs from disk"),
    ("s      ", "Save the PNG plot again"),
    ("Esc    ", "Close modal"),
    ("q      ", "Quit"),
];

impl HelpModal {
    pub fn render(frame: &mut Frame, area: Rect) {
        let modal_area = centered_modal(area, 60, SHORTCUTS.len() as u16 + 6);

        // Clear the background
        frame.render_widget(Clear, modal_area);

        let mut help_text = vec![
            Line::styled("Keyboard Shortcuts", Style::default().bold().fg(Color::Cyan)),
            Line::raw(""),
        ];
        help_text.extend(SHORTCUTS.iter().map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!("  {}", key), Style::default().fg(Color::Yellow)),
                Span::raw(format!(" {}", desc)),
            ])
        }));
        help_text.push(Line::raw(""));
        help_text.push(Line::styled("Press Esc to close", Style::default().fg(Color::DarkGray)));

        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Theme::MODAL_BORDER))
            .style(Style::default().bg(Theme::MODAL_BG));

        let paragraph = Paragraph::new(help_text).block(block);

        frame.render_widget(paragraph, modal_area);
    }
}
