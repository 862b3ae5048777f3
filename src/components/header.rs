use chrono::{DateTime, Local};
use ratatui::{
    prelude::*,
    widgets::Paragraph,
};

use crate::app::ViewMode;
use crate::ui::Theme;

/// Header component with title, view tabs, and run info
pub struct Header;

impl Header {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        view: ViewMode,
        records: usize,
        schedules: usize,
        loaded_at: &DateTime<Local>,
    ) {
        use crate::ui::layout::header_layout;

        let (title_area, info_area) = header_layout(area);

        // Title and tabs
        let mut title_spans = vec![Span::styled(
            " Chunk Timeline ",
            Style::default().fg(Theme::BLUE).add_modifier(Modifier::BOLD),
        )];
        for tab in ViewMode::ALL {
            let style = if tab == view {
                Style::default().fg(Theme::LAVENDER).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(Theme::OVERLAY)
            };
            title_spans.push(Span::styled(" │ ", Style::default().fg(Theme::BORDER)));
            title_spans.push(Span::styled(tab.title(), style));
        }
        frame.render_widget(Paragraph::new(Line::from(title_spans)), title_area);

        let spans = vec![
            Span::styled(format!("{}", schedules), Style::default().fg(Theme::TEAL)),
            Span::styled(" schedules", Style::default().fg(Theme::FG_DARK)),
            Span::styled(" │ ", Style::default().fg(Theme::BORDER)),
            Span::styled(format!("{}", records), Style::default().fg(Theme::TEAL)),
            Span::styled(" chunks", Style::default().fg(Theme::FG_DARK)),
            Span::styled(" │ ", Style::default().fg(Theme::BORDER)),
            Span::styled("loaded ", Style::default().fg(Theme::FG_DARK)),
            Span::styled(loaded_at.format("%H:%M:%S").to_string(), Style::default().fg(Theme::FG)),
            Span::raw(" "),
        ];

        let info_widget = Paragraph::new(Line::from(spans)).alignment(Alignment::Right);
        frame.render_widget(info_widget, info_area);
    }
}
