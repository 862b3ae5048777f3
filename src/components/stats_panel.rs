use std::collections::HashMap;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::timings::{RunSummary, Schedule, ScheduleStats};
use crate::ui::{border_style, schedule_color, title_style, Theme};

/// Side-by-side schedule comparison
pub struct StatsPanel;

impl StatsPanel {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        stats: &[ScheduleStats],
        summaries: &HashMap<Schedule, RunSummary>,
    ) {
        let block = Block::default()
            .title(Span::styled(" Schedule comparison ", title_style(true)))
            .borders(Borders::ALL)
            .border_style(border_style(true));

        if stats.is_empty() {
            let empty = Paragraph::new("No chunk records found")
                .style(Style::default().fg(Theme::OVERLAY))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let fastest = fastest_index(stats);

        let header = Row::new(vec![
            "Schedule", "Chunks", "Sum (s)", "Mean (s)", "Min (s)", "Max (s)", "Slowest",
            "Imbalance", "Wall (s)", "Threads", "CPUs",
        ])
        .style(Style::default().fg(Theme::FG_DARK))
        .bottom_margin(1);

        let rows: Vec<Row> = stats
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let summary = summaries.get(&s.schedule);
                let name_style = Style::default()
                    .fg(schedule_color(i))
                    .add_modifier(Modifier::BOLD);
                let total_style = if Some(i) == fastest {
                    Style::default().fg(Theme::GREEN).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Theme::FG)
                };

                Row::new(vec![
                    Cell::from(s.schedule.to_string()).style(name_style),
                    Cell::from(s.chunks.to_string()),
                    Cell::from(format!("{:.3}", s.total)).style(total_style),
                    Cell::from(format!("{:.3}", s.mean)),
                    Cell::from(format!("{:.3}", s.min)),
                    Cell::from(format!("{:.3}", s.max)),
                    Cell::from(s.slowest.clone()),
                    Cell::from(format!("{:.2}x", s.imbalance)).style(imbalance_style(s.imbalance)),
                    Cell::from(optional(summary.and_then(|m| m.execution_time), |t| format!("{:.3}", t))),
                    Cell::from(optional(summary.and_then(|m| m.threads_used), |t| t.to_string())),
                    Cell::from(optional(summary.and_then(|m| m.processors_available), |p| p.to_string())),
                ])
                .style(Style::default().fg(Theme::FG))
            })
            .collect();

        let widths = [
            Constraint::Length(10),
            Constraint::Length(7),
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(5),
        ];

        let table = Table::new(rows, widths).header(header).block(block);
        frame.render_widget(table, area);
    }
}

/// Index of the schedule with the lowest summed chunk time
pub fn fastest_index(stats: &[ScheduleStats]) -> Option<usize> {
    stats
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total.total_cmp(&b.total))
        .map(|(i, _)| i)
}

/// Color imbalance by severity
fn imbalance_style(imbalance: f64) -> Style {
    let color = if imbalance > 2.0 {
        Theme::RED
    } else if imbalance > 1.5 {
        Theme::PEACH
    } else if imbalance > 1.2 {
        Theme::YELLOW
    } else {
        Theme::GREEN
    };
    Style::default().fg(color)
}

fn optional<T>(value: Option<T>, format: impl Fn(T) -> String) -> String {
    value.map(format).unwrap_or_else(|| "-".to_string())
}
