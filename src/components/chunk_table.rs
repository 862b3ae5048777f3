use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
};

use crate::timings::Dataset;
use crate::ui::{border_style, schedule_color, selected_style, title_style, Theme};

/// Per-chunk time table, one column per schedule
pub struct ChunkTable {
    pub state: TableState,
}

impl ChunkTable {
    pub fn new() -> Self {
        let mut state = TableState::default();
        state.select(Some(0));
        Self { state }
    }

    /// Move selection up
    pub fn previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// Move selection down
    pub fn next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Go to top
    pub fn top(&mut self) {
        self.state.select(Some(0));
    }

    /// Go to bottom
    pub fn bottom(&mut self, len: usize) {
        if len > 0 {
            self.state.select(Some(len - 1));
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    /// Keep the selection inside the table after a reload
    pub fn clamp(&mut self, len: usize) {
        match self.state.selected() {
            Some(i) if i >= len => self.state.select(len.checked_sub(1)),
            None if len > 0 => self.state.select(Some(0)),
            _ => {}
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, data: &Dataset) {
        let matrix = data.time_matrix();
        let columns = data.schedules().len();

        // Slowest time per schedule column
        let column_max: Vec<Option<f64>> = (0..columns)
            .map(|col| {
                matrix
                    .iter()
                    .filter_map(|(_, row)| row[col])
                    .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |m| m.max(t))))
            })
            .collect();

        let mut header_cells = vec![Cell::from("Chunk").style(Style::default().fg(Theme::FG_DARK))];
        header_cells.extend(data.schedules().iter().enumerate().map(|(i, schedule)| {
            Cell::from(schedule.to_string()).style(
                Style::default()
                    .fg(schedule_color(i))
                    .add_modifier(Modifier::BOLD),
            )
        }));
        let header = Row::new(header_cells).height(1).bottom_margin(1);

        let rows: Vec<Row> = matrix
            .iter()
            .map(|(tick, times)| {
                let mut cells = vec![Cell::from(tick.label.clone())];
                cells.extend(times.iter().enumerate().map(|(col, time)| match time {
                    Some(t) => {
                        let style = if column_max[col] == Some(*t) && matrix.len() > 1 {
                            Style::default().fg(Theme::RED)
                        } else {
                            Style::default().fg(Theme::FG)
                        };
                        Cell::from(format!("{:>10.6}", t)).style(style)
                    }
                    None => Cell::from(format!("{:>10}", "-")).style(Style::default().fg(Theme::OVERLAY)),
                }));
                Row::new(cells)
            })
            .collect();

        let mut widths = vec![Constraint::Length(13)];
        widths.extend(std::iter::repeat(Constraint::Length(12)).take(columns));

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .title(Span::styled(
                        format!(" Chunk times (s) · {} chunks ", matrix.len()),
                        title_style(true),
                    ))
                    .borders(Borders::ALL)
                    .border_style(border_style(true)),
            )
            .row_highlight_style(selected_style())
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(table, area, &mut self.state);
    }
}

impl Default for ChunkTable {
    fn default() -> Self {
        Self::new()
    }
}
