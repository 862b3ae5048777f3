use std::collections::HashSet;

use ratatui::{
    prelude::*,
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset as ChartDataset, GraphType, LegendPosition, Paragraph},
};

use crate::plot::padded_range;
use crate::timings::{ChunkTick, Dataset, Schedule};
use crate::ui::{border_style, schedule_color, title_style, Theme};

/// Line chart of chunk progression over execution time
pub struct ProgressChart;

impl ProgressChart {
    pub fn render(frame: &mut Frame, area: Rect, data: &Dataset, hidden: &HashSet<Schedule>, title: &str) {
        let block = Block::default()
            .title(Span::styled(format!(" {} ", title), title_style(true)))
            .borders(Borders::ALL)
            .border_style(border_style(true));

        let (Some((time_min, time_max)), Some((chunk_min, chunk_max))) =
            (data.time_bounds(), data.chunk_bounds())
        else {
            let empty = Paragraph::new("No chunk records found")
                .style(Style::default().fg(Theme::OVERLAY))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        };

        // Points must outlive the datasets that borrow them
        let series: Vec<(usize, &Schedule, Vec<(f64, f64)>)> = data
            .schedules()
            .iter()
            .enumerate()
            .filter(|(_, schedule)| !hidden.contains(*schedule))
            .map(|(i, schedule)| (i, schedule, data.series(schedule)))
            .collect();

        let datasets: Vec<ChartDataset> = series
            .iter()
            .map(|(i, schedule, points)| {
                ChartDataset::default()
                    .name(format!("{} {}", i + 1, schedule))
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(schedule_color(*i)))
                    .data(points)
            })
            .collect();

        let (x_min, x_max) = padded_range(time_min, time_max);
        let x_labels = time_labels(x_min.max(0.0), x_max);

        let max_labels = (area.height.saturating_sub(4) / 2).max(2) as usize;
        let y_bounds = if chunk_min == chunk_max {
            [chunk_min as f64 - 1.0, chunk_max as f64 + 1.0]
        } else {
            [chunk_min as f64, chunk_max as f64]
        };
        let y_labels = axis_labels(data.chunk_axis(), y_bounds, max_labels);

        let label_style = Style::default().fg(Theme::FG_DARK);
        let chart = Chart::new(datasets)
            .block(block)
            .style(Style::default().fg(Theme::FG))
            .x_axis(
                Axis::default()
                    .title(Span::styled("Execution Time (seconds)", label_style))
                    .style(Style::default().fg(Theme::SURFACE1))
                    .bounds([x_min.max(0.0), x_max])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled("Row Chunk", label_style))
                    .style(Style::default().fg(Theme::SURFACE1))
                    .bounds(y_bounds)
                    .labels(y_labels),
            )
            .legend_position(Some(LegendPosition::TopLeft))
            .hidden_legend_constraints((Constraint::Percentage(50), Constraint::Percentage(50)));

        frame.render_widget(chart, area);
    }
}

/// Labels for evenly spaced positions across `bounds`, the way the chart
/// lays them out. Each position shows the nearest chunk's label, or stays
/// blank when no chunk lies within half a step of it.
pub fn axis_labels(ticks: &[ChunkTick], bounds: [f64; 2], max_labels: usize) -> Vec<String> {
    let [lo, hi] = bounds;
    let span = (hi - lo).max(0.0);
    let count = max_labels.max(2).min(span.floor() as usize + 1).max(2);
    let step = span / (count - 1) as f64;

    (0..count)
        .map(|j| {
            let position = lo + step * j as f64;
            ticks
                .iter()
                .map(|t| (t, (t.chunk_id as f64 - position).abs()))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .filter(|(_, distance)| *distance <= step / 2.0)
                .map(|(t, _)| t.label.clone())
                .unwrap_or_default()
        })
        .collect()
}

/// Start, middle, and end labels for the time axis
pub fn time_labels(min: f64, max: f64) -> Vec<String> {
    let mid = (min + max) / 2.0;
    vec![
        format!("{:.2}", min),
        format!("{:.2}", mid),
        format!("{:.2}", max),
    ]
}
