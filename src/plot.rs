//! PNG rendering of chunk timelines
//!
//! Draws every schedule as a line of (execution time, chunk) points using
//! the [`plotters`] bitmap backend. The Y axis carries one key point per
//! chunk tick, labelled with that chunk's row range.

use plotters::coord::ranged1d::{KeyPointHint, NoDefaultFormatting, Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;

use crate::config::PlotSize;
use crate::timings::{ChunkTick, Dataset};

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

/// Fraction of the data range added on each side of an axis
const AXIS_MARGIN: f64 = 0.05;

/// Text and labels drawn on the chart
#[derive(Debug, Clone)]
pub struct PlotLabels<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
}

impl Default for PlotLabels<'_> {
    fn default() -> Self {
        Self {
            title: "Row Progression Over Execution Time (Y = Chunk Labels)",
            x_label: "Execution Time (seconds)",
            y_label: "Row Chunk",
        }
    }
}

/// Pad a range by [`AXIS_MARGIN`]; a zero-width range gets a unit span
pub fn padded_range(min: f64, max: f64) -> (f64, f64) {
    let span = max - min;
    if span <= f64::EPSILON {
        return (min - 0.5, max + 0.5);
    }
    let pad = span * AXIS_MARGIN;
    (min - pad, max + pad)
}

/// Palette colour for the nth series
pub fn series_color(index: usize) -> RGBColor {
    let (r, g, b) = Palette99::pick(index).rgb();
    RGBColor(r, g, b)
}

/// Label for a Y value: the row range of the chunk with that id, or
/// nothing when the value is not a chunk id on the axis
pub fn chunk_tick_label(ticks: &[ChunkTick], value: f64) -> String {
    let id = value.round();
    if !id.is_finite() || id < 0.0 || (value - id).abs() > 1e-6 {
        return String::new();
    }
    ticks
        .binary_search_by_key(&(id as u64), |t| t.chunk_id)
        .map(|i| ticks[i].label.clone())
        .unwrap_or_default()
}

/// Y axis whose key points are the chunk ids, labelled by row range
#[derive(Clone)]
pub struct ChunkAxis {
    range: RangedCoordf64,
    ticks: Vec<ChunkTick>,
}

impl ChunkAxis {
    pub fn new(range: Range<f64>, ticks: &[ChunkTick]) -> Self {
        Self {
            range: range.into(),
            ticks: ticks.to_vec(),
        }
    }

    pub fn label(&self, value: f64) -> String {
        chunk_tick_label(&self.ticks, value)
    }
}

impl Ranged for ChunkAxis {
    type FormatOption = NoDefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.range.map(value, limit)
    }

    /// Every chunk id when they fit, otherwise an even sample that keeps
    /// the first and last
    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        let n = self.ticks.len();
        let max = hint.max_num_points();
        if n <= max {
            return self.ticks.iter().map(|t| t.chunk_id as f64).collect();
        }
        if max < 2 {
            return Vec::new();
        }
        let mut points: Vec<f64> = (0..max)
            .map(|j| self.ticks[j * (n - 1) / (max - 1)].chunk_id as f64)
            .collect();
        points.dedup();
        points
    }

    fn range(&self) -> Range<f64> {
        self.range.range()
    }
}

impl ValueFormatter<f64> for ChunkAxis {
    fn format(_value: &f64) -> String {
        String::new()
    }

    fn format_ext(&self, value: &f64) -> String {
        self.label(*value)
    }
}

/// Render the dataset as a PNG line chart
///
/// # Arguments
/// * `data` - Parsed records grouped by schedule
/// * `labels` - Chart caption and axis descriptions
/// * `size` - Output resolution in pixels
/// * `output_path` - Where the PNG is written
///
/// # Returns
/// * `Err(PlotError::InvalidData)` - If there is nothing to plot; no file is created
pub fn render_png(data: &Dataset, labels: &PlotLabels<'_>, size: PlotSize, output_path: &Path) -> Result<()> {
    let (time_min, time_max) = data
        .time_bounds()
        .ok_or_else(|| PlotError::InvalidData("No chunk records to plot".to_string()))?;
    let (chunk_min, chunk_max) = data
        .chunk_bounds()
        .ok_or_else(|| PlotError::InvalidData("No chunk records to plot".to_string()))?;

    if !time_min.is_finite() || !time_max.is_finite() {
        return Err(PlotError::InvalidData(
            "Chunk times must be finite".to_string(),
        ));
    }

    let (x_min, x_max) = padded_range(time_min, time_max);
    let (y_min, y_max) = padded_range(chunk_min as f64, chunk_max as f64);
    let y_axis = ChunkAxis::new(y_min..y_max, data.chunk_axis());
    let y_labels = y_axis.clone();

    let root = BitMapBackend::new(output_path, (size.width, size.height));
    let drawing_area = root.into_drawing_area();

    drawing_area
        .fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&drawing_area)
        .caption(labels.title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(110)
        .build_cartesian_2d(x_min..x_max, y_axis)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc(labels.x_label)
        .y_desc(labels.y_label)
        .label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 20))
        .x_label_formatter(&|x| format!("{:.2}", x))
        .y_label_formatter(&|y| y_labels.label(*y))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    for (index, schedule) in data.schedules().iter().enumerate() {
        let color = series_color(index);
        let points = data.series(schedule);

        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label(schedule.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

        chart
            .draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", 16))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    drawing_area
        .present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    tracing::info!(path = ?output_path, schedules = data.schedules().len(), "saved plot");

    Ok(())
}
