use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::timings::{ChunkRecord, ChunkTick, Dataset, ScheduleStats};

/// JSON view of a parsed run
#[derive(Debug, Serialize)]
pub struct DatasetExport<'a> {
    pub schedules: Vec<&'a str>,
    pub chunk_axis: &'a [ChunkTick],
    pub records: &'a [ChunkRecord],
    pub stats: Vec<ScheduleStats>,
}

impl<'a> DatasetExport<'a> {
    pub fn new(data: &'a Dataset) -> Self {
        Self {
            schedules: data.schedules().iter().map(|s| s.as_str()).collect(),
            chunk_axis: data.chunk_axis(),
            records: data.records(),
            stats: data.stats(),
        }
    }
}

pub fn to_json(data: &Dataset) -> Result<String> {
    serde_json::to_string_pretty(&DatasetExport::new(data)).context("Failed to serialize dataset")
}

/// Write the dataset as pretty-printed JSON
pub fn write_json(data: &Dataset, path: &Path) -> Result<()> {
    let json = to_json(data)?;
    fs::write(path, json).context(format!("Failed to write {:?}", path))?;
    tracing::info!(path = ?path, records = data.records().len(), "exported dataset");
    Ok(())
}
