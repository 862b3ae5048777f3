use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::models::{ChunkRecord, Schedule, ScheduleLog};

/// One labelled tick on the chunk (Y) axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkTick {
    pub chunk_id: u64,
    pub label: String,
}

/// Aggregated timing figures for one schedule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleStats {
    pub schedule: Schedule,
    pub chunks: usize,
    pub total: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Label of the slowest chunk
    pub slowest: String,
    /// max / mean; 1.0 means perfectly even chunks
    pub imbalance: f64,
}

/// All records from a run, grouped for plotting
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<ChunkRecord>,
    /// Schedules in order of first appearance
    schedules: Vec<Schedule>,
    /// Sorted by chunk_id
    chunk_axis: Vec<ChunkTick>,
}

impl Dataset {
    pub fn from_records(records: Vec<ChunkRecord>) -> Self {
        let mut schedules: Vec<Schedule> = Vec::new();
        for record in &records {
            if !schedules.contains(&record.schedule) {
                schedules.push(record.schedule.clone());
            }
        }

        // First label seen for each chunk id wins
        let mut labels: BTreeMap<u64, String> = BTreeMap::new();
        for record in &records {
            labels
                .entry(record.chunk_id)
                .or_insert_with(|| record.label.clone());
        }
        let chunk_axis = labels
            .into_iter()
            .map(|(chunk_id, label)| ChunkTick { chunk_id, label })
            .collect();

        Self {
            records,
            schedules,
            chunk_axis,
        }
    }

    pub fn from_logs(logs: Vec<ScheduleLog>) -> Self {
        Self::from_records(logs.into_iter().flat_map(|log| log.records).collect())
    }

    pub fn records(&self) -> &[ChunkRecord] {
        &self.records
    }

    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    pub fn chunk_axis(&self) -> &[ChunkTick] {
        &self.chunk_axis
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records for one schedule, in log order
    pub fn records_for<'a>(&'a self, schedule: &'a Schedule) -> impl Iterator<Item = &'a ChunkRecord> + 'a {
        self.records.iter().filter(move |r| &r.schedule == schedule)
    }

    /// (time, chunk_id) points for one schedule, in log order
    pub fn series(&self, schedule: &Schedule) -> Vec<(f64, f64)> {
        self.records_for(schedule)
            .map(|r| (r.time, r.chunk_id as f64))
            .collect()
    }

    /// Label shown for a chunk id on the Y axis
    pub fn label_for(&self, chunk_id: u64) -> Option<&str> {
        self.chunk_axis
            .binary_search_by_key(&chunk_id, |t| t.chunk_id)
            .ok()
            .map(|i| self.chunk_axis[i].label.as_str())
    }

    /// (min, max) time over all records
    pub fn time_bounds(&self) -> Option<(f64, f64)> {
        if self.records.is_empty() {
            return None;
        }
        let min = self.records.iter().map(|r| r.time).fold(f64::INFINITY, f64::min);
        let max = self.records.iter().map(|r| r.time).fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }

    /// (first, last) chunk id on the axis
    pub fn chunk_bounds(&self) -> Option<(u64, u64)> {
        Some((self.chunk_axis.first()?.chunk_id, self.chunk_axis.last()?.chunk_id))
    }

    /// Per-schedule time lookup by chunk id, for the table view.
    /// Records that share a chunk id under a coarse divisor are summed.
    pub fn time_matrix(&self) -> Vec<(ChunkTick, Vec<Option<f64>>)> {
        let mut cells: HashMap<(usize, u64), f64> = HashMap::new();
        for record in &self.records {
            if let Some(col) = self.schedules.iter().position(|s| s == &record.schedule) {
                *cells.entry((col, record.chunk_id)).or_insert(0.0) += record.time;
            }
        }

        self.chunk_axis
            .iter()
            .map(|tick| {
                let row = (0..self.schedules.len())
                    .map(|col| cells.get(&(col, tick.chunk_id)).copied())
                    .collect();
                (tick.clone(), row)
            })
            .collect()
    }

    pub fn stats(&self) -> Vec<ScheduleStats> {
        self.schedules
            .iter()
            .filter_map(|schedule| schedule_stats(schedule, self.records_for(schedule)))
            .collect()
    }
}

/// Compute stats over a schedule's records; None when there are none
pub fn schedule_stats<'a>(
    schedule: &Schedule,
    records: impl Iterator<Item = &'a ChunkRecord>,
) -> Option<ScheduleStats> {
    let mut chunks = 0usize;
    let mut total = 0.0f64;
    let mut min = f64::INFINITY;
    let mut slowest: Option<&ChunkRecord> = None;

    for record in records {
        chunks += 1;
        total += record.time;
        min = min.min(record.time);
        if slowest.map_or(true, |s| record.time > s.time) {
            slowest = Some(record);
        }
    }

    let slowest = slowest?;
    let mean = total / chunks as f64;
    let imbalance = if mean > 0.0 { slowest.time / mean } else { 1.0 };

    Some(ScheduleStats {
        schedule: schedule.clone(),
        chunks,
        total,
        mean,
        min,
        max: slowest.time,
        slowest: slowest.label.clone(),
        imbalance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(schedule: Schedule, start: u64, end: u64, time: f64) -> ChunkRecord {
        ChunkRecord {
            schedule,
            chunk_id: start / 200,
            label: format!("{}-{}", start, end),
            time,
            start,
            end,
            rank: None,
            line_number: 0,
        }
    }

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            record(Schedule::Static, 1980, 3959, 4.0),
            record(Schedule::Static, 0, 1979, 2.0),
            record(Schedule::Dynamic, 0, 1979, 1.0),
            record(Schedule::Dynamic, 1980, 3959, 3.0),
            record(Schedule::Guided, 3960, 5939, 5.0),
        ])
    }

    #[test]
    fn test_schedules_in_first_appearance_order() {
        let data = sample();
        assert_eq!(
            data.schedules(),
            &[Schedule::Static, Schedule::Dynamic, Schedule::Guided]
        );
    }

    #[test]
    fn test_chunk_axis_sorted_with_labels() {
        let data = sample();
        let ids: Vec<u64> = data.chunk_axis().iter().map(|t| t.chunk_id).collect();
        let labels: Vec<&str> = data.chunk_axis().iter().map(|t| t.label.as_str()).collect();
        assert_eq!(ids, vec![0, 9, 19]);
        assert_eq!(labels, vec!["0-1979", "1980-3959", "3960-5939"]);
        assert_eq!(data.label_for(9), Some("1980-3959"));
        assert_eq!(data.label_for(10), None);
    }

    #[test]
    fn test_first_label_wins_for_shared_chunk_id() {
        // 0-99 and 100-199 both map to chunk 0 with divisor 200
        let data = Dataset::from_records(vec![
            record(Schedule::Static, 100, 199, 1.0),
            record(Schedule::Dynamic, 0, 99, 1.0),
        ]);
        assert_eq!(data.chunk_axis().len(), 1);
        assert_eq!(data.chunk_axis()[0].label, "100-199");
    }

    #[test]
    fn test_series_keeps_log_order() {
        let data = sample();
        assert_eq!(data.series(&Schedule::Static), vec![(4.0, 9.0), (2.0, 0.0)]);
        assert!(data.series(&Schedule::Custom("mpi".to_string())).is_empty());
    }

    #[test]
    fn test_bounds() {
        let data = sample();
        assert_eq!(data.time_bounds(), Some((1.0, 5.0)));
        assert_eq!(data.chunk_bounds(), Some((0, 19)));
        assert_eq!(Dataset::default().time_bounds(), None);
    }

    #[test]
    fn test_stats() {
        let stats = sample().stats();
        assert_eq!(stats.len(), 3);

        let s = &stats[0];
        assert_eq!(s.schedule, Schedule::Static);
        assert_eq!(s.chunks, 2);
        assert_eq!(s.total, 6.0);
        assert_eq!(s.mean, 3.0);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.slowest, "1980-3959");
        assert!((s.imbalance - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_time_matrix() {
        let matrix = sample().time_matrix();
        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix[0].1, vec![Some(2.0), Some(1.0), None]);
        assert_eq!(matrix[2].1, vec![None, None, Some(5.0)]);
    }
}
