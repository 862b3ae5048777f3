use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Work-distribution policy a log was produced under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Schedule {
    Static,
    Dynamic,
    Guided,
    /// Anything else (e.g. "mpi", "auto")
    Custom(String),
}

impl Schedule {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "static" => Self::Static,
            "dynamic" => Self::Dynamic,
            "guided" => Self::Guided,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Static => "static",
            Self::Dynamic => "dynamic",
            Self::Guided => "guided",
            Self::Custom(name) => name,
        }
    }
}

impl From<String> for Schedule {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<Schedule> for String {
    fn from(schedule: Schedule) -> Self {
        schedule.as_str().to_string()
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timed chunk extracted from a log line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkRecord {
    pub schedule: Schedule,
    /// Y value on the plot (`start / divisor`)
    pub chunk_id: u64,
    /// "start-end" as shown on the Y axis
    pub label: String,
    /// Seconds spent on the chunk
    pub time: f64,
    pub start: u64,
    /// Inclusive
    pub end: u64,
    /// MPI rank for hybrid runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    pub line_number: usize,
}

impl ChunkRecord {
    pub fn rows(&self) -> u64 {
        self.end.saturating_sub(self.start) + 1
    }
}

/// First line of a chunk log: "Execution time per N-row chunk (schedule: X)"
#[derive(Debug, Clone, PartialEq)]
pub struct LogHeader {
    pub chunk_rows: u64,
    pub schedule: Schedule,
    pub rank: Option<u32>,
}

/// All records read from a single log file
#[derive(Debug, Clone)]
pub struct ScheduleLog {
    pub schedule: Schedule,
    pub path: PathBuf,
    pub header: Option<LogHeader>,
    pub records: Vec<ChunkRecord>,
    /// Lines that did not match any chunk pattern
    pub skipped_lines: usize,
}

/// Contents of summaries/summary_<schedule>.txt, or the combination of
/// the per-rank summary_<schedule>_rank<N>.txt files
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub schedule: Option<String>,
    pub execution_time: Option<f64>,
    pub threads_used: Option<u32>,
    pub processors_available: Option<u32>,
}

impl RunSummary {
    pub fn is_empty(&self) -> bool {
        self.schedule.is_none()
            && self.execution_time.is_none()
            && self.threads_used.is_none()
            && self.processors_available.is_none()
    }

    /// Combine per-rank summaries: the slowest rank's time, the threads of
    /// all ranks added up, and the largest processor count
    pub fn from_ranks(ranks: &[RunSummary]) -> Option<Self> {
        let first = ranks.first()?;

        let execution_time = ranks
            .iter()
            .filter_map(|r| r.execution_time)
            .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |m| m.max(t))));
        let threads: Vec<u32> = ranks.iter().filter_map(|r| r.threads_used).collect();

        Some(Self {
            schedule: first.schedule.clone(),
            execution_time,
            threads_used: if threads.is_empty() { None } else { Some(threads.iter().sum()) },
            processors_available: ranks.iter().filter_map(|r| r.processors_available).max(),
        })
    }
}
