pub mod analyzer;
pub mod models;
pub mod reader;

pub use analyzer::{ChunkTick, Dataset, ScheduleStats};
pub use models::{ChunkRecord, LogHeader, RunSummary, Schedule, ScheduleLog};
pub use reader::{load_logs, load_summaries, load_summary, parse_line, LogError};
