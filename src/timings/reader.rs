use glob::glob;
use regex::Regex;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

use super::models::{ChunkRecord, LogHeader, RunSummary, Schedule, ScheduleLog};
use crate::config::{LogSource, TimelineConfig};

#[derive(Error, Debug)]
pub enum LogError {
    #[error("Failed to open log {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {path:?} at line {line}: {source}")]
    Read {
        path: PathBuf,
        line: usize,
        source: std::io::Error,
    },

    #[error("Malformed chunk line {line} in {path:?}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Invalid log path pattern {pattern:?}: {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("No log files matched {0:?}")]
    NoMatches(String),
}

type Result<T> = core::result::Result<T, LogError>;

/// Compiled line patterns, built once
struct LinePatterns {
    /// "Rows    0-1979: 12.345678 seconds", optionally prefixed by "Rank N, "
    rows: Regex,
    rank_prefix: Regex,
    /// "Rank 2 processed rows 9900-14849 in 3.210000 seconds"
    processed: Regex,
    /// "Execution time per 1980-row chunk (schedule: static)"
    header: Regex,
}

static PATTERNS: OnceLock<LinePatterns> = OnceLock::new();

impl LinePatterns {
    fn new() -> Self {
        Self {
            rows: Regex::new(r"Rows\s+(\d+)\s*-\s*(\d+):\s+([\d.]+)\s+seconds")
                .expect("rows regex must compile"),
            rank_prefix: Regex::new(r"Rank\s+(\d+)").expect("rank regex must compile"),
            processed: Regex::new(
                r"Rank\s+(\d+)\s+processed rows\s+(\d+)\s*-\s*(\d+)\s+in\s+([\d.]+)\s+seconds",
            )
            .expect("processed regex must compile"),
            header: Regex::new(
                r"Execution time per\s+(\d+)-row chunk\s+\(schedule:\s*([^)\s]+)\)(?:\s*-\s*Rank\s+(\d+))?",
            )
            .expect("header regex must compile"),
        }
    }
}

fn patterns() -> &'static LinePatterns {
    PATTERNS.get_or_init(LinePatterns::new)
}

/// Fields captured from one chunk line
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub start: u64,
    pub end: u64,
    pub time: f64,
    pub rank: Option<u32>,
}

/// Extract (start, end, time) from a chunk line.
///
/// Returns `Ok(None)` for lines that are not chunk lines. A line that matches
/// but whose numbers don't convert is an error; the caller attaches file and
/// line context.
pub fn parse_line(line: &str) -> core::result::Result<Option<ParsedLine>, String> {
    let patterns = patterns();

    if let Some(caps) = patterns.rows.captures(line) {
        let start = parse_int::<u64>(&caps[1], "start row")?;
        let end = parse_int::<u64>(&caps[2], "end row")?;
        let time = parse_seconds(&caps[3])?;

        // Only look for a rank before the "Rows" keyword
        let prefix = &line[..caps.get(0).map(|m| m.start()).unwrap_or(0)];
        let rank = match patterns.rank_prefix.captures(prefix) {
            Some(rank_caps) => Some(parse_int::<u32>(&rank_caps[1], "rank")?),
            None => None,
        };

        return Ok(Some(ParsedLine { start, end, time, rank }));
    }

    if let Some(caps) = patterns.processed.captures(line) {
        let rank = parse_int::<u32>(&caps[1], "rank")?;
        let start = parse_int::<u64>(&caps[2], "start row")?;
        let end = parse_int::<u64>(&caps[3], "end row")?;
        let time = parse_seconds(&caps[4])?;
        return Ok(Some(ParsedLine {
            start,
            end,
            time,
            rank: Some(rank),
        }));
    }

    Ok(None)
}

fn parse_int<T: std::str::FromStr>(text: &str, what: &str) -> core::result::Result<T, String>
where
    T::Err: std::fmt::Display,
{
    text.parse::<T>()
        .map_err(|e| format!("invalid {} {:?}: {}", what, text, e))
}

fn parse_seconds(text: &str) -> core::result::Result<f64, String> {
    text.parse::<f64>()
        .map_err(|e| format!("invalid seconds {:?}: {}", text, e))
}

/// Parse the descriptive first line of a chunk log
pub fn parse_header(line: &str) -> Option<LogHeader> {
    let caps = patterns().header.captures(line)?;
    Some(LogHeader {
        chunk_rows: caps[1].parse().ok()?,
        schedule: Schedule::from_name(&caps[2]),
        rank: caps.get(3).and_then(|m| m.as_str().parse().ok()),
    })
}

/// Build a record from a parsed line
pub fn to_record(schedule: &Schedule, parsed: ParsedLine, divisor: u64, line_number: usize) -> ChunkRecord {
    ChunkRecord {
        schedule: schedule.clone(),
        chunk_id: parsed.start / divisor.max(1),
        label: format!("{}-{}", parsed.start, parsed.end),
        time: parsed.time,
        start: parsed.start,
        end: parsed.end,
        rank: parsed.rank,
        line_number,
    }
}

/// Parse a single chunk log
pub fn parse_log(schedule: &Schedule, path: &Path, divisor: u64) -> Result<ScheduleLog> {
    let file = File::open(path).map_err(|source| LogError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut header = None;
    let mut records = Vec::new();
    let mut skipped_lines = 0;

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(|source| LogError::Read {
            path: path.to_path_buf(),
            line: line_number,
            source,
        })?;

        let parsed = parse_line(&line).map_err(|reason| LogError::Malformed {
            path: path.to_path_buf(),
            line: line_number,
            reason,
        })?;

        match parsed {
            Some(parsed) => records.push(to_record(schedule, parsed, divisor, line_number)),
            None => {
                if header.is_none() {
                    header = parse_header(&line);
                    if header.is_some() {
                        continue;
                    }
                }
                if !line.trim().is_empty() {
                    tracing::debug!(path = ?path, line = line_number, "skipping non-chunk line");
                }
                skipped_lines += 1;
            }
        }
    }

    if let Some(ref h) = header {
        if &h.schedule != schedule {
            tracing::warn!(
                path = ?path,
                configured = %schedule,
                header = %h.schedule,
                "log header names a different schedule"
            );
        }
    }

    tracing::info!(path = ?path, schedule = %schedule, records = records.len(), "parsed log");

    Ok(ScheduleLog {
        schedule: schedule.clone(),
        path: path.to_path_buf(),
        header,
        records,
        skipped_lines,
    })
}

/// Expand a configured path. Glob patterns must match at least one file.
pub fn expand_log_paths(pattern: &str) -> Result<Vec<PathBuf>> {
    if !pattern.contains(['*', '?', '[']) {
        return Ok(vec![PathBuf::from(pattern)]);
    }

    let entries = glob(pattern).map_err(|e| LogError::Pattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let mut paths: Vec<PathBuf> = entries.flatten().filter(|p| p.is_file()).collect();
    if paths.is_empty() {
        return Err(LogError::NoMatches(pattern.to_string()));
    }
    paths.sort_by(|a, b| natural_key(a).cmp(&natural_key(b)));

    Ok(paths)
}

/// Sort key so that "rank10" follows "rank9"
fn natural_key(path: &Path) -> (String, u64, String) {
    let name = path.to_string_lossy().to_string();
    let digits_end = name.rfind(|c: char| c.is_ascii_digit()).map(|i| i + 1);
    match digits_end {
        Some(end) => {
            let begin = name[..end]
                .rfind(|c: char| !c.is_ascii_digit())
                .map(|i| i + 1)
                .unwrap_or(0);
            let number = name[begin..end].parse().unwrap_or(0);
            (name[..begin].to_string(), number, name[end..].to_string())
        }
        None => (name, 0, String::new()),
    }
}

/// Parse every configured source, in configuration order
pub fn load_source(source: &LogSource, divisor: u64) -> Result<Vec<ScheduleLog>> {
    expand_log_paths(&source.path)?
        .iter()
        .map(|path| parse_log(&source.schedule, path, divisor))
        .collect()
}

/// Load all logs named by the config
pub fn load_logs(config: &TimelineConfig) -> Result<Vec<ScheduleLog>> {
    let mut logs = Vec::new();
    for source in &config.logs {
        logs.extend(load_source(source, config.chunk_id_divisor)?);
    }
    Ok(logs)
}

/// Read summaries/summary_<schedule>.txt if it exists
pub fn load_summary(dir: &Path, schedule: &Schedule) -> Result<Option<RunSummary>> {
    let path = dir.join(format!("summary_{}.txt", schedule));
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).map_err(|source| LogError::Open {
        path: path.clone(),
        source,
    })?;
    let summary = parse_summary(&content);

    Ok(if summary.is_empty() { None } else { Some(summary) })
}

/// Read every summaries/summary_<schedule>_rank<N>.txt, in rank order
pub fn load_rank_summaries(dir: &Path, schedule: &Schedule) -> Result<Vec<RunSummary>> {
    let pattern = format!(
        "{}/summary_{}_rank*.txt",
        glob::Pattern::escape(&dir.to_string_lossy()),
        schedule
    );
    let entries = glob(&pattern).map_err(|e| LogError::Pattern {
        pattern: pattern.clone(),
        reason: e.to_string(),
    })?;

    let mut paths: Vec<PathBuf> = entries.flatten().filter(|p| p.is_file()).collect();
    paths.sort_by(|a, b| natural_key(a).cmp(&natural_key(b)));

    let mut summaries = Vec::with_capacity(paths.len());
    for path in paths {
        let content = fs::read_to_string(&path).map_err(|source| LogError::Open {
            path: path.clone(),
            source,
        })?;
        let summary = parse_summary(&content);
        if !summary.is_empty() {
            summaries.push(summary);
        }
    }

    Ok(summaries)
}

/// Summaries for every configured schedule that has one. A single
/// summary_<schedule>.txt wins over per-rank files.
pub fn load_summaries(config: &TimelineConfig) -> Result<HashMap<Schedule, RunSummary>> {
    let mut summaries = HashMap::new();
    let Some(dir) = config.summaries_dir.as_deref() else {
        return Ok(summaries);
    };

    for source in &config.logs {
        if summaries.contains_key(&source.schedule) {
            continue;
        }
        let summary = match load_summary(dir, &source.schedule)? {
            Some(summary) => Some(summary),
            None => {
                let ranks = load_rank_summaries(dir, &source.schedule)?;
                if !ranks.is_empty() {
                    tracing::debug!(schedule = %source.schedule, ranks = ranks.len(), "combining rank summaries");
                }
                RunSummary::from_ranks(&ranks)
            }
        };
        if let Some(summary) = summary {
            summaries.insert(source.schedule.clone(), summary);
        }
    }

    Ok(summaries)
}

/// Parse the "Key: value" lines of a run summary
pub fn parse_summary(content: &str) -> RunSummary {
    let mut summary = RunSummary::default();

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim() {
            // Rank summaries read "static (rank 3)"
            "Schedule" | "Tag" => {
                let name = value.split(" (rank").next().unwrap_or(value).trim();
                summary.schedule = Some(name.to_string());
            }
            "Execution time" => {
                summary.execution_time = value
                    .trim_end_matches("seconds")
                    .trim()
                    .parse()
                    .ok();
            }
            "Threads used" => summary.threads_used = value.parse().ok(),
            "Processors available" => summary.processors_available = value.parse().ok(),
            _ => {}
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_line_extracts_captured_values() {
        let parsed = parse_line("Rows 1980-3959: 10.123456 seconds").unwrap().unwrap();
        assert_eq!(parsed.start, 1980);
        assert_eq!(parsed.end, 3959);
        assert_eq!(parsed.time, 10.123456);
        assert_eq!(parsed.rank, None);
    }

    #[test]
    fn test_parse_line_padded_fields() {
        // "%4d-%4d" padding from the writer
        let parsed = parse_line("Rows    0- 199: 0.500000 seconds").unwrap().unwrap();
        assert_eq!((parsed.start, parsed.end), (0, 199));
    }

    #[test]
    fn test_parse_line_with_rank_prefix() {
        let parsed = parse_line("Rank 3, Rows 3600-4799: 1.250000 seconds").unwrap().unwrap();
        assert_eq!(parsed.rank, Some(3));
        assert_eq!(parsed.start, 3600);
    }

    #[test]
    fn test_parse_line_processed_format() {
        let parsed = parse_line("Rank 1 processed rows 4950-9899 in 7.500000 seconds")
            .unwrap()
            .unwrap();
        assert_eq!(parsed, ParsedLine { start: 4950, end: 9899, time: 7.5, rank: Some(1) });
    }

    #[test]
    fn test_parse_line_non_matching() {
        assert_eq!(parse_line("Execution time per 1980-row chunk (schedule: static)").unwrap(), None);
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("Rows 0-10 took a while").unwrap(), None);
    }

    #[test]
    fn test_parse_line_malformed_number() {
        assert!(parse_line("Rows 0-1979: 1.2.3 seconds").is_err());
        assert!(parse_line("Rows 99999999999999999999-1: 1.0 seconds").is_err());
    }

    #[test]
    fn test_parse_header() {
        let header = parse_header("Execution time per 1200-row chunk (schedule: dynamic) - Rank 4").unwrap();
        assert_eq!(header.chunk_rows, 1200);
        assert_eq!(header.schedule, Schedule::Dynamic);
        assert_eq!(header.rank, Some(4));

        let header = parse_header("Execution time per 1980-row chunk (schedule: static)").unwrap();
        assert_eq!(header.rank, None);
    }

    #[test]
    fn test_to_record_chunk_id_and_label() {
        let parsed = ParsedLine { start: 3960, end: 5939, time: 2.0, rank: None };
        let record = to_record(&Schedule::Guided, parsed, 200, 4);
        assert_eq!(record.chunk_id, 19);
        assert_eq!(record.label, "3960-5939");
        assert_eq!(record.line_number, 4);
    }

    #[test]
    fn test_parse_log_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Execution time per 1980-row chunk (schedule: static)").unwrap();
        writeln!(file, "Rows    0-1979: 1.500000 seconds").unwrap();
        writeln!(file, "garbage").unwrap();
        writeln!(file, "Rows 1980-3959: 2.500000 seconds").unwrap();

        let log = parse_log(&Schedule::Static, file.path(), 200).unwrap();
        assert_eq!(log.records.len(), 2);
        assert_eq!(log.skipped_lines, 1);
        assert_eq!(log.header.as_ref().map(|h| h.chunk_rows), Some(1980));
        assert_eq!(log.records[1].line_number, 4);
        assert_eq!(log.records[1].chunk_id, 9);
    }

    #[test]
    fn test_parse_log_malformed_reports_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Rows 0-1979: 1.0 seconds").unwrap();
        writeln!(file, "Rows 1980-3959: 1..0 seconds").unwrap();

        let err = parse_log(&Schedule::Static, file.path(), 200).unwrap_err();
        assert!(matches!(err, LogError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_parse_log_missing_file() {
        let err = parse_log(&Schedule::Static, Path::new("/nonexistent/log_static.txt"), 200).unwrap_err();
        assert!(matches!(err, LogError::Open { .. }));
    }

    #[test]
    fn test_expand_plain_path_untouched() {
        let paths = expand_log_paths("logs/log_static.txt").unwrap();
        assert_eq!(paths, vec![PathBuf::from("logs/log_static.txt")]);
    }

    #[test]
    fn test_expand_glob_natural_order() {
        let dir = tempfile::tempdir().unwrap();
        for rank in [0, 2, 10, 1] {
            fs::write(dir.path().join(format!("log_static_rank{}.txt", rank)), "").unwrap();
        }

        let pattern = dir.path().join("log_static_rank*.txt");
        let paths = expand_log_paths(&pattern.to_string_lossy()).unwrap();
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "log_static_rank0.txt",
                "log_static_rank1.txt",
                "log_static_rank2.txt",
                "log_static_rank10.txt",
            ]
        );
    }

    #[test]
    fn test_expand_glob_no_matches() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("*.txt");
        let err = expand_log_paths(&pattern.to_string_lossy()).unwrap_err();
        assert!(matches!(err, LogError::NoMatches(_)));
    }

    #[test]
    fn test_parse_summary() {
        let summary = parse_summary(
            "Schedule: guided\nExecution time: 42.500000 seconds\nThreads used: 8\nProcessors available: 16\n",
        );
        assert_eq!(summary.schedule.as_deref(), Some("guided"));
        assert_eq!(summary.execution_time, Some(42.5));
        assert_eq!(summary.threads_used, Some(8));
        assert_eq!(summary.processors_available, Some(16));
    }

    #[test]
    fn test_load_summary_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_summary(dir.path(), &Schedule::Static).unwrap(), None);
    }

    #[test]
    fn test_parse_rank_summary_strips_rank() {
        let summary = parse_summary(
            "Tag: mpi (rank 2)\nProcessed rows: 3960 to 5939\nExecution time: 1.500000 seconds\n",
        );
        assert_eq!(summary.schedule.as_deref(), Some("mpi"));
        assert_eq!(summary.execution_time, Some(1.5));
        assert_eq!(summary.threads_used, None);
    }

    #[test]
    fn test_load_summaries_combines_rank_files() {
        let dir = tempfile::tempdir().unwrap();
        for (rank, time) in [(0, "2.000000"), (1, "3.500000"), (10, "1.000000")] {
            fs::write(
                dir.path().join(format!("summary_static_rank{}.txt", rank)),
                format!(
                    "Schedule: static (rank {})\nExecution time: {} seconds\nThreads used: 2\nProcessors available: 4\n",
                    rank, time
                ),
            )
            .unwrap();
        }

        let ranks = load_rank_summaries(dir.path(), &Schedule::Static).unwrap();
        assert_eq!(ranks.len(), 3);
        assert_eq!(ranks[2].execution_time, Some(1.0));

        let config = TimelineConfig {
            logs: vec![LogSource::new(Schedule::Static, "logs/log_static_rank*.txt")],
            summaries_dir: Some(dir.path().to_path_buf()),
            ..TimelineConfig::default()
        };
        let summaries = load_summaries(&config).unwrap();
        let static_summary = &summaries[&Schedule::Static];
        assert_eq!(static_summary.schedule.as_deref(), Some("static"));
        assert_eq!(static_summary.execution_time, Some(3.5));
        assert_eq!(static_summary.threads_used, Some(6));
        assert_eq!(static_summary.processors_available, Some(4));
    }

    #[test]
    fn test_single_summary_wins_over_ranks() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("summary_dynamic.txt"), "Execution time: 9.0 seconds\n").unwrap();
        fs::write(dir.path().join("summary_dynamic_rank0.txt"), "Execution time: 1.0 seconds\n").unwrap();

        let config = TimelineConfig {
            logs: vec![LogSource::new(Schedule::Dynamic, "logs/log_dynamic.txt")],
            summaries_dir: Some(dir.path().to_path_buf()),
            ..TimelineConfig::default()
        };
        let summaries = load_summaries(&config).unwrap();
        assert_eq!(summaries[&Schedule::Dynamic].execution_time, Some(9.0));
    }
}
