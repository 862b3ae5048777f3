use std::fs;
use std::path::Path;

use chunk_timeline::config::TimelineConfig;
use chunk_timeline::export;
use chunk_timeline::timings::{load_logs, load_summaries, Dataset, LogError, Schedule};
use tempfile::TempDir;

const STATIC_LOG: &str = "Execution time per 1980-row chunk (schedule: static)
Rows    0-1979: 2.000000 seconds
Rows 1980-3959: 3.000000 seconds
Rows 3960-5939: 4.000000 seconds
";

const DYNAMIC_LOG: &str = "Execution time per 1980-row chunk (schedule: dynamic)
Rows 1980-3959: 1.500000 seconds
Rows    0-1979: 1.000000 seconds
warming caches
Rows 3960-5939: 1.250000 seconds
";

const GUIDED_LOG: &str = "Execution time per 1980-row chunk (schedule: guided)
Rows    0-1979: 0.500000 seconds
Rows 5940-7919: 2.500000 seconds
";

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn config_yaml(dir: &Path) -> String {
    format!(
        "logs:
  - schedule: static
    path: {dir}/log_static.txt
  - schedule: dynamic
    path: {dir}/log_dynamic.txt
  - schedule: guided
    path: {dir}/log_guided.txt
output: {dir}/plot.png
summaries_dir: {dir}/summaries
",
        dir = dir.display()
    )
}

fn fixture() -> (TempDir, TimelineConfig) {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "log_static.txt", STATIC_LOG);
    write(dir.path(), "log_dynamic.txt", DYNAMIC_LOG);
    write(dir.path(), "log_guided.txt", GUIDED_LOG);

    fs::create_dir(dir.path().join("summaries")).unwrap();
    write(
        &dir.path().join("summaries"),
        "summary_dynamic.txt",
        "Schedule: dynamic\nExecution time: 3.812 seconds\nThreads used: 4\nProcessors available: 8\n",
    );

    let config_path = dir.path().join("chunk-timeline.yaml");
    fs::write(&config_path, config_yaml(dir.path())).unwrap();
    let config = TimelineConfig::load(&config_path).unwrap();

    (dir, config)
}

#[test]
fn test_pipeline_keeps_log_order_and_builds_axis() {
    let (_dir, config) = fixture();

    let logs = load_logs(&config).unwrap();
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[1].skipped_lines, 1);
    assert!(logs.iter().all(|log| log.header.is_some()));

    let data = Dataset::from_logs(logs);
    assert_eq!(
        data.schedules(),
        &[Schedule::Static, Schedule::Dynamic, Schedule::Guided]
    );
    assert_eq!(data.records().len(), 8);

    // Series follow file order, not chunk order
    let dynamic = data.series(&Schedule::Dynamic);
    assert_eq!(dynamic, vec![(1.5, 9.0), (1.0, 0.0), (1.25, 19.0)]);

    let ids: Vec<u64> = data.chunk_axis().iter().map(|t| t.chunk_id).collect();
    assert_eq!(ids, vec![0, 9, 19, 29]);
    assert_eq!(data.label_for(29), Some("5940-7919"));
}

#[test]
fn test_pipeline_stats_and_summaries() {
    let (_dir, config) = fixture();

    let data = Dataset::from_logs(load_logs(&config).unwrap());
    let stats = data.stats();
    assert_eq!(stats.len(), 3);
    assert_eq!(stats[0].schedule, Schedule::Static);
    assert_eq!(stats[0].chunks, 3);
    assert!((stats[0].total - 9.0).abs() < 1e-9);
    assert_eq!(stats[0].slowest, "3960-5939");

    let summaries = load_summaries(&config).unwrap();
    assert_eq!(summaries.len(), 1);
    let dynamic = &summaries[&Schedule::Dynamic];
    assert_eq!(dynamic.execution_time, Some(3.812));
    assert_eq!(dynamic.threads_used, Some(4));
}

#[test]
fn test_pipeline_json_export() {
    let (dir, config) = fixture();
    let data = Dataset::from_logs(load_logs(&config).unwrap());

    let path = dir.path().join("run.json");
    export::write_json(&data, &path).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["records"].as_array().unwrap().len(), 8);
    assert_eq!(value["stats"].as_array().unwrap().len(), 3);
    assert_eq!(value["records"][0]["label"], "0-1979");
}

#[test]
fn test_missing_log_is_an_error() {
    let (dir, config) = fixture();
    fs::remove_file(dir.path().join("log_guided.txt")).unwrap();

    match load_logs(&config) {
        Err(LogError::Open { path, .. }) => assert!(path.ends_with("log_guided.txt")),
        other => panic!("expected open error, got {:?}", other),
    }
}

#[test]
fn test_malformed_chunk_line_names_file_and_line() {
    let (dir, config) = fixture();
    write(
        dir.path(),
        "log_static.txt",
        "Rows 0-1979: 2.000000 seconds\nRows 1980-3959: 1.2.3 seconds\n",
    );

    match load_logs(&config) {
        Err(LogError::Malformed { path, line, .. }) => {
            assert!(path.ends_with("log_static.txt"));
            assert_eq!(line, 2);
        }
        other => panic!("expected malformed error, got {:?}", other),
    }
}

#[test]
fn test_glob_source_loads_ranks_in_natural_order() {
    let dir = TempDir::new().unwrap();
    for rank in [0u32, 2, 10] {
        write(
            dir.path(),
            &format!("log_static_rank{}.txt", rank),
            &format!("Rank {}, Rows {}-{}: 1.000000 seconds\n", rank, rank * 100, rank * 100 + 99),
        );
    }

    let yaml = format!(
        "logs:\n  - schedule: static\n    path: {}/log_static_rank*.txt\nsummaries_dir: null\n",
        dir.path().display()
    );
    let config = TimelineConfig::from_yaml(&yaml).unwrap();

    let logs = load_logs(&config).unwrap();
    let ranks: Vec<Option<u32>> = logs.iter().map(|l| l.records[0].rank).collect();
    assert_eq!(ranks, vec![Some(0), Some(2), Some(10)]);
    assert!(load_summaries(&config).unwrap().is_empty());
}

#[test]
fn test_rank_logs_pick_up_rank_summaries() {
    let dir = TempDir::new().unwrap();
    let summaries = dir.path().join("summaries");
    fs::create_dir(&summaries).unwrap();
    for rank in [0u32, 1] {
        write(
            dir.path(),
            &format!("log_static_rank{}.txt", rank),
            &format!("Rank {}, Rows {}-{}: 1.000000 seconds\n", rank, rank * 1980, rank * 1980 + 1979),
        );
        write(
            &summaries,
            &format!("summary_static_rank{}.txt", rank),
            &format!(
                "Schedule: static (rank {})\nExecution time: {}.000000 seconds\nThreads used: 4\nProcessors available: 8\n",
                rank,
                rank + 1
            ),
        );
    }

    let yaml = format!(
        "logs:\n  - schedule: static\n    path: {dir}/log_static_rank*.txt\nsummaries_dir: {dir}/summaries\n",
        dir = dir.path().display()
    );
    let config = TimelineConfig::from_yaml(&yaml).unwrap();

    let data = Dataset::from_logs(load_logs(&config).unwrap());
    assert_eq!(data.records().len(), 2);

    let loaded = load_summaries(&config).unwrap();
    let summary = &loaded[&Schedule::Static];
    assert_eq!(summary.execution_time, Some(2.0));
    assert_eq!(summary.threads_used, Some(8));
}
