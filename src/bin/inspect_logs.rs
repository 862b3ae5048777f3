use chunk_timeline::config::TimelineConfig;
use chunk_timeline::timings::{load_logs, Dataset};

fn main() {
    println!("Inspecting chunk logs...\n");

    let config = match TimelineConfig::discover(None) {
        Ok(config) => config,
        Err(e) => {
            println!("Config error: {}", e);
            return;
        }
    };

    match load_logs(&config) {
        Ok(logs) => {
            for log in &logs {
                println!("[{}] {:?}", log.schedule, log.path);
                if let Some(header) = &log.header {
                    println!("    header: {} rows/chunk, schedule {}", header.chunk_rows, header.schedule);
                }
                println!("    records: {}, skipped lines: {}", log.records.len(), log.skipped_lines);
                for r in &log.records {
                    let rank = r.rank.map(|n| format!(" rank {}", n)).unwrap_or_default();
                    println!(
                        "    line {:>4}: chunk {:>4} {:<12} {:>5} rows {:.6}s{}",
                        r.line_number, r.chunk_id, r.label, r.rows(), r.time, rank
                    );
                }
                println!();
            }

            let data = Dataset::from_logs(logs);
            for s in data.stats() {
                println!(
                    "{}: {} chunks, sum {:.3}s, mean {:.4}s, slowest {} ({:.4}s), imbalance {:.2}x",
                    s.schedule, s.chunks, s.total, s.mean, s.slowest, s.max, s.imbalance
                );
            }
        }
        Err(e) => {
            println!("Failed to load logs: {}", e);
        }
    }
}
