use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing_subscriber::EnvFilter;

use chunk_timeline::action::Action;
use chunk_timeline::app::{App, ModalState, ViewMode};
use chunk_timeline::config::TimelineConfig;
use chunk_timeline::{export, tui};

/// Compare chunk execution timelines across scheduling policies
#[derive(Debug, Parser)]
#[command(name = "chunk-timeline", version, about)]
struct Cli {
    /// YAML config file (defaults to ./chunk-timeline.yaml, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the PNG plot
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write the parsed records and stats as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Save the plot and exit without opening the display
    #[arg(long)]
    no_display: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = TimelineConfig::discover(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(output) = cli.output {
        config.output = output;
    }

    let mut app = App::load(config)?;

    let saved = app.save_plot()?;
    println!("Plot saved as {}", saved.display());

    if let Some(path) = &cli.json {
        export::write_json(&app.data, path)?;
        println!("Records written to {}", path.display());
    }

    if cli.no_display {
        print_summary(&app);
        return Ok(());
    }

    run(&mut app)
}

/// Drive the terminal display until the user quits
fn run(app: &mut App) -> Result<()> {
    // Initialize terminal
    let mut terminal = tui::init()?;

    let result = event_loop(&mut terminal, app);

    // Restore terminal even when the loop failed
    tui::restore()?;

    result
}

fn event_loop(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(500);
    let frame_rate = Duration::from_millis(16);
    let mut last_frame = Instant::now();

    loop {
        // Effects advance by the time since the previous frame
        let elapsed = last_frame.elapsed();
        last_frame = Instant::now();
        terminal.draw(|frame| app.render_with_effects(frame, elapsed))?;

        // Redraw quickly while an effect is running
        let timeout = if app.effects.is_animating() { frame_rate } else { tick_rate };

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let action = handle_key_event(app, key);
                    app.handle_action(action)?;
                }
            }
        } else {
            app.handle_action(Action::Tick)?;
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Map a key press to an action
fn handle_key_event(app: &App, key: KeyEvent) -> Action {
    // Handle modal keys first
    if !matches!(app.modal, ModalState::None) {
        return match key.code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter => Action::CloseModal,
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
            _ => Action::None,
        };
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return Action::Quit
        }
        KeyCode::Char('?') => return Action::ShowHelp,
        KeyCode::Tab | KeyCode::Right => return Action::NextView,
        KeyCode::BackTab | KeyCode::Left => return Action::PrevView,
        KeyCode::Char('r') => return Action::Reload,
        KeyCode::Char('s') => return Action::SavePlot,
        _ => {}
    }

    // View-specific keys
    match app.view_mode {
        ViewMode::Chart => handle_chart_key(key),
        ViewMode::Table => handle_table_key(key),
        ViewMode::Stats => Action::None,
    }
}

/// Handle keys in chart view
fn handle_chart_key(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char(c @ '1'..='9') => Action::ToggleSchedule(c as usize - '1' as usize),
        KeyCode::Char('a') => Action::ShowAllSchedules,
        _ => Action::None,
    }
}

/// Handle keys in table view
fn handle_table_key(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => Action::Down,
        KeyCode::Char('k') | KeyCode::Up => Action::Up,
        KeyCode::Char('g') | KeyCode::Home => Action::Top,
        KeyCode::Char('G') | KeyCode::End => Action::Bottom,
        _ => Action::None,
    }
}

/// Plain-text comparison for headless runs
fn print_summary(app: &App) {
    let stats = app.data.stats();
    if stats.is_empty() {
        println!("No chunk records found");
        return;
    }

    println!(
        "{:<10} {:>7} {:>10} {:>10} {:>10} {:>12}",
        "schedule", "chunks", "sum (s)", "mean (s)", "max (s)", "slowest"
    );
    for s in &stats {
        println!(
            "{:<10} {:>7} {:>10.3} {:>10.3} {:>10.3} {:>12}",
            s.schedule.to_string(),
            s.chunks,
            s.total,
            s.mean,
            s.max,
            s.slowest
        );
    }

    for schedule in app.data.schedules() {
        if let Some(time) = app.summaries.get(schedule).and_then(|s| s.execution_time) {
            println!("{} wall time: {:.3}s", schedule, time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunk_timeline::timings::Dataset;
    use std::collections::HashMap;

    fn app() -> App {
        App::new(TimelineConfig::default(), Dataset::default(), HashMap::new())
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_global_keys() {
        let app = app();
        assert_eq!(handle_key_event(&app, press(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(handle_key_event(&app, press(KeyCode::Esc)), Action::Quit);
        assert_eq!(
            handle_key_event(&app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(handle_key_event(&app, press(KeyCode::Tab)), Action::NextView);
        assert_eq!(handle_key_event(&app, press(KeyCode::Left)), Action::PrevView);
        assert_eq!(handle_key_event(&app, press(KeyCode::Char('r'))), Action::Reload);
        assert_eq!(handle_key_event(&app, press(KeyCode::Char('s'))), Action::SavePlot);
    }

    #[test]
    fn test_digit_toggles_schedule_in_chart() {
        let app = app();
        assert_eq!(
            handle_key_event(&app, press(KeyCode::Char('1'))),
            Action::ToggleSchedule(0)
        );
        assert_eq!(
            handle_key_event(&app, press(KeyCode::Char('3'))),
            Action::ToggleSchedule(2)
        );
        assert_eq!(handle_key_event(&app, press(KeyCode::Char('a'))), Action::ShowAllSchedules);
    }

    #[test]
    fn test_table_scroll_keys() {
        let mut app = app();
        app.view_mode = ViewMode::Table;
        assert_eq!(handle_key_event(&app, press(KeyCode::Char('j'))), Action::Down);
        assert_eq!(handle_key_event(&app, press(KeyCode::Up)), Action::Up);
        assert_eq!(handle_key_event(&app, press(KeyCode::Char('G'))), Action::Bottom);
        assert_eq!(handle_key_event(&app, press(KeyCode::Char('1'))), Action::None);
    }

    #[test]
    fn test_modal_keys() {
        let mut app = app();
        app.modal = ModalState::Help;
        assert_eq!(handle_key_event(&app, press(KeyCode::Esc)), Action::CloseModal);
        assert_eq!(handle_key_event(&app, press(KeyCode::Char('?'))), Action::CloseModal);
        assert_eq!(handle_key_event(&app, press(KeyCode::Tab)), Action::None);

        // q quits from the help modal too
        assert_eq!(handle_key_event(&app, press(KeyCode::Char('q'))), Action::Quit);
        app.handle_action(Action::Quit).unwrap();
        assert!(app.should_quit);
    }
}
