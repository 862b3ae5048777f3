use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::action::Action;
use crate::components::{ChunkTable, Header, HelpModal, ProgressChart, StatsPanel, StatusBar};
use crate::config::TimelineConfig;
use crate::effects::EffectManager;
use crate::plot::{render_png, PlotLabels};
use crate::timings::{load_logs, load_summaries, Dataset, RunSummary, Schedule};

/// How long a status message stays on screen
const MESSAGE_TTL: Duration = Duration::from_secs(5);

/// Current view mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Chart,
    Table,
    Stats,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Chart, ViewMode::Table, ViewMode::Stats];

    /// Cycle to the next view
    pub fn next(self) -> Self {
        match self {
            ViewMode::Chart => ViewMode::Table,
            ViewMode::Table => ViewMode::Stats,
            ViewMode::Stats => ViewMode::Chart,
        }
    }

    /// Cycle to the previous view
    pub fn prev(self) -> Self {
        match self {
            ViewMode::Chart => ViewMode::Stats,
            ViewMode::Table => ViewMode::Chart,
            ViewMode::Stats => ViewMode::Table,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewMode::Chart => "Chart",
            ViewMode::Table => "Table",
            ViewMode::Stats => "Stats",
        }
    }
}

/// Active modal state
#[derive(Debug, Clone, PartialEq)]
pub enum ModalState {
    None,
    Help,
}

/// Transient line shown above the keybindings
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub shown_at: Instant,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
            shown_at: Instant::now(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
            shown_at: Instant::now(),
        }
    }

    pub fn expired(&self) -> bool {
        self.shown_at.elapsed() >= MESSAGE_TTL
    }
}

/// Read every configured log and summary
pub fn read_run(config: &TimelineConfig) -> Result<(Dataset, HashMap<Schedule, RunSummary>)> {
    let logs = load_logs(config).context("Failed to load chunk logs")?;
    let summaries = load_summaries(config).context("Failed to load run summaries")?;
    Ok((Dataset::from_logs(logs), summaries))
}

/// Main application state
pub struct App {
    config: TimelineConfig,

    // View state
    pub view_mode: ViewMode,
    pub modal: ModalState,
    pub should_quit: bool,

    // Run data
    pub data: Dataset,
    pub summaries: HashMap<Schedule, RunSummary>,
    pub loaded_at: DateTime<Local>,

    /// Schedules switched off in the chart
    pub hidden: HashSet<Schedule>,

    pub message: Option<StatusMessage>,

    // Components
    pub chunk_table: ChunkTable,

    // Visual effects
    pub effects: EffectManager,
}

impl App {
    pub fn new(config: TimelineConfig, data: Dataset, summaries: HashMap<Schedule, RunSummary>) -> Self {
        Self {
            config,
            view_mode: ViewMode::Chart,
            modal: ModalState::None,
            should_quit: false,
            data,
            summaries,
            loaded_at: Local::now(),
            hidden: HashSet::new(),
            message: None,
            chunk_table: ChunkTable::new(),
            effects: EffectManager::new(),
        }
    }

    /// Load logs named by the config and build the app
    pub fn load(config: TimelineConfig) -> Result<Self> {
        let (data, summaries) = read_run(&config)?;
        Ok(Self::new(config, data, summaries))
    }

    /// Re-read all logs from disk
    pub fn reload(&mut self) -> Result<()> {
        let (data, summaries) = read_run(&self.config)?;
        self.data = data;
        self.summaries = summaries;
        self.loaded_at = Local::now();
        self.hidden.retain(|s| self.data.schedules().contains(s));
        self.chunk_table.clamp(self.data.chunk_axis().len());
        Ok(())
    }

    /// Write the PNG plot to the configured output path
    pub fn save_plot(&self) -> Result<PathBuf> {
        let labels = PlotLabels {
            title: &self.config.title,
            ..PlotLabels::default()
        };
        render_png(&self.data, &labels, self.config.plot_size, &self.config.output)
            .context(format!("Failed to save plot to {:?}", self.config.output))?;
        Ok(self.config.output.clone())
    }

    /// Schedules currently drawn in the chart
    pub fn visible_schedules(&self) -> Vec<&Schedule> {
        self.data
            .schedules()
            .iter()
            .filter(|s| !self.hidden.contains(*s))
            .collect()
    }

    /// Toggle a schedule by its 0-based position
    pub fn toggle_schedule(&mut self, index: usize) {
        let Some(schedule) = self.data.schedules().get(index).cloned() else {
            return;
        };
        if !self.hidden.remove(&schedule) {
            self.hidden.insert(schedule);
        }
    }

    fn table_len(&self) -> usize {
        self.data.chunk_axis().len()
    }

    pub fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => self.should_quit = true,

            Action::Up => {
                if self.view_mode == ViewMode::Table {
                    self.chunk_table.previous(self.table_len());
                }
            }
            Action::Down => {
                if self.view_mode == ViewMode::Table {
                    self.chunk_table.next(self.table_len());
                }
            }
            Action::Top => {
                if self.view_mode == ViewMode::Table {
                    self.chunk_table.top();
                }
            }
            Action::Bottom => {
                if self.view_mode == ViewMode::Table {
                    self.chunk_table.bottom(self.table_len());
                }
            }

            Action::NextView => self.view_mode = self.view_mode.next(),
            Action::PrevView => self.view_mode = self.view_mode.prev(),

            Action::ToggleSchedule(index) => self.toggle_schedule(index),
            Action::ShowAllSchedules => self.hidden.clear(),

            Action::Reload => match self.reload() {
                Ok(()) => {
                    self.message = Some(StatusMessage::info(format!(
                        "Reloaded {} chunks from {} schedules",
                        self.data.records().len(),
                        self.data.schedules().len()
                    )));
                    self.effects.trigger_status(true);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "reload failed");
                    self.message = Some(StatusMessage::error(format!("Reload failed: {:#}", e)));
                    self.effects.trigger_status(false);
                }
            },

            Action::SavePlot => match self.save_plot() {
                Ok(path) => {
                    self.message = Some(StatusMessage::info(format!("Saved {}", path.display())));
                    self.effects.trigger_status(true);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "saving plot failed");
                    self.message = Some(StatusMessage::error(format!("{:#}", e)));
                    self.effects.trigger_status(false);
                }
            },

            Action::ShowHelp => self.modal = ModalState::Help,
            Action::CloseModal => self.modal = ModalState::None,

            Action::Tick => {
                if self.message.as_ref().is_some_and(StatusMessage::expired) {
                    self.message = None;
                }
            }

            Action::None => {}
        }

        Ok(())
    }

    pub fn render(&mut self, frame: &mut ratatui::Frame) {
        use crate::ui::layout::main_layout;
        use crate::ui::Theme;

        // Set background color
        let bg_block = ratatui::widgets::Block::default()
            .style(ratatui::prelude::Style::default().bg(Theme::BG));
        frame.render_widget(bg_block, frame.area());

        let (header_area, body, footer) = main_layout(frame.area());

        Header::render(
            frame,
            header_area,
            self.view_mode,
            self.data.records().len(),
            self.data.schedules().len(),
            &self.loaded_at,
        );

        match self.view_mode {
            ViewMode::Chart => {
                ProgressChart::render(frame, body, &self.data, &self.hidden, &self.config.title);
            }
            ViewMode::Table => {
                self.chunk_table.render(frame, body, &self.data);
            }
            ViewMode::Stats => {
                StatsPanel::render(frame, body, &self.data.stats(), &self.summaries);
            }
        }

        StatusBar::render(frame, footer, self.view_mode, self.message.as_ref());

        // Modals (rendered last, on top)
        if self.modal == ModalState::Help {
            HelpModal::render(frame, frame.area());
        }
    }

    /// Render with visual effects
    pub fn render_with_effects(&mut self, frame: &mut ratatui::Frame, elapsed: Duration) {
        self.render(frame);

        let area = frame.area();

        // Startup fade-in (whole screen)
        self.effects.process(elapsed, frame.buffer_mut(), area);

        let (_, body_area, _) = crate::ui::layout::main_layout(area);
        self.effects.process_status(elapsed, frame.buffer_mut(), body_area);
    }
}
