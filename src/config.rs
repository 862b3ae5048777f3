use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::timings::Schedule;

/// Name of the config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "chunk-timeline.yaml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// One log file (or glob pattern) and the schedule it was produced under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSource {
    pub schedule: Schedule,
    pub path: String,
}

impl LogSource {
    pub fn new(schedule: Schedule, path: impl Into<String>) -> Self {
        Self {
            schedule,
            path: path.into(),
        }
    }
}

/// Output image dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotSize {
    pub width: u32,
    pub height: u32,
}

impl Default for PlotSize {
    fn default() -> Self {
        // 12x6 inches at 100 dpi
        Self {
            width: 1200,
            height: 600,
        }
    }
}

/// Tool configuration from chunk-timeline.yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    #[serde(default = "default_logs")]
    pub logs: Vec<LogSource>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_divisor")]
    pub chunk_id_divisor: u64,
    #[serde(default = "default_summaries_dir")]
    pub summaries_dir: Option<PathBuf>,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub plot_size: PlotSize,
}

fn default_logs() -> Vec<LogSource> {
    vec![
        LogSource::new(Schedule::Static, "logs/log_static.txt"),
        LogSource::new(Schedule::Dynamic, "logs/log_dynamic.txt"),
        LogSource::new(Schedule::Guided, "logs/log_guided.txt"),
    ]
}

fn default_output() -> PathBuf {
    PathBuf::from("execution_plot_custom_ylabels.png")
}

fn default_divisor() -> u64 {
    200
}

fn default_summaries_dir() -> Option<PathBuf> {
    Some(PathBuf::from("summaries"))
}

fn default_title() -> String {
    "Row Progression Over Execution Time (Y = Chunk Labels)".to_string()
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            logs: default_logs(),
            output: default_output(),
            chunk_id_divisor: default_divisor(),
            summaries_dir: default_summaries_dir(),
            title: default_title(),
            plot_size: PlotSize::default(),
        }
    }
}

impl TimelineConfig {
    /// Load a config from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: TimelineConfig =
            serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
                path: PathBuf::new(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logs.is_empty() {
            return Err(ConfigError::Invalid("at least one log source is required".to_string()));
        }
        if self.chunk_id_divisor == 0 {
            return Err(ConfigError::Invalid("chunk_id_divisor must be non-zero".to_string()));
        }
        if self.plot_size.width == 0 || self.plot_size.height == 0 {
            return Err(ConfigError::Invalid("plot_size must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Resolve the config: explicit path, then ./chunk-timeline.yaml,
    /// then the user config dir, then built-in defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            tracing::debug!(path = ?local, "using local config");
            return Self::load(local);
        }

        if let Some(user) = user_config_path() {
            if user.exists() {
                tracing::debug!(path = ?user, "using user config");
                return Self::load(user);
            }
        }

        Ok(Self::default())
    }
}

/// ~/.config/chunk-timeline/config.yaml (platform equivalent)
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chunk-timeline").join("config.yaml"))
}
