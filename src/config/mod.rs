//! Configuration for the plot engine
//!
//! [`PlotConfig`] collects the tunables of the engine: worker pool size,
//! stagger margin, update throttling, undo depth, time-plot scrolling and the
//! defaults for new annotations and sample buffers. It is stored as TOML and
//! every field has a default, so partial files are fine.
//!
//! # Config Location
//!
//! The default file lives in the platform configuration directory:
//! - **Linux**: `~/.config/rtplot/plot.toml`
//! - **macOS**: `~/Library/Application Support/rtplot/plot.toml`
//! - **Windows**: `%APPDATA%\rtplot\plot.toml`
//!
//! # Example
//!
//! ```toml
//! [processing]
//! worker_threads = 4
//! stagger_gap = 0.1
//!
//! [update]
//! throttle_ms = 50
//!
//! [scroll]
//! step_secs = 5
//! ```

pub mod settings;

pub use settings::{AxisRangeEdit, RangeField};

use crate::data::DEFAULT_MAX_SAMPLES;
use crate::error::{PlotError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name below the platform configuration directory
pub const APP_DIR: &str = "rtplot";

/// Default config filename
pub const CONFIG_FILE: &str = "plot.toml";

/// Platform directory for plot configuration
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_DIR))
}

/// Path of the default configuration file
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotConfig {
    #[serde(default)]
    pub processing: ProcessingConfig,

    #[serde(default)]
    pub update: UpdateConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub scroll: ScrollConfig,

    #[serde(default)]
    pub annotation: AnnotationConfig,

    #[serde(default)]
    pub data: DataConfig,
}

/// Background processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Worker pool size, 0 picks one less than the available cores
    #[serde(default)]
    pub worker_threads: usize,

    /// Fraction of an axis span added above and below when staggering
    #[serde(default = "default_stagger_gap")]
    pub stagger_gap: f64,
}

fn default_stagger_gap() -> f64 {
    0.1
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            stagger_gap: default_stagger_gap(),
        }
    }
}

/// Update throttling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Dormant period after each update, in milliseconds
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
}

fn default_throttle_ms() -> u64 {
    100
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            throttle_ms: default_throttle_ms(),
        }
    }
}

/// Undo history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of undoable commands kept
    #[serde(default = "default_max_undo")]
    pub max_undo: usize,
}

fn default_max_undo() -> usize {
    50
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_undo: default_max_undo(),
        }
    }
}

/// Time-plot scrolling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Scroll step in seconds
    #[serde(default = "default_step_secs")]
    pub step_secs: u64,

    /// Distance of the X range end from "now", in percent of span plus
    /// step, beyond which a user change turns scrolling off
    #[serde(default = "default_stop_threshold")]
    pub stop_threshold_percent: u32,
}

fn default_step_secs() -> u64 {
    10
}

fn default_stop_threshold() -> u32 {
    25
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            step_secs: default_step_secs(),
            stop_threshold_percent: default_stop_threshold(),
        }
    }
}

/// Defaults for new annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationConfig {
    #[serde(default = "default_offset_x")]
    pub offset_x: f64,

    #[serde(default = "default_offset_y")]
    pub offset_y: f64,
}

fn default_offset_x() -> f64 {
    20.0
}

fn default_offset_y() -> f64 {
    -20.0
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            offset_x: default_offset_x(),
            offset_y: default_offset_y(),
        }
    }
}

/// Sample buffers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Capacity of sample buffers created from this config
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

fn default_max_samples() -> usize {
    DEFAULT_MAX_SAMPLES
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            max_samples: default_max_samples(),
        }
    }
}

impl PlotConfig {
    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read plot config {:?}", path))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse plot config {:?}", path))
    }

    /// Load a configuration file, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No plot config at {:?}, using defaults", path);
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load plot config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save to `path`, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PlotError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write plot config {:?}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Worker pool size with the automatic choice applied
    pub fn resolved_worker_threads(&self) -> usize {
        if self.processing.worker_threads > 0 {
            return self.processing.worker_threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get().saturating_sub(1))
            .unwrap_or(1)
            .max(1)
    }

    pub fn throttle_period(&self) -> Duration {
        Duration::from_millis(self.update.throttle_ms)
    }

    /// Scroll step of time plots, at least one second
    pub fn scroll_step(&self) -> chrono::Duration {
        let secs = self.scroll.step_secs.clamp(1, i64::MAX as u64 / 1000);
        if secs != self.scroll.step_secs {
            tracing::warn!("Scroll step of {}s out of range, using {}s", self.scroll.step_secs, secs);
        }
        chrono::Duration::seconds(secs as i64)
    }

    pub fn annotation_offset(&self) -> (f64, f64) {
        (self.annotation.offset_x, self.annotation.offset_y)
    }
}
