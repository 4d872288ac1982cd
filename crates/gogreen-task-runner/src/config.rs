/*
[INPUT]:  YAML configuration file plus GOGREEN__* environment overrides
[OUTPUT]: Validated runner configuration (windows, ticker, uploads, seed tasks)
[POS]:    Configuration layer - runner setup
[UPDATE]: When adding new configuration options
*/

use std::collections::HashSet;
use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use gogreen_task_core::WindowSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Source could not be read or deserialized
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// Values are present but unusable
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration for the task runner
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunnerConfig {
    /// Photo time-box lengths
    #[serde(default)]
    pub engine: WindowSettings,
    /// Clock tick cadence
    #[serde(default)]
    pub ticker: TickerConfig,
    /// Simulated photo storage behaviour
    #[serde(default)]
    pub uploads: UploadConfig,
    /// Seconds between dashboard reports in headless mode
    #[serde(default = "default_report_interval_secs")]
    pub report_interval_secs: u64,
    /// Tasks assigned at startup
    #[serde(default)]
    pub tasks: Vec<TaskSeed>,
}

/// Ticker configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TickerConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

/// Simulated uploader configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    #[serde(default = "default_min_latency_ms")]
    pub min_latency_ms: u64,
    #[serde(default = "default_max_latency_ms")]
    pub max_latency_ms: u64,
    /// Probability in [0, 1] that an upload fails
    #[serde(default)]
    pub failure_rate: f64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            min_latency_ms: default_min_latency_ms(),
            max_latency_ms: default_max_latency_ms(),
            failure_rate: 0.0,
        }
    }
}

/// Task assigned when the runner starts
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TaskSeed {
    pub id: String,
    pub title: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            engine: WindowSettings::default(),
            ticker: TickerConfig::default(),
            uploads: UploadConfig::default(),
            report_interval_secs: default_report_interval_secs(),
            tasks: Vec::new(),
        }
    }
}

fn default_report_interval_secs() -> u64 {
    5
}

fn default_interval_ms() -> u64 {
    1_000
}

fn default_min_latency_ms() -> u64 {
    600
}

fn default_max_latency_ms() -> u64 {
    1_100
}

impl RunnerConfig {
    /// Load configuration from a YAML file, applying `GOGREEN__` env overrides
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml))
            .add_source(env_overrides())
            .build()?;
        Self::finish(settings)
    }

    /// Load configuration from YAML text without environment overrides
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?;
        Self::finish(settings)
    }

    fn finish(settings: Config) -> Result<Self, ConfigError> {
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.before_window_secs == 0 || self.engine.after_window_secs == 0 {
            return Err(ConfigError::Invalid(
                "photo windows must be at least one second".to_string(),
            ));
        }
        if self.ticker.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "ticker.interval_ms must be positive".to_string(),
            ));
        }
        if self.report_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "report_interval_secs must be positive".to_string(),
            ));
        }
        if self.uploads.min_latency_ms > self.uploads.max_latency_ms {
            return Err(ConfigError::Invalid(format!(
                "uploads.min_latency_ms ({}) exceeds max_latency_ms ({})",
                self.uploads.min_latency_ms, self.uploads.max_latency_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.uploads.failure_rate) {
            return Err(ConfigError::Invalid(format!(
                "uploads.failure_rate must be within [0, 1], got {}",
                self.uploads.failure_rate
            )));
        }

        let mut seen = HashSet::new();
        for seed in &self.tasks {
            if seed.id.trim().is_empty() {
                return Err(ConfigError::Invalid("task id cannot be empty".to_string()));
            }
            if !seen.insert(seed.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate task id: {}",
                    seed.id
                )));
            }
        }
        Ok(())
    }
}

fn env_overrides() -> Environment {
    Environment::with_prefix("GOGREEN")
        .separator("__")
        .try_parsing(true)
}
