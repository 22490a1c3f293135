//! Configuration management for GuardAI.
//!
//! Loads settings from `$GUARDAI_CONFIG` or the user config directory
//! (`~/.config/guardai/config.toml` on Linux), falling back to defaults.
//! Every field carries a serde default so partial files are accepted.

use crate::error::GuardError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "GUARDAI_CONFIG";

/// Frame loop settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackConfig {
    /// Upper bound on evaluated frames per second
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,

    /// Floor the adaptive rate never drops below
    #[serde(default = "default_min_fps")]
    pub min_fps: u32,

    /// Lower the rate when iterations run slow, recover when they don't
    #[serde(default = "default_true")]
    pub adaptive: bool,

    /// Cadence of the per-frame callback in milliseconds
    #[serde(default = "default_frame_tick_ms")]
    pub frame_tick_ms: u64,

    /// How often the adaptive rate may recover
    #[serde(default = "default_perf_window_ms")]
    pub perf_window_ms: u64,

    /// Rate change per adaptation step
    #[serde(default = "default_fps_step")]
    pub fps_step: u32,
}

fn default_target_fps() -> u32 {
    30
}

fn default_min_fps() -> u32 {
    15
}

fn default_true() -> bool {
    true
}

fn default_frame_tick_ms() -> u64 {
    16 // ~60Hz display refresh
}

fn default_perf_window_ms() -> u64 {
    1_000
}

fn default_fps_step() -> u32 {
    5
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            target_fps: default_target_fps(),
            min_fps: default_min_fps(),
            adaptive: default_true(),
            frame_tick_ms: default_frame_tick_ms(),
            perf_window_ms: default_perf_window_ms(),
            fps_step: default_fps_step(),
        }
    }
}

/// Pose rule thresholds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RulesConfig {
    #[serde(default = "default_offset")]
    pub chin_offset: f32,

    #[serde(default = "default_offset")]
    pub stance_offset: f32,

    /// Detection sensitivity: landmarks below this confidence are ignored
    #[serde(default)]
    pub min_visibility: f32,
}

fn default_offset() -> f32 {
    0.1
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            chin_offset: default_offset(),
            stance_offset: default_offset(),
            min_visibility: 0.0,
        }
    }
}

/// Stress simulation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StressConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Shortest delay between stress events (inclusive)
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Longest delay between stress events (exclusive)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// When a command's reaction window closes
    #[serde(default = "default_reaction_timeout_ms")]
    pub reaction_timeout_ms: u64,
}

fn default_min_delay_ms() -> u64 {
    3_000
}

fn default_max_delay_ms() -> u64 {
    15_000
}

fn default_reaction_timeout_ms() -> u64 {
    1_500
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            reaction_timeout_ms: default_reaction_timeout_ms(),
        }
    }
}

/// Progress history settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_store_key")]
    pub store_key: String,

    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("guardai")
}

fn default_store_key() -> String {
    crate::STORE_KEY.to_string()
}

fn default_max_sessions() -> usize {
    crate::MAX_SESSIONS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            store_key: default_store_key(),
            max_sessions: default_max_sessions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GuardConfig {
    #[serde(default)]
    pub feedback: FeedbackConfig,

    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub stress: StressConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GuardConfig {
    /// Load from the first config file found, or defaults
    pub fn load() -> Self {
        let candidates = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .into_iter()
            .chain(Self::user_config_path());

        for path in candidates {
            match Self::load_from_path(&path) {
                Ok(config) => return config,
                Err(e) => warn!("Skipping config {}: {}", path.display(), e),
            }
        }

        warn!("Config not found, using defaults");
        GuardConfig::default()
    }

    /// `<config dir>/guardai/config.toml`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("guardai").join("config.toml"))
    }

    /// Load and validate config from a specific path
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, GuardError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: GuardConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GuardError> {
        let path = path.as_ref();
        let content =
            toml::to_string_pretty(self).map_err(|e| GuardError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), GuardError> {
        let stress = &self.stress;
        if stress.min_delay_ms >= stress.max_delay_ms {
            return Err(GuardError::Config(format!(
                "stress.min_delay_ms ({}) must be below stress.max_delay_ms ({})",
                stress.min_delay_ms, stress.max_delay_ms
            )));
        }

        let feedback = &self.feedback;
        if feedback.min_fps == 0 || feedback.min_fps > feedback.target_fps {
            return Err(GuardError::Config(format!(
                "feedback.min_fps ({}) must be between 1 and target_fps ({})",
                feedback.min_fps, feedback.target_fps
            )));
        }

        if self.storage.max_sessions == 0 {
            return Err(GuardError::Config(
                "storage.max_sessions must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
