//! TOML-based configuration for decision-lens.
//!
//! Example configuration:
//! ```toml
//! [analysis]
//! reference_date = "2024-06-30"
//! link_threshold = 0.3
//! max_supporting = 10
//! theme_overlap = 0.8
//! group_themes = true
//!
//! [logging]
//! filter = "info"
//! format = "pretty"
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::decision::{DEFAULT_MAX_SUPPORTING, DEFAULT_THEME_OVERLAP};
use crate::engine::EngineConfig;
use crate::inference::thresholds;

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV_VAR: &str = "DECISION_LENS_CONFIG";
const LOCAL_CONFIG: &str = "decision-lens.toml";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub analysis: AnalysisSettings,
    pub logging: LoggingSettings,
}

/// Pipeline tuning.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Anchor for temporal coverage (`YYYY-MM-DD`). Defaults to today.
    pub reference_date: Option<NaiveDate>,

    /// Entity similarity threshold (0.0 to 1.0).
    pub link_threshold: f64,

    /// Supporting gaps and constraints kept per decision.
    pub max_supporting: usize,

    /// Overlap above which two themes are duplicates (0.0 to 1.0).
    pub theme_overlap: f64,

    pub group_themes: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            reference_date: None,
            link_threshold: thresholds::entity::LINK_THRESHOLD,
            max_supporting: DEFAULT_MAX_SUPPORTING,
            theme_overlap: DEFAULT_THEME_OVERLAP,
            group_themes: true,
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing-subscriber` filter directive; `RUST_LOG` takes precedence.
    pub filter: String,

    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `DECISION_LENS_CONFIG`
    /// 2. `./decision-lens.toml`
    /// 3. `~/.config/decision-lens/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG);
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("decision-lens").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Reject values outside their meaningful range.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let analysis = &self.analysis;
        if !(0.0..=1.0).contains(&analysis.link_threshold) {
            return Err(SettingsError::InvalidConfig(format!(
                "analysis.link_threshold must be between 0 and 1, got {}",
                analysis.link_threshold
            )));
        }
        if !(0.0..=1.0).contains(&analysis.theme_overlap) {
            return Err(SettingsError::InvalidConfig(format!(
                "analysis.theme_overlap must be between 0 and 1, got {}",
                analysis.theme_overlap
            )));
        }
        if analysis.max_supporting == 0 {
            return Err(SettingsError::InvalidConfig(
                "analysis.max_supporting must be at least 1".to_string(),
            ));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "logging.filter must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Engine options described by the `[analysis]` table.
    pub fn engine_config(&self) -> EngineConfig {
        let analysis = &self.analysis;
        let config = EngineConfig::default()
            .with_link_threshold(analysis.link_threshold)
            .with_max_supporting(analysis.max_supporting)
            .with_theme_overlap(analysis.theme_overlap)
            .with_theme_grouping(analysis.group_themes);
        match analysis.reference_date {
            Some(date) => config.with_reference_date(date),
            None => config,
        }
    }
}
