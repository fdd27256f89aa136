//! Configuration for decision-lens.
//!
//! Handles the TOML settings file and its conversion to engine options.

mod settings;

pub use settings::{
    AnalysisSettings, LogFormat, LoggingSettings, Settings, SettingsError, CONFIG_ENV_VAR,
};
