//! Configuration management for AssocKit
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats, by default stored in the platform configuration
//! directory.
//!
//! Configuration is organized into sections:
//! - Path geometry (pick radius, handle size, pen width)
//! - Layout engine (self-loop height, tie-break policy)
//! - Logging (default level)

use crate::error::{ConfigError, SettingsError, SettingsResult};
pub use assockit_core::options::{LayoutOptions, PathStyle, TieBreak};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Number of entries kept in the recent files list
const RECENT_FILES_COUNT: usize = 10;

/// Logging preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level directive used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Connector path geometry
    pub path: PathStyle,
    /// Region layout engine
    pub layout: LayoutOptions,
    /// Logging preferences
    pub logging: LoggingSettings,
    /// Recently relaid-out diagrams
    pub recent_files: Vec<PathBuf>,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location of the configuration file
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            SettingsError::ConfigDirectory("no platform config directory".to_string())
        })?;
        Ok(dir.join("assockit").join("config.toml"))
    }

    /// Load the config from the default location, falling back to defaults
    /// when no file exists yet.
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_file(&path)
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e))
                })?;
            }
        }

        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.path.hit_delta > 0.0) {
            return Err(out_of_range("path.hit_delta", self.path.hit_delta));
        }

        if self.path.selected_point_diameter < 0.0 {
            return Err(out_of_range(
                "path.selected_point_diameter",
                self.path.selected_point_diameter,
            ));
        }

        if !(self.path.pen_width > 0.0) {
            return Err(out_of_range("path.pen_width", self.path.pen_width));
        }

        if !(self.layout.self_loop_min_height > 0.0) {
            return Err(out_of_range(
                "layout.self_loop_min_height",
                self.layout.self_loop_min_height,
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                key: "logging.level".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Add file to recent files list
    pub fn add_recent_file(&mut self, path: PathBuf) {
        // Remove if already in list
        self.recent_files.retain(|f| f != &path);

        self.recent_files.insert(0, path);
        self.recent_files.truncate(RECENT_FILES_COUNT);
    }
}

fn out_of_range(key: &str, value: f64) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}
