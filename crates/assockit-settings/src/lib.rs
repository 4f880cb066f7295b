//! AssocKit Settings Crate
//!
//! Handles configuration of connector path geometry, the region layout engine
//! and logging, and persists it as TOML or JSON.

pub mod config;
pub mod error;

pub use config::{Config, LoggingSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
