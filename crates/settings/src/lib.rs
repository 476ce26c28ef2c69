//! wgforge Settings
//!
//! Application configuration for provisioning runs.
//!
//! ## Features
//!
//! - Addressing defaults (network prefixes, listen port)
//! - Remote-side defaults (interface name, config dir, toggles)
//! - Cross-platform config file storage
//! - JSON serialization
//!
//! ## Usage
//!
//! ```no_run
//! use wgforge_settings::Settings;
//!
//! let mut settings = Settings::load_or_default()?;
//! settings.addressing.listen_port = 51999;
//! settings.save()?;
//! # Ok::<(), wgforge_settings::SettingsError>(())
//! ```

mod config;

pub use config::{AddressingSettings, RemoteSettings, Settings};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    ReadError(std::io::Error),

    #[error("Failed to write settings: {0}")]
    WriteError(std::io::Error),

    #[error("Failed to parse settings: {0}")]
    ParseError(serde_json::Error),

    #[error("Failed to create config directory: {0}")]
    CreateDirError(std::io::Error),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// Per-user configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wgforge")
}

/// Get the default settings file path
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("settings.json")
}
