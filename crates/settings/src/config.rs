//! Configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{default_settings_path, Result, SettingsError};

/// Main settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Tunnel addressing
    #[serde(default)]
    pub addressing: AddressingSettings,

    /// Remote-side defaults
    #[serde(default)]
    pub remote: RemoteSettings,

    /// Custom settings file path (not serialized)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addressing: AddressingSettings::default(),
            remote: RemoteSettings::default(),
            config_path: None,
        }
    }
}

impl Settings {
    /// Load settings from the default path, or create defaults
    pub fn load_or_default() -> Result<Self> {
        Self::load_from(&default_settings_path())
    }

    /// Load settings from a specific path, or create defaults
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(SettingsError::ReadError)?;
            let mut settings: Settings =
                serde_json::from_str(&content).map_err(SettingsError::ParseError)?;
            settings.config_path = Some(path.clone());
            info!("Loaded settings from {:?}", path);
            Ok(settings)
        } else {
            let mut settings = Self::default();
            settings.config_path = Some(path.clone());
            Ok(settings)
        }
    }

    /// Save settings to the configured path
    pub fn save(&self) -> Result<()> {
        let path = self.config_path.clone().unwrap_or_else(default_settings_path);
        self.save_to(&path)
    }

    /// Save settings to a specific path
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(SettingsError::CreateDirError)?;
            }
        }

        let content = serde_json::to_string_pretty(self).map_err(SettingsError::ParseError)?;
        std::fs::write(path, content).map_err(SettingsError::WriteError)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Tunnel addressing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressingSettings {
    /// Network prefix local tunnel addresses derive under
    #[serde(default = "default_local_prefix")]
    pub local_prefix: String,

    /// Network prefix remote tunnel addresses derive under
    #[serde(default = "default_remote_prefix")]
    pub remote_prefix: String,

    /// UDP port the remote tunnel listens on
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
}

fn default_local_prefix() -> String {
    "10.202".to_string()
}

fn default_remote_prefix() -> String {
    "10.203".to_string()
}

fn default_listen_port() -> u16 {
    51232
}

impl Default for AddressingSettings {
    fn default() -> Self {
        Self {
            local_prefix: default_local_prefix(),
            remote_prefix: default_remote_prefix(),
            listen_port: default_listen_port(),
        }
    }
}

/// Remote-side defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Tunnel interface name
    #[serde(default = "default_interface")]
    pub interface: String,

    /// Directory holding tunnel configuration files
    #[serde(default = "default_remote_config_dir")]
    pub config_dir: String,

    /// Open firewall rules for the tunnel port and SSH when ufw exists
    #[serde(default = "default_true")]
    pub open_firewall: bool,

    /// Enable and bounce the tunnel service after applying
    #[serde(default = "default_true")]
    pub restart_service: bool,
}

fn default_interface() -> String {
    "wg99".to_string()
}

fn default_remote_config_dir() -> String {
    "/etc/wireguard".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            config_dir: default_remote_config_dir(),
            open_firewall: true,
            restart_service: true,
        }
    }
}

impl RemoteSettings {
    /// Full path of the remote configuration document
    pub fn config_path(&self) -> String {
        format!("{}/{}.conf", self.config_dir, self.interface)
    }
}
