use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::model::{LocationId, NewLocation};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Backend base URL, e.g. "http://127.0.0.1:8000".
    pub api_base: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,

    /// Create `seed_location` when the backend has no locations at all.
    #[serde(default)]
    pub seed_on_empty: bool,

    /// Example TOML:
    /// [seed_location]
    /// name = "Central Monitoring Station"
    /// city = "New Delhi"
    /// country = "India"
    pub seed_location: Option<NewLocation>,

    /// Location shown by `airwatch show` when none is given.
    pub last_location: Option<i64>,
}

impl Config {
    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// The location to create on an empty backend, if seeding is on.
    pub fn seed(&self) -> Option<NewLocation> {
        if !self.seed_on_empty {
            return None;
        }

        Some(self.seed_location.clone().unwrap_or_else(default_seed_location))
    }

    pub fn last_location(&self) -> Option<LocationId> {
        self.last_location.map(LocationId)
    }

    pub fn remember_location(&mut self, id: LocationId) {
        self.last_location = Some(id.0);
    }

    /// Apply a command-line or environment override of the base URL.
    pub fn with_api_base_override(mut self, api_base: Option<String>) -> Self {
        if let Some(base) = api_base.filter(|b| !b.trim().is_empty()) {
            self.api_base = Some(base);
        }
        self
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "airwatch", "airwatch-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

pub fn default_seed_location() -> NewLocation {
    NewLocation {
        name: "Central Monitoring Station".to_string(),
        city: "New Delhi".to_string(),
        country: "India".to_string(),
        latitude: Some(28.6139),
        longitude: Some(77.2090),
    }
}
