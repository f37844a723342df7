use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::Coordinates;

/// Top-level configuration stored on disk.
///
/// Defaults describe a downtown Pittsburgh commute in Eastern time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Commute location, decimal degrees.
    pub latitude: f64,
    pub longitude: f64,

    /// IANA timezone used for window classification, e.g. "America/New_York".
    pub timezone: String,

    /// Directory for cached archive responses; absent disables caching.
    pub cache_dir: Option<PathBuf>,

    /// Fetch attempts per request, including the first.
    pub retry_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            latitude: 40.44,
            longitude: -79.96,
            timezone: "America/New_York".to_string(),
            cache_dir: None,
            retry_attempts: 5,
        }
    }
}

impl Config {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates { latitude: self.latitude, longitude: self.longitude }
    }

    /// Parse the configured timezone name.
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone.parse::<Tz>().map_err(|_| {
            anyhow!(
                "Unknown timezone '{}' in config.\n\
                 Hint: use an IANA name such as America/New_York.",
                self.timezone
            )
        })
    }

    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
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
        let dirs = ProjectDirs::from("dev", "commute-weather", "commute-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
