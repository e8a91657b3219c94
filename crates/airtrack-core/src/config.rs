use crate::geo::RadiusBounds;
use crate::search::SearchSettings;
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scheme and host of the airport API, without the `/api` prefix.
    pub api_base_url: String,
    pub debounce_ms: u64,
    pub min_query_len: usize,
    pub request_timeout_secs: u64,
    pub radius: RadiusBounds,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            debounce_ms: 300,
            min_query_len: 2,
            request_timeout_secs: 30,
            radius: RadiusBounds::default(),
        }
    }
}

/// Platform config directory, e.g. `~/.config/airtrack` on Linux.
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("", "", "airtrack")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".airtrack"))
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        get_config_root().join(CONFIG_FILE)
    }

    /// Loads the user config, falling back to defaults when none exists.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file; using defaults; path={}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Config saved; path={}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let r = &self.radius;
        if !(r.min_km > 0.0 && r.min_km <= r.max_km) {
            anyhow::bail!(
                "radius bounds must satisfy 0 < min_km <= max_km (got {}..{})",
                r.min_km,
                r.max_km
            );
        }
        if !r.contains(r.default_km) {
            anyhow::bail!(
                "default radius {} km is outside {}..{} km",
                r.default_km,
                r.min_km,
                r.max_km
            );
        }
        if self.min_query_len == 0 {
            anyhow::bail!("min_query_len must be at least 1");
        }
        Ok(())
    }

    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            min_query_len: self.min_query_len,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
