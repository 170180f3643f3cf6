//! Application configuration persistence
//!
//! Stores defaults in ~/.config/vidgrid/config.json. Every field is optional
//! on disk; missing ones fall back to the built-in defaults, and command-line
//! flags override whatever was loaded.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::catalog::{SortKey, DEFAULT_RELATED_LIMIT};
use crate::view::{PageMode, Routes, ViewSettings};

/// Catalog endpoint used when nothing else is configured
pub const DEFAULT_API_URL: &str = "https://yoruhentai-api.vercel.app/api";

/// Site root the page addresses are built under
pub const DEFAULT_SITE_URL: &str = "http://localhost/";

const CONFIG_VERSION: u32 = 1;

/// Persistent application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Config format version
    pub version: u32,
    /// Catalog API endpoint
    pub api_url: String,
    /// Root under which index.html and video-player.html live
    pub site_url: String,
    /// Number of related videos next to the player
    pub related_limit: usize,
    /// Grid ordering on startup
    pub default_sort: SortKey,
    /// Page the browser opens on
    pub page: PageMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api_url: DEFAULT_API_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            related_limit: DEFAULT_RELATED_LIMIT,
            default_sort: SortKey::default(),
            page: PageMode::default(),
        }
    }
}

impl AppConfig {
    /// Load the config from its default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load the config from `path`, using defaults when the file is absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config {:?}", path))?;

        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Save the config to its default location
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        debug!("Saved config to {:?}", path);
        Ok(())
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("vidgrid").join("config.json"))
    }

    pub fn routes(&self) -> Result<Routes> {
        Routes::new(&self.site_url)
    }

    pub fn view_settings(&self) -> ViewSettings {
        ViewSettings {
            sort: self.default_sort,
            related_limit: self.related_limit,
            seed: None,
        }
    }
}
