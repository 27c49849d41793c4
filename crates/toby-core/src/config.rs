//! Configuration for toby-core
//!
//! Storage keys, favicon derivation, drag auto-scroll, reorder animation and
//! search timing. Every section has defaults matching the browser extension.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TobyConfig {
    /// Persistence keys and location
    pub storage: StorageConfig,
    /// Derived favicon settings
    pub favicon: FaviconConfig,
    /// Drag auto-scroll settings
    pub drag: DragConfig,
    /// Animated reorder settings
    pub reorder: ReorderConfig,
    /// Search overlay timing
    pub search: SearchConfig,
}

/// Persistence keys and location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Key holding the ordered collection list
    pub collections_key: String,
    /// Key holding the collapsed-state map
    pub collapsed_key: String,
    /// Directory for the JSON file gateway. `None` uses the platform data dir.
    pub data_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            collections_key: "collections".to_string(),
            collapsed_key: "collapsedCollections".to_string(),
            data_dir: None,
        }
    }
}

/// Derived favicon settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaviconConfig {
    /// Favicon service queried with `?domain=<host>&sz=<size>`
    pub service_url: String,
    /// Requested icon size in pixels
    pub size: u32,
    /// Placeholder used when a URL has no parseable host
    pub default_icon: String,
}

impl Default for FaviconConfig {
    fn default() -> Self {
        Self {
            service_url: "https://www.google.com/s2/favicons".to_string(),
            size: 32,
            default_icon: "icons/default-favicon.png".to_string(),
        }
    }
}

/// Drag auto-scroll settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Distance from the viewport edge (px) at which auto-scroll starts
    pub edge_threshold_px: f64,
    /// Scroll speed at the threshold boundary (px per frame)
    pub min_scroll_speed: f64,
    /// Scroll speed at the very edge (px per frame)
    pub max_scroll_speed: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            edge_threshold_px: 300.0,
            min_scroll_speed: 2.0,
            max_scroll_speed: 20.0,
        }
    }
}

/// Animated reorder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReorderConfig {
    /// Pause before committing a keyboard reorder, in milliseconds
    pub animation_ms: u64,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self { animation_ms: 200 }
    }
}

/// Search overlay timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Input debounce before a query runs, in milliseconds
    pub debounce_ms: u64,
    /// Maximum gap between the two trigger presses, in milliseconds
    pub double_tap_window_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            double_tap_window_ms: 500,
        }
    }
}

impl TobyConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Default config file location: `<config_dir>/toby/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("toby").join("config.toml"))
    }

    /// Load from a file, falling back to defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default location, or defaults if there is none
    pub fn load_standard() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Directory used by the JSON file gateway
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.storage
            .data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("toby")))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.collections_key.is_empty() || self.storage.collapsed_key.is_empty() {
            return Err(ConfigError::InvalidValue(
                "storage keys must not be empty".to_string(),
            ));
        }

        if self.storage.collections_key == self.storage.collapsed_key {
            return Err(ConfigError::InvalidValue(
                "collections_key and collapsed_key must differ".to_string(),
            ));
        }

        if self.drag.edge_threshold_px <= 0.0 {
            return Err(ConfigError::InvalidValue(
                "edge_threshold_px must be positive".to_string(),
            ));
        }

        if self.drag.min_scroll_speed < 0.0
            || self.drag.max_scroll_speed < self.drag.min_scroll_speed
        {
            return Err(ConfigError::InvalidValue(
                "scroll speeds must satisfy 0 <= min_scroll_speed <= max_scroll_speed".to_string(),
            ));
        }

        if self.favicon.size == 0 {
            return Err(ConfigError::InvalidValue(
                "favicon size must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration loading or validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Value is out of valid range
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    /// File could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
    /// File could not be read
    #[error("IO error: {0}")]
    Io(String),
}
