//! Application configuration.
//!
//! Settings are read once at startup from a JSON file
//! (`$XDG_CONFIG_HOME/hyprlayouts/config.json` unless `--config <path>` is
//! given) and handed to the components that need them.  Capture and
//! restore never write this file.
//!
//! # Example
//!
//! ```json
//! {
//!   "auto_restore": "on_display_change",
//!   "profiles_path": "/home/me/.local/share/hyprlayouts/profiles.json",
//!   "title_suffixes": [" - google chrome", " - mozilla firefox"]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Title decorations stripped before fuzzy title comparison.
pub const DEFAULT_TITLE_SUFFIXES: &[&str] = &[
    " - google chrome",
    " - chromium",
    " - mozilla firefox",
    " — mozilla firefox",
    " - microsoft edge",
    " - brave",
    " - visual studio code",
    " - code - oss",
    " - vim",
    " - nvim",
    " - libreoffice writer",
    " - libreoffice calc",
];

/// Top-level configuration.
///
/// Every field is optional — a minimal `{}` file is valid and all fields
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether to restore automatically when the display set changes.
    pub auto_restore: AutoRestore,

    /// Where the profile document lives.  `None` selects
    /// `$XDG_DATA_HOME/hyprlayouts/profiles.json`.
    pub profiles_path: Option<PathBuf>,

    /// Lowercase title suffixes removed by title normalization.
    pub title_suffixes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_restore: AutoRestore::default(),
            profiles_path: None,
            title_suffixes: DEFAULT_TITLE_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Auto-restore behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoRestore {
    /// Only restore on request.
    #[default]
    Off,
    /// Restore the active profile of the new configuration whenever a
    /// monitor is added or removed.
    OnDisplayChange,
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// The profile document path, explicit or default.
    pub fn profiles_path(&self) -> PathBuf {
        self.profiles_path
            .clone()
            .unwrap_or_else(|| data_dir().join("profiles.json"))
    }
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/hyprlayouts`).
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("hyprlayouts")
}

/// Resolve the data directory (`$XDG_DATA_HOME/hyprlayouts`).
pub fn data_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.local/share", home)
    });
    PathBuf::from(base).join("hyprlayouts")
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
