//! Configuration loading and parsing.
//!
//! Parses `marknote.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [save]
//! default_name = "untitled.md"
//!
//! [files]
//! base_dir = "."
//!
//! [notify]
//! timeout_ms = 2000
//! ```
//!
//! Every field is optional. A missing file yields defaults silently; a file
//! that fails to parse yields defaults and a `warn` under target `config`.
//! Unknown fields are ignored.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "marknote.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SaveConfig {
    #[serde(default = "SaveConfig::default_name")]
    pub default_name: String,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            default_name: Self::default_name(),
        }
    }
}

impl SaveConfig {
    fn default_name() -> String {
        "untitled.md".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct FilesConfig {
    /// Directory relative document handles resolve against. `None` means the
    /// working directory.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct NotifyConfig {
    #[serde(default = "NotifyConfig::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            timeout_ms: Self::default_timeout_ms(),
        }
    }
}

impl NotifyConfig {
    const fn default_timeout_ms() -> u64 {
        2000
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub save: SaveConfig,
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub source: Option<PathBuf>,
    pub file: ConfigFile,
}

impl Config {
    pub fn default_save_name(&self) -> &str {
        &self.file.save.default_name
    }

    pub fn base_dir(&self) -> PathBuf {
        self.file
            .files
            .base_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn notice_timeout(&self) -> Duration {
        Duration::from_millis(self.file.notify.timeout_ms)
    }
}

/// Best-effort config path: working directory first, then the platform
/// config dir (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("marknote").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        debug!(target: "config", file = %path.display(), "config_absent_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            debug!(target: "config", file = %path.display(), "config_loaded");
            Ok(Config {
                source: Some(path),
                file,
            })
        }
        Err(e) => {
            warn!(
                target: "config",
                file = %path.display(),
                error = %e,
                "config_parse_error_using_defaults"
            );
            Ok(Config::default())
        }
    }
}
