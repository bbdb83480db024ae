// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::SyncError;

/// The name of the application.
pub const APP_NAME: &str = "tick";

/// Lower bound for the catch-up margin.
pub const MIN_CATCH_UP_MARGIN: Duration = Duration::from_millis(100);

/// Configuration for the sync engine and its local cache.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Root directory of the file cache.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Name of the list directory inside the cache.
    #[serde(default = "default_list")]
    pub list: String,

    /// Extra wait on top of the request timeout before a catch-up sync.
    #[serde(default = "default_margin_ms")]
    pub catch_up_margin_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: None,
            list: default_list(),
            catch_up_margin_ms: default_margin_ms(),
        }
    }
}

impl Config {
    /// Normalize the configuration.
    pub fn normalize(&mut self) -> Result<(), SyncError> {
        self.cache_dir = Some(match &self.cache_dir {
            Some(a) => expand_path(a)
                .map_err(|e| SyncError::Config(format!("Failed to expand cache path: {e}")))?,
            None => get_cache_dir()?.join(APP_NAME),
        });

        if self.list.trim().is_empty() {
            return Err(SyncError::Config("list name must not be empty".to_string()));
        }

        Ok(())
    }

    /// The catch-up margin, clamped to [`MIN_CATCH_UP_MARGIN`].
    #[must_use]
    pub fn catch_up_margin(&self) -> Duration {
        Duration::from_millis(self.catch_up_margin_ms).max(MIN_CATCH_UP_MARGIN)
    }
}

fn default_list() -> String {
    "default".to_string()
}

const fn default_margin_ms() -> u64 {
    100
}

/// Handle tilde (~) and environment variables in the path
fn expand_path(path: &Path) -> Result<PathBuf, SyncError> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }

    let path = path
        .to_str()
        .ok_or_else(|| SyncError::Config("Invalid path".to_string()))?;

    // Handle tilde and home directory
    let home_prefixes: &[&str] = if cfg!(unix) {
        &["~/", "$HOME/", "${HOME}/"]
    } else {
        &[r"~\", "~/", r"%UserProfile%\", r"%UserProfile%/"]
    };
    for prefix in home_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_home_dir()?.join(stripped));
        }
    }

    // Handle config directories
    let config_prefixes: &[&str] = if cfg!(unix) {
        &["$XDG_CONFIG_HOME/", "${XDG_CONFIG_HOME}/"]
    } else {
        &[r"%LOCALAPPDATA%\", "%LOCALAPPDATA%/"]
    };
    for prefix in config_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_config_dir()?.join(stripped));
        }
    }

    Ok(path.into())
}

fn get_home_dir() -> Result<PathBuf, SyncError> {
    dirs::home_dir()
        .ok_or_else(|| SyncError::Config("User-specific home directory not found".to_string()))
}

fn get_config_dir() -> Result<PathBuf, SyncError> {
    #[cfg(unix)]
    let config_dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(not(unix))]
    let config_dir = dirs::config_dir();
    config_dir
        .ok_or_else(|| SyncError::Config("User-specific config directory not found".to_string()))
}

fn get_cache_dir() -> Result<PathBuf, SyncError> {
    #[cfg(unix)]
    let cache_dir = xdg::BaseDirectories::new().get_cache_home();
    #[cfg(not(unix))]
    let cache_dir = dirs::cache_dir();
    cache_dir
        .ok_or_else(|| SyncError::Config("User-specific cache directory not found".to_string()))
}
