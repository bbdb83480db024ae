// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, path::PathBuf, str::FromStr};

use tick_core::{APP_NAME, Config as CoreConfig, RemoteConfig};
use tokio::fs;

const TICK_CONFIG_ENV: &str = "TICK_CONFIG";

/// Configuration for the tick command line.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Engine and cache settings.
    #[serde(default)]
    pub core: CoreConfig,

    /// The list backend, absent to work offline.
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

impl FromStr for Config {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

/// Reads the configuration from `path`, the `TICK_CONFIG` environment
/// variable, or the user config directory, in that order.
#[tracing::instrument]
pub async fn parse_config(path: Option<PathBuf>) -> Result<Config, Box<dyn Error>> {
    let path = if let Some(path) = path {
        path
    } else if let Ok(env_path) = std::env::var(TICK_CONFIG_ENV) {
        PathBuf::from(env_path)
    } else {
        let config = get_config_dir()?.join(APP_NAME).join("config.toml");
        if !config.exists() {
            tracing::info!(path = %config.display(), "no config file, using defaults");
            return Ok(Config {
                core: CoreConfig::default(),
                remote: None,
            });
        }
        config
    };

    fs::read_to_string(&path)
        .await
        .map_err(|e| format!("Failed to read config file at {}: {}", path.display(), e))?
        .parse()
}

fn get_config_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let config_dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(not(unix))]
    let config_dir = dirs::config_dir();
    config_dir.ok_or_else(|| "User-specific home directory not found".into())
}
