// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// How requests authenticate against the backend.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(tag = "type")]
pub enum AuthMethod {
    /// No `Authorization` header.
    #[serde(rename = "none")]
    #[default]
    None,
    /// `Authorization: Bearer <token>`.
    #[serde(rename = "bearer")]
    Bearer {
        /// Bearer token.
        token: String,
    },
    /// `Authorization: OAuth <token>`, accepted by the backend for Yandex ID tokens.
    #[serde(rename = "oauth")]
    OAuth {
        /// OAuth token.
        token: String,
    },
}

/// Backend connection settings.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the backend, the list lives at `{base_url}/list`.
    pub base_url: String,
    /// Authentication method.
    #[serde(default)]
    pub auth: AuthMethod,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Identifier sent as `last_updated_by` with every item.
    #[serde(default = "default_device_id")]
    pub device_id: String,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl RemoteConfig {
    /// Creates a configuration for `base_url` with every other field defaulted.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// The per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

const fn default_timeout() -> u64 {
    2
}

fn default_device_id() -> String {
    "tick".to_string()
}

fn default_user_agent() -> String {
    concat!("tick-remote/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth: AuthMethod::default(),
            timeout_secs: default_timeout(),
            device_id: default_device_id(),
            user_agent: default_user_agent(),
        }
    }
}
