// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

/// Errors returned by [`TodoClient`](crate::TodoClient).
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The server answered with an unexpected status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The server rejected the credentials.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The requested item does not exist on the server.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The `X-Last-Known-Revision` sent with a mutation is stale.
    #[error("Revision mismatch: {0}")]
    RevisionMismatch(String),

    /// The response body could not be decoded.
    #[error("Invalid server response: {0}")]
    InvalidResponse(String),

    /// The client configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RemoteError {
    /// Whether the failure means the server was never reached or never answered.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_connect() {
            Self::Network(e.to_string())
        } else if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else if e.is_builder() {
            Self::Config(e.to_string())
        } else {
            Self::Http(e.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidResponse(e.to_string())
    }
}
