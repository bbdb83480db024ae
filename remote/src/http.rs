// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP client wrapper with authentication and revision handling.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::{AuthMethod, RemoteConfig};
use crate::error::RemoteError;

/// Header carrying the revision a mutation was based on.
pub const LAST_KNOWN_REVISION: &str = "X-Last-Known-Revision";

/// HTTP client for list endpoint operations.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    config: RemoteConfig,
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client creation fails.
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self { client, config })
    }

    /// Builds a request with authentication headers.
    pub fn build_request(&self, method: reqwest::Method, url: &str) -> RequestBuilder {
        let req = self.client.request(method, url);
        match &self.config.auth {
            AuthMethod::Bearer { token } => req.bearer_auth(token),
            AuthMethod::OAuth { token } => req.header("Authorization", format!("OAuth {token}")),
            AuthMethod::None => req,
        }
    }

    /// Executes a request and maps error statuses onto [`RemoteError`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or returns a non-200 status code.
    pub async fn execute(&self, req: RequestBuilder) -> Result<Response, RemoteError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status == StatusCode::OK {
            return Ok(resp);
        }

        let url = resp.url().path().to_string();
        let text = resp
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response".to_string());
        tracing::debug!(%status, url, body = text, "request rejected");

        Err(match status {
            // the backend reports "unsynchronized data" as a plain bad request
            StatusCode::BAD_REQUEST => RemoteError::RevisionMismatch(text),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Auth(text),
            StatusCode::NOT_FOUND => RemoteError::NotFound(url),
            status => RemoteError::Http(format!("{status}: {text}")),
        })
    }

    /// Executes a request and decodes a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not the expected JSON.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<T, RemoteError> {
        let resp = self.execute(req).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Adds the `X-Last-Known-Revision` header for guarded mutations.
    pub fn with_revision(req: RequestBuilder, revision: i64) -> RequestBuilder {
        req.header(LAST_KNOWN_REVISION, revision.to_string())
    }
}
