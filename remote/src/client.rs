// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Client for the `/list` endpoint.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, Url};

use crate::config::RemoteConfig;
use crate::error::RemoteError;
use crate::http::HttpClient;
use crate::types::{
    ElementRequest, ElementResponse, ListRequest, ListResponse, Revisioned, TodoElement,
};

/// Client for the to-do list backend.
///
/// Every call returns the server revision observed after it completed. Mutations
/// take the revision the caller last saw; the server refuses them with
/// [`RemoteError::RevisionMismatch`] when it has moved on.
///
/// # Example
///
/// ```ignore
/// use tick_remote::{AuthMethod, RemoteConfig, TodoClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = RemoteConfig {
///     base_url: "https://example.com/todobackend".to_string(),
///     auth: AuthMethod::Bearer { token: "secret".to_string() },
///     ..Default::default()
/// };
///
/// let client = TodoClient::new(config)?;
/// let listing = client.list().await?;
/// println!("{} items at revision {}", listing.value.len(), listing.revision);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TodoClient {
    http: Arc<HttpClient>,
    config: RemoteConfig,
    list_url: Url,
}

impl TodoClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is empty or not an HTTP(S) URL, or if
    /// HTTP client initialization fails.
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        if config.base_url.trim().is_empty() {
            return Err(RemoteError::Config("base_url must not be empty".to_string()));
        }

        let list_url = format!("{}/list", config.base_url.trim_end_matches('/'));
        let list_url = Url::parse(&list_url)
            .map_err(|e| RemoteError::Config(format!("invalid base_url: {e}")))?;
        if list_url.cannot_be_a_base() {
            return Err(RemoteError::Config(format!(
                "base_url cannot carry a path: {}",
                config.base_url
            )));
        }

        let http = HttpClient::new(config.clone())?;
        Ok(Self {
            http: Arc::new(http),
            config,
            list_url,
        })
    }

    /// The device identifier stamped on outgoing items.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.config.device_id
    }

    /// The per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.config.timeout()
    }

    /// Fetches the whole list.
    ///
    /// Elements that fail to decode are dropped with a warning.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Revisioned<Vec<TodoElement>>, RemoteError> {
        let url = self.list_url();
        let resp: ListResponse = self
            .http
            .execute_json(self.http.build_request(Method::GET, &url))
            .await?;
        Self::into_listing(resp)
    }

    /// Replaces the whole list on the server with `elements`.
    #[tracing::instrument(skip(self, elements), fields(count = elements.len()))]
    pub async fn replace_list(
        &self,
        elements: &[TodoElement],
        revision: i64,
    ) -> Result<Revisioned<Vec<TodoElement>>, RemoteError> {
        let url = self.list_url();
        let req = self
            .http
            .build_request(Method::PATCH, &url)
            .json(&ListRequest { list: elements });
        let resp: ListResponse = self
            .http
            .execute_json(HttpClient::with_revision(req, revision))
            .await?;
        Self::into_listing(resp)
    }

    /// Fetches one element.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Revisioned<TodoElement>, RemoteError> {
        let url = self.element_url(id);
        let resp: ElementResponse = self
            .http
            .execute_json(self.http.build_request(Method::GET, &url))
            .await?;
        Self::into_element(resp)
    }

    /// Adds a new element.
    #[tracing::instrument(skip(self, element), fields(id = %element.id))]
    pub async fn create(
        &self,
        element: &TodoElement,
        revision: i64,
    ) -> Result<Revisioned<TodoElement>, RemoteError> {
        let url = self.list_url();
        let req = self
            .http
            .build_request(Method::POST, &url)
            .json(&ElementRequest { element });
        let resp: ElementResponse = self
            .http
            .execute_json(HttpClient::with_revision(req, revision))
            .await?;
        Self::into_element(resp)
    }

    /// Replaces the element stored under `id`.
    #[tracing::instrument(skip(self, element))]
    pub async fn update(
        &self,
        id: &str,
        element: &TodoElement,
        revision: i64,
    ) -> Result<Revisioned<TodoElement>, RemoteError> {
        let url = self.element_url(id);
        let req = self
            .http
            .build_request(Method::PUT, &url)
            .json(&ElementRequest { element });
        let resp: ElementResponse = self
            .http
            .execute_json(HttpClient::with_revision(req, revision))
            .await?;
        Self::into_element(resp)
    }

    /// Deletes the element stored under `id`, returning the removed element.
    #[tracing::instrument(skip(self))]
    pub async fn delete(
        &self,
        id: &str,
        revision: i64,
    ) -> Result<Revisioned<TodoElement>, RemoteError> {
        let url = self.element_url(id);
        let req = self.http.build_request(Method::DELETE, &url);
        let resp: ElementResponse = self
            .http
            .execute_json(HttpClient::with_revision(req, revision))
            .await?;
        Self::into_element(resp)
    }

    fn list_url(&self) -> String {
        self.list_url.to_string()
    }

    /// `{base_url}/list/{id}` with `id` percent-encoded as one path segment.
    fn element_url(&self, id: &str) -> String {
        let mut url = self.list_url.clone();
        // `new` rejects cannot-be-a-base URLs
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(id);
        }
        url.into()
    }

    fn into_listing(resp: ListResponse) -> Result<Revisioned<Vec<TodoElement>>, RemoteError> {
        let revision = resp
            .revision
            .ok_or_else(|| RemoteError::InvalidResponse("missing revision".to_string()))?;

        let total = resp.list.len();
        let elements: Vec<TodoElement> = resp
            .list
            .into_iter()
            .filter_map(|raw| match serde_json::from_value(raw) {
                Ok(element) => Some(element),
                Err(err) => {
                    tracing::warn!(%err, "dropping malformed list element");
                    None
                }
            })
            .collect();

        tracing::debug!(total, kept = elements.len(), revision, "list decoded");
        Ok(Revisioned::new(elements, revision))
    }

    fn into_element(resp: ElementResponse) -> Result<Revisioned<TodoElement>, RemoteError> {
        let revision = resp
            .revision
            .ok_or_else(|| RemoteError::InvalidResponse("missing revision".to_string()))?;
        Ok(Revisioned::new(resp.element, revision))
    }
}
