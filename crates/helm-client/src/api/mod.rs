//! Typed REST client for the resource backend.
//!
//! One [`ApiClient`] per backend, cheap to clone (it shares the inner
//! `reqwest` connection pool). Endpoint wrappers live in per-resource
//! modules and normalize JSON responses into the `helm-core` records.
//!
//! Mutating calls return whatever record the backend echoes, but callers
//! are expected to treat the push event, not the response, as the
//! source of truth for list membership.

pub mod approvals;
pub mod backlogs;
pub mod code_interpreter;
pub mod files;
pub mod plans;
pub mod todos;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ClientError, Result};

/// HTTP client for the resource backend REST API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given base URL (e.g. `http://localhost:8000`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a client sharing an existing `reqwest` client.
    #[must_use]
    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { http, base_url }
    }

    /// The configured base URL (no trailing slash).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path` and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let request = self.http.get(self.url(path)).query(query);
        self.execute_json(path, request).await
    }

    /// Send `body` as JSON with the given method and decode the response.
    pub(crate) async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.http.request(method, self.url(path)).json(body);
        self.execute_json(path, request).await
    }

    /// Issue a bodyless request (toggle/approve/reject) and decode the
    /// response.
    pub(crate) async fn send_empty<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
    ) -> Result<T> {
        let request = self.http.request(method, self.url(path));
        self.execute_json(path, request).await
    }

    /// DELETE `path`, ignoring any response body.
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        debug!(path, "DELETE");
        let response = self.http.delete(self.url(path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::status(status.as_u16(), &body));
        }
        Ok(())
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        debug!(path, status = status.as_u16(), "backend response");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::status(status.as_u16(), &body));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
