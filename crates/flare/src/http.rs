//! HTTP plumbing for the REST surface and the change stream.

use crate::config::Config;
use crate::error::ClientError;
use crate::response::DbResponse;
use reqwest::{header, Method, StatusCode};

/// Owns the HTTP client and the store's URL conventions.
pub(crate) struct RequestManager {
    client: reqwest::Client,
    config: Config,
}

impl RequestManager {
    pub(crate) fn new(config: Config) -> Result<Self, ClientError> {
        // The configured timeout is applied per CRUD request rather than on
        // the client: a client-wide limit would also cut change streams off.
        let client = reqwest::Client::builder()
            .build()
            .map_err(ClientError::Setup)?;
        Ok(Self { client, config })
    }

    /// Compose the REST URL for a database path: `{base}/{path}.json`, plus
    /// the auth query parameter when a token is configured.
    pub(crate) fn url(&self, path: &str) -> String {
        let base = self.config.base_url().trim_end_matches('/');
        let path = path.trim_matches('/');
        match self.config.auth_token() {
            Some(token) => format!("{base}/{path}.json?auth={token}"),
            None => format!("{base}/{path}.json"),
        }
    }

    /// Issue one CRUD request and validate the response status.
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<DbResponse, ClientError> {
        let url = self.url(path);
        tracing::debug!(%method, path, "database request");

        let mut request = self.client.request(method.clone(), &url);
        if let Some(timeout) = self.config.timeout() {
            request = request.timeout(timeout);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::http(method.clone(), path, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::http(method, path, e))?;

        if status < StatusCode::OK || status >= StatusCode::BAD_REQUEST {
            return Err(ClientError::Status { status, body });
        }
        Ok(DbResponse::new(status, body))
    }

    /// Open the change stream at `path`.
    pub(crate) async fn listen(&self, path: &str) -> Result<reqwest::Response, ClientError> {
        let url = self.url(path);
        tracing::debug!(path, "opening change stream");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| ClientError::http(Method::GET, path, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }
        Ok(response)
    }
}
