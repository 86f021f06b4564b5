//! Error types for the client surface.

use reqwest::{Method, StatusCode};
use thiserror::Error;

/// Failures raised by the CRUD surface and stream setup.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client itself could not be constructed.
    #[error("could not construct the HTTP client: {0}")]
    Setup(#[source] reqwest::Error),

    /// A request failed before a response arrived.
    #[error("request failed: {method} {path}: {source}")]
    Http {
        /// HTTP method of the failing request.
        method: Method,
        /// Database path of the failing request.
        path: String,
        /// The underlying transport failure.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered outside the accepted status window.
    #[error("server responded {status}: {body}")]
    Status {
        /// The response status.
        status: StatusCode,
        /// The response body, for diagnosis.
        body: String,
    },

    /// A value failed to serialize or a response body failed to decode.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ClientError {
    /// Create a transport error carrying the request context.
    #[inline]
    pub(crate) fn http(method: Method, path: &str, source: reqwest::Error) -> Self {
        ClientError::Http {
            method,
            path: path.to_owned(),
            source,
        }
    }
}
