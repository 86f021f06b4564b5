//! Typed CRUD responses.

use crate::error::ClientError;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Raw response from a CRUD request.
#[derive(Clone, Debug)]
pub struct DbResponse {
    status: StatusCode,
    body: String,
}

impl DbResponse {
    pub(crate) fn new(status: StatusCode, body: String) -> Self {
        Self { status, body }
    }

    /// The response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Raw JSON body text.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Decode the body as `T`. The store answers `null` for absent paths,
    /// so shapes that may be absent should be wrapped in `Option`.
    pub fn result<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Body of a successful push: the key generated for the new child.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct PushResult {
    /// Generated child name.
    pub name: String,
}
