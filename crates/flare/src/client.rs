//! Database client facade.

use crate::config::Config;
use crate::error::ClientError;
use crate::http::RequestManager;
use crate::response::{DbResponse, PushResult};
use crate::serializer::{JsonSerializer, Serializer};
use flare_stream::{StreamHooks, StreamObserver};
use futures::TryStreamExt;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::BufReader;
use tokio_util::io::StreamReader;

/// Client for one remote document store.
///
/// CRUD methods map onto the store's REST verbs; [`listen`](Self::listen)
/// opens the change stream. Independently opened streams are fully
/// independent of each other and of the CRUD surface; the serializer is the
/// only shared piece and must stay safe for concurrent use.
pub struct Client<S: Serializer = JsonSerializer> {
    requests: RequestManager,
    serializer: S,
}

impl Client<JsonSerializer> {
    /// Connect with the default serde_json serializer.
    pub fn new(config: Config) -> Result<Self, ClientError> {
        Self::with_serializer(config, JsonSerializer)
    }
}

impl<S: Serializer> Client<S> {
    /// Connect with a custom serializer.
    pub fn with_serializer(config: Config, serializer: S) -> Result<Self, ClientError> {
        Ok(Self {
            requests: RequestManager::new(config)?,
            serializer,
        })
    }

    /// Read the value at `path`.
    pub async fn get(&self, path: &str) -> Result<DbResponse, ClientError> {
        self.requests.request(Method::GET, path, None).await
    }

    /// Read and decode the value at `path`. The store answers `null` for
    /// absent paths, so shapes that may be absent should be `Option`s.
    pub async fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.get(path).await?;
        self.serializer.deserialize(response.body())
    }

    /// Replace the value at `path`.
    pub async fn set<T: Serialize>(
        &self,
        path: &str,
        value: &T,
    ) -> Result<DbResponse, ClientError> {
        let body = self.serializer.serialize(value)?;
        self.requests.request(Method::PUT, path, Some(body)).await
    }

    /// Store `value` under a generated key at `path`.
    pub async fn push<T: Serialize>(
        &self,
        path: &str,
        value: &T,
    ) -> Result<PushResult, ClientError> {
        let body = self.serializer.serialize(value)?;
        let response = self.requests.request(Method::POST, path, Some(body)).await?;
        response.result()
    }

    /// Merge `value`'s fields into the object at `path`.
    pub async fn update<T: Serialize>(
        &self,
        path: &str,
        value: &T,
    ) -> Result<DbResponse, ClientError> {
        let body = self.serializer.serialize(value)?;
        self.requests.request(Method::PATCH, path, Some(body)).await
    }

    /// Delete the value at `path`.
    pub async fn delete(&self, path: &str) -> Result<DbResponse, ClientError> {
        self.requests.request(Method::DELETE, path, None).await
    }

    /// Open the change stream at `path` and consume it in the background.
    ///
    /// The returned observer owns the connection: dropping it cancels the
    /// stream and releases the response.
    pub async fn listen(
        &self,
        path: &str,
        hooks: StreamHooks,
    ) -> Result<StreamObserver, ClientError> {
        let response = self.requests.listen(path).await?;
        let bytes = Box::pin(response.bytes_stream().map_err(std::io::Error::other));
        let reader = BufReader::new(StreamReader::new(bytes));
        Ok(StreamObserver::spawn(reader, hooks))
    }
}
