//! Serialization boundary.

use crate::error::ClientError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// JSON text conversion used at the client's edges.
///
/// Implementations must round-trip every JSON type the protocol can emit
/// (object, array, string, number, boolean, null) for every shape the caller
/// uses, and must be safe for concurrent use across streams. The patch
/// engine itself consumes serde's trait pair directly; this boundary covers
/// request bodies and response decoding.
pub trait Serializer: Send + Sync {
    /// Render a value as JSON text.
    fn serialize<T: Serialize>(&self, value: &T) -> Result<String, ClientError>;

    /// Decode JSON text into a value.
    fn deserialize<T: DeserializeOwned>(&self, json: &str) -> Result<T, ClientError>;
}

/// serde_json-backed default serializer.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize<T: Serialize>(&self, value: &T) -> Result<String, ClientError> {
        Ok(serde_json::to_string(value)?)
    }

    fn deserialize<T: DeserializeOwned>(&self, json: &str) -> Result<T, ClientError> {
        Ok(serde_json::from_str(json)?)
    }
}
