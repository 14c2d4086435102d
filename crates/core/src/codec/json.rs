//! JSON-backed codec.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::traits::RecordCodec;
use crate::error::{Error, Result};

/// Human-readable codec using serde_json.
///
/// Useful when the backing database file should stay inspectable with
/// ordinary SQLite tooling, at the cost of larger rows than
/// [`BincodeCodec`](super::BincodeCodec).
pub struct JsonCodec<V> {
    _marker: PhantomData<fn() -> V>,
}

impl<V> JsonCodec<V> {
    /// Create a new JSON codec.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<V> Default for JsonCodec<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for JsonCodec<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JsonCodec")
    }
}

impl<V> RecordCodec<V> for JsonCodec<V>
where
    V: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &V) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| Error::encoding(e))
    }

    fn decode(&self, bytes: &[u8]) -> Result<V> {
        serde_json::from_slice(bytes).map_err(|e| Error::decoding(e))
    }
}
