//! Bincode-backed codec (default).

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::traits::RecordCodec;
use crate::error::{Error, Result};

/// Compact binary codec using serde + bincode.
///
/// This is the default codec for both backends: any `Serialize +
/// DeserializeOwned` value type works without further ceremony.
pub struct BincodeCodec<V> {
    _marker: PhantomData<fn() -> V>,
}

impl<V> BincodeCodec<V> {
    /// Create a new bincode codec.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<V> Default for BincodeCodec<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for BincodeCodec<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BincodeCodec")
    }
}

impl<V> RecordCodec<V> for BincodeCodec<V>
where
    V: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &V) -> Result<Vec<u8>> {
        bincode::serialize(value).map_err(|e| Error::encoding(e))
    }

    fn decode(&self, bytes: &[u8]) -> Result<V> {
        bincode::deserialize(bytes).map_err(|e| Error::decoding(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Message {
        key: String,
        seq: u64,
    }

    #[test]
    fn test_bincode_roundtrip_struct() {
        let codec = BincodeCodec::new();
        let msg = Message {
            key: "sensor/1".to_string(),
            seq: 42,
        };

        let encoded = codec.encode(&msg).unwrap();
        let decoded = codec.decode(&encoded).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_bincode_decode_garbage_is_decoding_error() {
        let codec: BincodeCodec<Message> = BincodeCodec::new();
        let result = codec.decode(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert!(matches!(result, Err(Error::Decoding(_))));
    }

    #[test]
    fn test_bincode_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BincodeCodec<Message>>();
    }

    proptest! {
        #[test]
        fn prop_bincode_roundtrip_string(s in ".*") {
            let codec = BincodeCodec::<String>::new();
            let encoded = codec.encode(&s).unwrap();
            prop_assert_eq!(codec.decode(&encoded).unwrap(), s);
        }

        #[test]
        fn prop_bincode_roundtrip_pairs(v in proptest::collection::vec((any::<i64>(), ".*"), 0..16)) {
            let codec = BincodeCodec::<Vec<(i64, String)>>::new();
            let encoded = codec.encode(&v).unwrap();
            prop_assert_eq!(codec.decode(&encoded).unwrap(), v);
        }
    }
}
