//! Record codec trait definition.

use crate::error::Result;

/// Value <-> byte-sequence converter pair.
///
/// The store never inspects a record's structure directly; all bytes written
/// to or read from a backend pass through the codec configured at
/// construction time.
///
/// # Round-trip law
///
/// For every value `v` the codec accepts, `decode(encode(v))` must be
/// observationally equal to `v`.
///
/// # Thread Safety
///
/// Codecs must be `Send + Sync`: the durable backend evaluates them inside
/// the engine's row scan, potentially from any calling thread.
pub trait RecordCodec<V>: Send + Sync {
    /// Encode a value into its storable byte form.
    ///
    /// Fails with [`Error::Encoding`](crate::Error::Encoding) when the value
    /// cannot be represented.
    fn encode(&self, value: &V) -> Result<Vec<u8>>;

    /// Decode stored bytes back into a value.
    ///
    /// Fails with [`Error::Decoding`](crate::Error::Decoding) when the bytes
    /// are corrupt or were written by a mismatched codec.
    fn decode(&self, bytes: &[u8]) -> Result<V>;
}
