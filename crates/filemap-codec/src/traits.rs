use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecResult;

/// Converts values to the byte form kept in an entry file.
///
/// Implementations must round-trip: decoding the output of `encode` yields a
/// value structurally equal to the input, for arbitrarily nested containers
/// and records.
pub trait Codec: Send + Sync {
    /// Stable identifier persisted in store metadata.
    fn name(&self) -> &'static str;

    /// Serialize a value to bytes.
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CodecResult<Vec<u8>>;

    /// Deserialize a value from bytes.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<T>;
}
