use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};
use crate::traits::Codec;

/// Binary codec backed by `bincode`.
///
/// Smaller files than JSON, but not self-describing: the stored bytes only
/// decode against the exact type they were written from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BincodeCodec;

impl Codec for BincodeCodec {
    fn name(&self) -> &'static str {
        "bincode"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CodecResult<Vec<u8>> {
        bincode::serialize(value).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<T> {
        bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    #[test]
    fn truncated_input_fails() {
        let codec = BincodeCodec;
        let bytes = codec.encode(&vec![1u64, 2, 3]).unwrap();
        let err = codec.decode::<Vec<u64>>(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    proptest! {
        #[test]
        fn nested_maps_roundtrip(
            value in prop::collection::btree_map(
                ".{0,8}",
                prop::collection::vec(prop::collection::btree_map(".{0,8}", any::<i64>(), 0..4), 0..4),
                0..4,
            )
        ) {
            let codec = BincodeCodec;
            let bytes = codec.encode(&value).unwrap();
            let decoded: BTreeMap<String, Vec<BTreeMap<String, i64>>> = codec.decode(&bytes).unwrap();
            prop_assert_eq!(decoded, value);
        }
    }
}
