use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};
use crate::traits::Codec;

/// JSON codec backed by `serde_json`.
///
/// Compact output by default; [`JsonCodec::pretty`] writes indented files
/// that are easier to inspect by hand. Both variants read each other's
/// output, so they share the name `"json"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// A codec that writes indented JSON.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> CodecResult<Vec<u8>> {
        let result = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        result.map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> CodecResult<T> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::{BTreeMap, HashMap};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        s1: String,
        s2: Option<String>,
        n: i64,
    }

    #[test]
    fn float_is_plain_json_number() {
        let codec = JsonCodec::new();
        let bytes = codec.encode(&std::f64::consts::PI).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        let parsed: f64 = text.parse().unwrap();
        assert!((parsed - std::f64::consts::PI).abs() < 0.01);
    }

    #[test]
    fn nested_structure_roundtrip() {
        let codec = JsonCodec::new();
        let record = Record { s1: "foo".into(), s2: None, n: -3 };
        let mut inner: HashMap<String, Vec<Record>> = HashMap::new();
        inner.insert("baz".into(), vec![record.clone(), record]);
        let mut outer: BTreeMap<String, Vec<HashMap<String, Vec<Record>>>> = BTreeMap::new();
        outer.insert("qux".into(), vec![inner]);

        let bytes = codec.encode(&outer).unwrap();
        let decoded: BTreeMap<String, Vec<HashMap<String, Vec<Record>>>> =
            codec.decode(&bytes).unwrap();
        assert_eq!(decoded, outer);
    }

    #[test]
    fn pretty_output_is_readable_by_compact() {
        let pretty = JsonCodec::pretty();
        let compact = JsonCodec::new();
        let record = Record { s1: "bar".into(), s2: Some("x".into()), n: 7 };

        let bytes = pretty.encode(&record).unwrap();
        assert!(pretty.is_pretty());
        assert!(!compact.is_pretty());
        assert!(bytes.contains(&b'\n'));
        let decoded: Record = compact.decode(&bytes).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(pretty.name(), compact.name());
    }

    #[test]
    fn decode_wrong_shape_fails() {
        let codec = JsonCodec::new();
        let err = codec.decode::<Record>(b"[1, 2, 3]").unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn decode_garbage_fails() {
        let codec = JsonCodec::new();
        assert!(codec.decode::<f64>(b"not json").is_err());
    }
}
