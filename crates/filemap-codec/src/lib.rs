//! Value codecs for filemap.
//!
//! A [`Codec`] turns a `serde`-serializable value into the bytes stored in a
//! single entry file, and back. The store records the codec's [`Codec::name`]
//! in its metadata so that a store written with one codec is never read with
//! another.
//!
//! # Codecs
//!
//! - [`JsonCodec`] -- UTF-8 JSON via `serde_json` (compact or pretty)
//! - [`BincodeCodec`] -- compact binary via `bincode`

pub mod bincode_codec;
pub mod error;
pub mod json;
pub mod traits;

pub use bincode_codec::BincodeCodec;
pub use error::{CodecError, CodecResult};
pub use json::JsonCodec;
pub use traits::Codec;
