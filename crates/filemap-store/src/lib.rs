//! Persistent one-file-per-key map.
//!
//! A store is a directory holding a metadata record and a `data/`
//! subdirectory with one file per entry, named by its key and holding the
//! encoded value. The metadata pins the store to a single value type for its
//! lifetime.
//!
//! # Key Types
//!
//! - [`PersistentMap`] -- the map itself, generic over value type and codec
//! - [`StoreConfig`] -- write/sync strategy, creation and read-only flags
//! - [`StoreMetadata`] -- the persisted `{ "type": ... }` record
//! - [`StoreLayout`] -- paths of the root, metadata file and data directory
//!
//! # Design Rules
//!
//! 1. The type tag is written once at creation and compared on every open.
//! 2. Opening an existing store never rewrites it.
//! 3. Keys are used verbatim as file names; keys that are not a single plain
//!    file name are rejected.
//! 4. No caching, locking, or cross-key atomicity. Enumeration is not a
//!    snapshot.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod config;
pub mod error;
pub mod layout;
pub mod map;
pub mod metadata;

pub use config::{StoreConfig, SyncMode, WriteMode};
pub use error::{StoreError, StoreResult};
pub use layout::{validate_key, StoreLayout, DATA_DIR, METADATA_FILE};
pub use map::PersistentMap;
pub use metadata::StoreMetadata;

pub use filemap_codec::{BincodeCodec, Codec, CodecError, JsonCodec};
