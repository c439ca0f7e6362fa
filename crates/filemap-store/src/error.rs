use std::io;
use std::path::PathBuf;

use filemap_codec::CodecError;

/// Errors from persistent map operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Creating the directory layout or metadata of a new store failed.
    #[error("failed to initialize store at {path}: {source}")]
    Initialization {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An existing root directory is not a valid store.
    #[error("corrupt store at {path}: {reason}")]
    CorruptStore { path: PathBuf, reason: String },

    /// The store was created for a different value type.
    #[error("stored type ({stored}) is not the same as requested type ({requested})")]
    TypeMismatch { stored: String, requested: String },

    /// The store was written with a different codec.
    #[error("stored codec ({stored}) is not the same as requested codec ({requested})")]
    CodecMismatch { stored: String, requested: String },

    /// The bytes stored under a key do not decode as the declared type.
    #[error("failed to deserialize value for key {key:?}: {source}")]
    Deserialization {
        key: String,
        #[source]
        source: CodecError,
    },

    /// A value could not be encoded for writing.
    #[error("failed to serialize value for key {key:?}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: CodecError,
    },

    /// I/O failure while reading, writing, listing, or deleting entries.
    #[error("I/O error on {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The key cannot be used as a single file name.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// The operation is refused by this store instance.
    #[error("operation not supported: {operation}")]
    Unsupported { operation: &'static str },

    /// Store configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptStore {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
