use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// The persisted record pinning a store to one value type.
///
/// Written once when the store is created and never rewritten. Unknown keys
/// in the file are ignored on read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMetadata {
    /// Opaque type tag supplied by whoever created the store.
    #[serde(rename = "type")]
    pub value_type: String,
    /// Codec used for entry files. Absent in stores that predate the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
}

impl StoreMetadata {
    pub fn new(value_type: impl Into<String>, codec: &str) -> Self {
        Self {
            value_type: value_type.into(),
            codec: Some(codec.to_string()),
        }
    }

    /// Read and parse the metadata file of an existing store.
    pub fn read(path: &Path) -> StoreResult<Self> {
        let bytes = fs::read(path).map_err(|e| {
            StoreError::corrupt(path, format!("unreadable metadata file: {e}"))
        })?;
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::corrupt(path, format!("unparsable metadata: {e}")))
    }

    /// Write the metadata file of a new store.
    pub fn write(&self, path: &Path) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(self).map_err(|e| StoreError::Initialization {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        fs::write(path, json).map_err(|e| StoreError::Initialization {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Check that this record matches what the caller declared.
    pub fn verify(&self, value_type: &str, codec: &str) -> StoreResult<()> {
        if self.value_type != value_type {
            return Err(StoreError::TypeMismatch {
                stored: self.value_type.clone(),
                requested: value_type.to_string(),
            });
        }
        match &self.codec {
            Some(stored) if stored != codec => Err(StoreError::CodecMismatch {
                stored: stored.clone(),
                requested: codec.to_string(),
            }),
            _ => Ok(()),
        }
    }
}
