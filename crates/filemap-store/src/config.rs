use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// How entry files are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Truncate and rewrite the entry file in place. A failed write may leave
    /// a truncated file behind.
    Direct,
    /// Write a temp file in the store root, then rename it over the entry.
    #[default]
    AtomicRename,
}

/// Flush/sync strategy for entry files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// `fsync` every written entry before returning.
    EveryWrite,
    /// Rely on OS page-cache buffering.
    #[default]
    OsDefault,
}

/// Configuration for opening a [`PersistentMap`](crate::PersistentMap).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub write_mode: WriteMode,
    pub sync_mode: SyncMode,
    /// Create the store when the root directory does not exist.
    pub create_if_missing: bool,
    /// Refuse every mutation. A read-only open never creates a store.
    pub read_only: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            write_mode: WriteMode::default(),
            sync_mode: SyncMode::default(),
            create_if_missing: true,
            read_only: false,
        }
    }
}

impl StoreConfig {
    /// Configuration for inspecting an existing store without touching it.
    pub fn read_only() -> Self {
        Self {
            create_if_missing: false,
            read_only: true,
            ..Default::default()
        }
    }

    /// Parse a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        toml::from_str(s).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}
