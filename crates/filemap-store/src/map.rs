//! The persistent map: one file per key under `<root>/data`.
//!
//! Every operation is a short sequence of blocking filesystem calls and no
//! file handle outlives the call that opened it. Nothing is cached and nothing
//! is locked, so concurrent writers to the same root are not coordinated:
//!
//! - [`PersistentMap::put`] reads the previous value and then writes the new
//!   one; another writer in between makes the returned previous value stale.
//! - [`PersistentMap::values`], [`PersistentMap::entries`] and
//!   [`PersistentMap::contains_value`] list the keys first and read each one
//!   afterwards. They are not snapshots; keys that disappear in between are
//!   skipped.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::Path;

use filemap_codec::{Codec, JsonCodec};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{StoreConfig, SyncMode, WriteMode};
use crate::error::{StoreError, StoreResult};
use crate::layout::{StoreLayout, TEMP_PREFIX};
use crate::metadata::StoreMetadata;

/// A map from string keys to values of one declared type, persisted as one
/// file per entry.
///
/// The store is pinned to a caller-supplied type tag when it is created.
/// Reopening it with a different tag fails with
/// [`StoreError::TypeMismatch`].
pub struct PersistentMap<T, C = JsonCodec> {
    layout: StoreLayout,
    metadata: StoreMetadata,
    config: StoreConfig,
    codec: C,
    _value: PhantomData<fn() -> T>,
}

impl<T> PersistentMap<T, JsonCodec>
where
    T: Serialize + DeserializeOwned,
{
    /// Open the store at `root`, creating it if it does not exist.
    pub fn open(root: impl AsRef<Path>, type_tag: &str) -> StoreResult<Self> {
        Self::open_with_config(root, type_tag, StoreConfig::default())
    }

    /// Open the store at `root` with explicit configuration.
    pub fn open_with_config(
        root: impl AsRef<Path>,
        type_tag: &str,
        config: StoreConfig,
    ) -> StoreResult<Self> {
        Self::open_with_codec(root, type_tag, config, JsonCodec::default())
    }
}

impl<T, C> PersistentMap<T, C>
where
    T: Serialize + DeserializeOwned,
    C: Codec,
{
    /// Open the store at `root` with explicit configuration and codec.
    ///
    /// A missing root is initialized with the data directory and a metadata
    /// record naming `type_tag` and the codec. An existing root must have the
    /// full layout and matching metadata; it is never rewritten.
    pub fn open_with_codec(
        root: impl AsRef<Path>,
        type_tag: &str,
        config: StoreConfig,
        codec: C,
    ) -> StoreResult<Self> {
        let layout = StoreLayout::new(root.as_ref());

        let metadata = match fs::metadata(layout.root()) {
            Ok(meta) if meta.is_dir() => Self::validate_existing(&layout, type_tag, &codec)?,
            Ok(_) => {
                return Err(StoreError::corrupt(
                    layout.root(),
                    "root path is not a directory",
                ))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Self::initialize(&layout, type_tag, &config, &codec)?
            }
            Err(e) => {
                return Err(StoreError::Initialization {
                    path: layout.root().to_path_buf(),
                    source: e,
                })
            }
        };

        Ok(Self {
            layout,
            metadata,
            config,
            codec,
            _value: PhantomData,
        })
    }

    fn initialize(
        layout: &StoreLayout,
        type_tag: &str,
        config: &StoreConfig,
        codec: &C,
    ) -> StoreResult<StoreMetadata> {
        if !config.create_if_missing || config.read_only {
            return Err(StoreError::Initialization {
                path: layout.root().to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "store does not exist"),
            });
        }

        fs::create_dir_all(layout.data_dir()).map_err(|e| StoreError::Initialization {
            path: layout.data_dir().to_path_buf(),
            source: e,
        })?;

        let metadata = StoreMetadata::new(type_tag, codec.name());
        metadata.write(layout.metadata_path())?;

        info!(
            root = %layout.root().display(),
            value_type = type_tag,
            codec = codec.name(),
            "created store"
        );
        Ok(metadata)
    }

    fn validate_existing(
        layout: &StoreLayout,
        type_tag: &str,
        codec: &C,
    ) -> StoreResult<StoreMetadata> {
        if !layout.data_dir().is_dir() {
            return Err(StoreError::corrupt(
                layout.data_dir(),
                "missing data directory",
            ));
        }
        if !layout.metadata_path().is_file() {
            return Err(StoreError::corrupt(
                layout.metadata_path(),
                "missing metadata file",
            ));
        }

        let metadata = StoreMetadata::read(layout.metadata_path())?;
        metadata.verify(type_tag, codec.name())?;

        info!(
            root = %layout.root().display(),
            value_type = type_tag,
            "opened existing store"
        );
        Ok(metadata)
    }

    // ---------------------------------------------------------------
    // Key operations
    // ---------------------------------------------------------------

    /// Returns `true` if an entry file exists for `key`.
    pub fn contains_key(&self, key: &str) -> StoreResult<bool> {
        let path = self.layout.entry_path(key)?;
        path.try_exists()
            .map_err(|e| StoreError::persistence(path, e))
    }

    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key has never been written.
    pub fn get(&self, key: &str) -> StoreResult<Option<T>> {
        let path = self.layout.entry_path(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::persistence(path, e)),
        };

        let value = self
            .codec
            .decode(&bytes)
            .map_err(|source| StoreError::Deserialization {
                key: key.to_string(),
                source,
            })?;
        Ok(Some(value))
    }

    /// Store `value` under `key`, replacing any previous value in full.
    ///
    /// Returns the previous value, read just before the write.
    pub fn put(&self, key: &str, value: &T) -> StoreResult<Option<T>> {
        self.ensure_writable("put")?;
        let path = self.layout.entry_path(key)?;
        let previous = self.get(key)?;

        let bytes = self
            .codec
            .encode(value)
            .map_err(|source| StoreError::Serialization {
                key: key.to_string(),
                source,
            })?;
        self.write_entry(&path, &bytes)?;

        debug!(key, len = bytes.len(), replaced = previous.is_some(), "put");
        Ok(previous)
    }

    /// Store every pair in iteration order. Not atomic across keys: a failure
    /// leaves the earlier pairs written.
    pub fn put_all<I, K>(&self, entries: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = (K, T)>,
        K: AsRef<str>,
    {
        for (key, value) in entries {
            self.put(key.as_ref(), &value)?;
        }
        Ok(())
    }

    /// Delete the entry for `key`, returning its value if it existed.
    ///
    /// An entry whose bytes no longer decode is still deleted; its previous
    /// value is reported as `None`.
    pub fn remove(&self, key: &str) -> StoreResult<Option<T>> {
        self.ensure_writable("remove")?;
        let path = self.layout.entry_path(key)?;
        let previous = match self.get(key) {
            Ok(previous) => previous,
            Err(StoreError::Deserialization { source, .. }) => {
                warn!(key, error = %source, "removing undecodable entry");
                None
            }
            Err(e) => return Err(e),
        };

        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::persistence(path, e)),
        }

        debug!(key, existed = previous.is_some(), "remove");
        Ok(previous)
    }

    // ---------------------------------------------------------------
    // Enumeration
    // ---------------------------------------------------------------

    /// Number of entries, counting the same file names [`Self::keys`] returns.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.keys()?.len())
    }

    /// Returns `true` if the store has no entries.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// All keys currently in the store, in no particular order.
    pub fn keys(&self) -> StoreResult<HashSet<String>> {
        let data_dir = self.layout.data_dir();
        let mut keys = HashSet::new();
        for entry in fs::read_dir(data_dir).map_err(|e| StoreError::persistence(data_dir, e))? {
            let entry = entry.map_err(|e| StoreError::persistence(data_dir, e))?;
            match entry.file_name().into_string() {
                Ok(name) => {
                    keys.insert(name);
                }
                Err(name) => {
                    warn!(?name, "skipping entry with non UTF-8 file name");
                }
            }
        }
        Ok(keys)
    }

    /// All values currently in the store, in no particular order.
    pub fn values(&self) -> StoreResult<Vec<T>> {
        let mut values = Vec::new();
        for key in self.keys()? {
            if let Some(value) = self.get(&key)? {
                values.push(value);
            }
        }
        Ok(values)
    }

    /// All key/value pairs currently in the store.
    pub fn entries(&self) -> StoreResult<HashMap<String, T>> {
        let mut entries = HashMap::new();
        for key in self.keys()? {
            if let Some(value) = self.get(&key)? {
                entries.insert(key, value);
            }
        }
        Ok(entries)
    }

    /// Returns `true` if any stored value equals `value`. Reads every entry
    /// until a match is found.
    pub fn contains_value(&self, value: &T) -> StoreResult<bool>
    where
        T: PartialEq,
    {
        for key in self.keys()? {
            if self.get(&key)?.as_ref() == Some(value) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Delete every entry. The data directory itself is kept, empty.
    pub fn clear(&self) -> StoreResult<()> {
        self.ensure_writable("clear")?;
        self.ensure_data_dir()?;

        let data_dir = self.layout.data_dir();
        let mut removed = 0usize;
        for entry in WalkDir::new(data_dir).min_depth(1).contents_first(true) {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| data_dir.to_path_buf());
                StoreError::persistence(path, e.into())
            })?;
            let path = entry.path();
            let result = if entry.file_type().is_dir() {
                fs::remove_dir(path)
            } else {
                fs::remove_file(path)
            };
            result.map_err(|e| StoreError::persistence(path, e))?;
            removed += 1;
        }

        debug!(removed, "cleared store");
        Ok(())
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    /// Directory holding one file per entry.
    pub fn data_dir(&self) -> &Path {
        self.layout.data_dir()
    }

    /// The type tag recorded when the store was created.
    pub fn type_tag(&self) -> &str {
        &self.metadata.value_type
    }

    /// Metadata record read or written when the store was opened.
    pub fn metadata(&self) -> &StoreMetadata {
        &self.metadata
    }

    /// Codec used for entry files.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Configuration the store was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn ensure_writable(&self, operation: &'static str) -> StoreResult<()> {
        if self.config.read_only {
            return Err(StoreError::Unsupported { operation });
        }
        Ok(())
    }

    /// Recreate the data directory if something removed it.
    fn ensure_data_dir(&self) -> StoreResult<()> {
        let data_dir = self.layout.data_dir();
        fs::create_dir_all(data_dir).map_err(|e| StoreError::persistence(data_dir, e))
    }

    fn write_entry(&self, path: &Path, bytes: &[u8]) -> StoreResult<()> {
        self.ensure_data_dir()?;
        let sync = matches!(self.config.sync_mode, SyncMode::EveryWrite);

        match self.config.write_mode {
            WriteMode::Direct => {
                let mut file = File::create(path).map_err(|e| StoreError::persistence(path, e))?;
                file.write_all(bytes)
                    .map_err(|e| StoreError::persistence(path, e))?;
                if sync {
                    file.sync_all()
                        .map_err(|e| StoreError::persistence(path, e))?;
                }
            }
            WriteMode::AtomicRename => {
                // Temp files live in the root so they never show up as keys.
                let root = self.layout.root();
                let mut tmp = tempfile::Builder::new()
                    .prefix(TEMP_PREFIX)
                    .tempfile_in(root)
                    .map_err(|e| StoreError::persistence(root, e))?;
                tmp.write_all(bytes)
                    .map_err(|e| StoreError::persistence(tmp.path(), e))?;
                if sync {
                    tmp.as_file()
                        .sync_all()
                        .map_err(|e| StoreError::persistence(tmp.path(), e))?;
                }
                tmp.persist(path)
                    .map_err(|e| StoreError::persistence(path, e.error))?;
            }
        }
        Ok(())
    }
}

impl<T, C: Codec> std::fmt::Debug for PersistentMap<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentMap")
            .field("root", &self.layout.root())
            .field("value_type", &self.metadata.value_type)
            .field("codec", &self.codec.name())
            .field("read_only", &self.config.read_only)
            .finish()
    }
}
