//! On-disk layout of a store.
//!
//! ```text
//! <root>/
//!   metadata.json   { "type": "<type tag>", "codec": "<codec name>" }
//!   data/
//!     <key>         encoded value
//! ```

use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};

/// Name of the metadata file at the store root.
pub const METADATA_FILE: &str = "metadata.json";

/// Name of the subdirectory holding one file per entry.
pub const DATA_DIR: &str = "data";

/// Prefix of in-flight temp files written by atomic puts.
pub(crate) const TEMP_PREFIX: &str = ".filemap-tmp-";

/// Resolved paths of a store rooted at one directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreLayout {
    root: PathBuf,
    data_dir: PathBuf,
    metadata_path: PathBuf,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            data_dir: root.join(DATA_DIR),
            metadata_path: root.join(METADATA_FILE),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// Path of the file holding `key`. The key is used verbatim as a single
    /// file name inside the data directory.
    pub fn entry_path(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self.data_dir.join(key))
    }
}

/// Reject keys that are not a single plain file name.
pub fn validate_key(key: &str) -> StoreResult<()> {
    let reason = if key.is_empty() {
        "key is empty"
    } else if key == "." || key == ".." {
        "key is a relative path component"
    } else if key.contains(['/', '\\']) {
        "key contains a path separator"
    } else if key.contains('\0') {
        "key contains a NUL byte"
    } else {
        return Ok(());
    };
    Err(StoreError::InvalidKey {
        key: key.to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_under_root() {
        let layout = StoreLayout::new("/tmp/db");
        assert_eq!(layout.data_dir(), Path::new("/tmp/db/data"));
        assert_eq!(layout.metadata_path(), Path::new("/tmp/db/metadata.json"));
        assert_eq!(
            layout.entry_path("foo").unwrap(),
            PathBuf::from("/tmp/db/data/foo")
        );
    }

    #[test]
    fn keys_are_not_escaped() {
        let layout = StoreLayout::new("/tmp/db");
        let path = layout.entry_path("a b%20c.json").unwrap();
        assert_eq!(path.file_name().unwrap(), "a b%20c.json");
    }

    #[test]
    fn rejects_path_like_keys() {
        for key in ["", ".", "..", "a/b", "..\\x", "nul\0"] {
            let err = validate_key(key).unwrap_err();
            assert!(matches!(err, StoreError::InvalidKey { .. }), "{key:?}");
        }
    }

    #[test]
    fn accepts_dotted_names() {
        validate_key(".hidden").unwrap();
        validate_key("...").unwrap();
        validate_key("v1.2").unwrap();
    }
}
