//! YAML document loading keyed by pool id

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use crate::{Error, Result, io};

/// File extension of pool documents on disk.
pub const POOL_EXTENSION: &str = "yml";

/// Reads pool documents from a base directory.
///
/// A `DocumentStore` holds no cache: every call goes back to disk, so two
/// independent resolutions never observe each other's reads.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    base_dir: PathBuf,
}

impl DocumentStore {
    /// Create a store rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Directory that relative pool ids are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the document for `pool_id`.
    pub fn pool_path(&self, pool_id: &str) -> PathBuf {
        self.base_dir.join(format!("{pool_id}.{POOL_EXTENSION}"))
    }

    /// Load the raw mapping for `pool_id`.
    pub fn load_pool(&self, pool_id: &str) -> Result<Mapping> {
        load_mapping(&self.pool_path(pool_id))
    }
}

/// Load a YAML file whose top level must be a mapping.
///
/// An empty file is treated as an empty mapping.
pub fn load_mapping(path: &Path) -> Result<Mapping> {
    tracing::debug!(?path, "Loading document");
    match load_yaml::<Value>(path)? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(Error::NotAMapping {
            path: path.to_path_buf(),
        }),
    }
}

/// Load and deserialize a YAML file.
pub fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = io::read_text(path)?;
    serde_yaml::from_str(&content).map_err(|e| Error::DocumentParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Pool id for a document path: its file stem.
pub fn pool_id_of(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|stem| stem.to_str())
}
