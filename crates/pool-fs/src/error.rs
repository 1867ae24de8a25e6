//! Error types for pool-fs

use std::path::PathBuf;

/// Result type for pool-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading documents
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML document at {path}: {message}")]
    DocumentParse { path: PathBuf, message: String },

    #[error("Document too large: {path} is {size} bytes (max {max})")]
    DocumentTooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Document at {path} is not a mapping")]
    NotAMapping { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
