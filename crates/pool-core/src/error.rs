//! Error types for pool-core

use std::path::PathBuf;

use pool_meta::{Architecture, Provider};

/// Result type for pool-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving pool configurations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A parent id reappeared while flattening
    #[error("attempt to resolve cyclic configuration, {parent_id} already encountered (while resolving {pool_id})")]
    Cycle { pool_id: String, parent_id: String },

    /// The parent chain is deeper than the resolver allows
    #[error("parent chain of {pool_id} exceeds the maximum depth of {limit}")]
    InheritanceTooDeep { pool_id: String, limit: usize },

    /// Values that must agree do not, or a preprocess document sets what it must not
    #[error("{pool_id}: {message}")]
    Consistency { pool_id: String, message: String },

    /// Required fields are still unset after flattening and defaults
    #[error("Pool {pool_id} is missing fields: {fields:?}")]
    MissingFields {
        pool_id: String,
        fields: Vec<&'static str>,
    },

    /// A field holds a well-typed but unusable value
    #[error("{pool_id}: invalid '{field}': {message}")]
    InvalidValue {
        pool_id: String,
        field: &'static str,
        message: String,
    },

    /// The catalog has no machine for the pool's shape
    #[error(
        "No available machines match specified configuration for {pool_id} \
         ({provider}/{architecture}, {cores} cores, {ram_per_core} GB per core, metal: {metal})"
    )]
    NoMachineMatch {
        pool_id: String,
        provider: Provider,
        architecture: Architecture,
        cores: u32,
        ram_per_core: f64,
        metal: bool,
    },

    /// The document's keys fit neither the pool nor the map table
    #[error(
        "{path} type could not be identified: has keys {keys:?}, expected all of either \
         {pool_required:?} or {map_required:?} to exist"
    )]
    Unidentifiable {
        path: PathBuf,
        keys: Vec<String>,
        pool_required: Vec<&'static str>,
        map_required: Vec<&'static str>,
    },

    // Transparent wrappers for underlying crate errors
    /// Schema, parse or catalog error from pool-meta
    #[error(transparent)]
    Meta(#[from] pool_meta::Error),

    /// Filesystem error from pool-fs
    #[error(transparent)]
    Fs(#[from] pool_fs::Error),
}

impl Error {
    pub fn consistency(pool_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Consistency {
            pool_id: pool_id.into(),
            message: message.into(),
        }
    }

    pub fn invalid(pool_id: impl Into<String>, field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            pool_id: pool_id.into(),
            field,
            message: message.into(),
        }
    }
}
