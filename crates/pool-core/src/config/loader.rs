//! Loading a document of unknown kind from a path

use std::path::Path;

use pool_fs::document::{load_mapping, pool_id_of};
use pool_meta::DocumentKind;
use serde_yaml::Value;

use super::map::PoolConfigMap;
use super::pool::PoolConfiguration;
use super::resolver::PoolResolver;
use crate::{Error, Result};

/// Either kind of document, resolved.
#[derive(Debug, Clone)]
pub enum LoadedConfig {
    Pool(PoolConfiguration),
    Map(PoolConfigMap),
}

impl LoadedConfig {
    /// Pool id of the loaded document.
    pub fn pool_id(&self) -> &str {
        match self {
            LoadedConfig::Pool(pool) => &pool.pool_id,
            LoadedConfig::Map(map) => map.pool_id(),
        }
    }

    /// The pool itself, or every expansion of the map.
    pub fn pools(&self) -> Result<Vec<PoolConfiguration>> {
        match self {
            LoadedConfig::Pool(pool) => Ok(vec![pool.clone()]),
            LoadedConfig::Map(map) => map.iter_pools().collect(),
        }
    }
}

/// Loads pool or map documents, telling them apart by their keys.
pub struct PoolConfigLoader;

impl PoolConfigLoader {
    /// Load the document at `path`.
    ///
    /// The pool id is the file stem and parents are looked up next to the
    /// file. A document whose keys satisfy the pool schema is a pool,
    /// otherwise one satisfying the map schema is a map.
    pub fn from_file(path: &Path) -> Result<LoadedConfig> {
        let data = load_mapping(path)?;
        let pool_id = pool_id_of(path).unwrap_or_default();
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let resolver = PoolResolver::new(base_dir);

        let keys: Vec<&str> = data.keys().filter_map(Value::as_str).collect();
        if DocumentKind::Pool.accepts_keys(keys.iter().copied()) {
            tracing::debug!(?path, pool_id, "Loading pool configuration");
            return resolver.resolve_document(pool_id, &data).map(LoadedConfig::Pool);
        }
        if DocumentKind::Map.accepts_keys(keys.iter().copied()) {
            tracing::debug!(?path, pool_id, "Loading pool map");
            return PoolConfigMap::from_document(resolver, pool_id, &data).map(LoadedConfig::Map);
        }

        tracing::error!(?path, ?keys, "Failed to identify configuration type");
        Err(Error::Unidentifiable {
            path: path.to_path_buf(),
            keys: keys.iter().map(|key| key.to_string()).collect(),
            pool_required: DocumentKind::Pool.required().to_vec(),
            map_required: DocumentKind::Map.required().to_vec(),
        })
    }
}
