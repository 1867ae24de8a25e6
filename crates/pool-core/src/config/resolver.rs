//! Flattening of pool documents along their parent chains
//!
//! The `PoolResolver` loads a pool document and every ancestor it names,
//! depth first and in declared order, merging each parent into the child.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use pool_fs::DocumentStore;
use pool_meta::{Document, DocumentKind};
use serde_yaml::{Mapping, Value};

use super::fields::PoolFields;
use super::pool::PoolConfiguration;
use crate::{Error, Result};

/// Deepest parent chain the resolver follows before giving up.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Fields a preprocess document must leave to its owning pool.
const PREPROCESS_FORBIDDEN_FIELDS: &[&str] = &[
    "disk_size",
    "cores_per_task",
    "cpu",
    "cloud",
    "cycle_time",
    "imageset",
    "metal",
    "minimum_memory_per_core",
    "platform",
    "preprocess",
    "schedule_start",
];

/// A scalar field taken from a parent when the child leaves it unset.
///
/// Every parent in turn overwrites it, so a later parent that leaves the
/// field unset clears a value adopted from an earlier one.
pub(crate) struct InheritedField {
    pub(crate) name: &'static str,
    pub(crate) is_set: fn(&PoolFields) -> bool,
    adopt: fn(&mut PoolFields, &PoolFields),
}

macro_rules! inherited_fields {
    ($($field:ident),* $(,)?) => {
        &[$(InheritedField {
            name: stringify!($field),
            is_set: |fields| fields.$field.is_some(),
            adopt: |child, parent| child.$field = parent.$field.clone(),
        }),*]
    };
}

/// Overwriting fields. `name` is absent: every document must declare its own.
pub(crate) const INHERITED_FIELDS: &[InheritedField] = inherited_fields!(
    cloud,
    command,
    container,
    cores_per_task,
    cpu,
    cycle_time,
    disk_size,
    imageset,
    max_run_time,
    metal,
    minimum_memory_per_core,
    platform,
    preprocess,
    schedule_start,
    tasks,
    run_as_admin,
);

/// A document flattened against its parents but not yet finalized.
#[derive(Debug, Clone)]
pub(crate) struct FlattenedPool {
    pub(crate) pool_id: String,
    pub(crate) fields: PoolFields,
    pub(crate) parents: Vec<String>,
}

/// Resolves pool ids to fully flattened [`PoolConfiguration`]s.
///
/// Every call starts from scratch: documents are re-read from disk and no
/// state is kept between calls.
#[derive(Debug, Clone)]
pub struct PoolResolver {
    store: DocumentStore,
    max_depth: usize,
}

impl PoolResolver {
    /// Create a resolver for the pool documents in `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_max_depth(base_dir, DEFAULT_MAX_DEPTH)
    }

    /// Create a resolver that follows parent chains at most `max_depth` deep.
    pub fn with_max_depth(base_dir: impl Into<PathBuf>, max_depth: usize) -> Self {
        Self {
            store: DocumentStore::new(base_dir),
            max_depth,
        }
    }

    pub fn base_dir(&self) -> &Path {
        self.store.base_dir()
    }

    pub(crate) fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Load, flatten and finalize the pool document `pool_id`.
    pub fn resolve(&self, pool_id: &str) -> Result<PoolConfiguration> {
        let data = self.store.load_pool(pool_id)?;
        self.resolve_document(pool_id, &data)
    }

    /// Flatten and finalize an in-memory pool document.
    ///
    /// Parents named by the document are still read from the base directory.
    pub fn resolve_document(&self, pool_id: &str, data: &Mapping) -> Result<PoolConfiguration> {
        let mut visited = BTreeSet::from([pool_id.to_string()]);
        let flattened = self.flatten(pool_id, data, &mut visited, 0)?;
        PoolConfiguration::finalize(flattened, self.base_dir())
    }

    /// Derive the preprocess pool of `pool`, if it names one.
    ///
    /// The preprocess document must run exactly one task and must not set
    /// any of the fields that define where and when the pool runs; those
    /// come from `pool` itself, which becomes its first parent.
    pub fn derive_preprocess(&self, pool: &PoolConfiguration) -> Result<Option<PoolConfiguration>> {
        if pool.preprocess.is_empty() {
            return Ok(None);
        }
        let mut data = self.store.load_pool(&pool.preprocess)?;
        Document::validate(&pool.preprocess, DocumentKind::Pool, &data)?;

        let tasks = data.get("tasks").filter(|value| !value.is_null());
        let single_task = match tasks {
            Some(value) => value.as_u64() == Some(1),
            None => pool.tasks == 1,
        };
        if !single_task {
            return Err(Error::consistency(
                &pool.preprocess,
                format!("{} must set tasks = 1", pool.preprocess),
            ));
        }
        for field in PREPROCESS_FORBIDDEN_FIELDS {
            if data.get(*field).is_some_and(|value| !value.is_null()) {
                return Err(Error::consistency(
                    &pool.preprocess,
                    format!("{} cannot set {field}", pool.preprocess),
                ));
            }
        }

        let mut parents = vec![Value::from(pool.pool_id.clone())];
        if let Some(Value::Sequence(existing)) = data.get("parents") {
            parents.extend(existing.iter().cloned());
        }
        data.insert("preprocess".into(), "".into());
        data.insert("parents".into(), Value::Sequence(parents));

        let pool_id = format!("{}/preprocess", pool.pool_id);
        tracing::debug!(%pool_id, preprocess = %pool.preprocess, "Deriving preprocess pool");
        let mut result = self.resolve_document(&pool_id, &data)?;
        result.name = format!("{} ({})", pool.name, result.name);
        Ok(Some(result))
    }

    fn load_flattened(
        &self,
        pool_id: &str,
        visited: &mut BTreeSet<String>,
        depth: usize,
    ) -> Result<FlattenedPool> {
        let data = self.store.load_pool(pool_id)?;
        self.flatten(pool_id, &data, visited, depth)
    }

    fn flatten(
        &self,
        pool_id: &str,
        data: &Mapping,
        visited: &mut BTreeSet<String>,
        depth: usize,
    ) -> Result<FlattenedPool> {
        tracing::debug!(pool_id, "Creating pool");
        let document = Document::validate(pool_id, DocumentKind::Pool, data)?;
        let mut fields = PoolFields::from_document(&document)?;
        let parents = document.strings("parents").unwrap_or_default();

        if !parents.is_empty() && depth >= self.max_depth {
            return Err(Error::InheritanceTooDeep {
                pool_id: pool_id.to_string(),
                limit: self.max_depth,
            });
        }

        // Which overwriting fields the document itself leaves unset.
        let unset: Vec<&InheritedField> = INHERITED_FIELDS
            .iter()
            .filter(|field| !(field.is_set)(&fields))
            .collect();
        let own_artifacts = fields.artifacts.clone();
        let own_macros = fields.macros.clone();

        for parent_id in &parents {
            if !visited.insert(parent_id.clone()) {
                return Err(Error::Cycle {
                    pool_id: pool_id.to_string(),
                    parent_id: parent_id.clone(),
                });
            }
            let parent = self.load_flattened(parent_id, visited, depth + 1)?;
            inherit(pool_id, &mut fields, &parent, &unset);
        }

        fields.artifacts.extend(own_artifacts);
        fields.macros.extend(own_macros);

        Ok(FlattenedPool {
            pool_id: pool_id.to_string(),
            fields,
            parents,
        })
    }
}

/// Merge one flattened parent into `fields`.
fn inherit(pool_id: &str, fields: &mut PoolFields, parent: &FlattenedPool, unset: &[&InheritedField]) {
    let parent_id = parent.pool_id.as_str();
    let from = &parent.fields;

    for field in unset {
        if (field.is_set)(from) {
            tracing::debug!(field = field.name, pool_id, parent_id, "Overwriting field from parent");
        }
        (field.adopt)(fields, from);
    }

    if !from.artifacts.is_empty() {
        tracing::debug!(field = "artifacts", pool_id, parent_id, "Merging mapping field from parent");
    }
    merge_mapping(&mut fields.artifacts, &from.artifacts);
    if !from.macros.is_empty() {
        tracing::debug!(field = "macros", pool_id, parent_id, "Merging mapping field from parent");
    }
    merge_mapping(&mut fields.macros, &from.macros);

    if !from.scopes.is_empty() {
        tracing::debug!(field = "scopes", pool_id, parent_id, "Merging set field from parent");
    }
    let scopes: BTreeSet<String> = fields.scopes.drain(..).chain(from.scopes.iter().cloned()).collect();
    fields.scopes = scopes.into_iter().collect();
}

fn merge_mapping<V: Clone>(into: &mut BTreeMap<String, V>, from: &BTreeMap<String, V>) {
    for (key, value) in from {
        into.insert(key.clone(), value.clone());
    }
}
