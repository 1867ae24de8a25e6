//! Pool maps: one fragment applied to several pools
//!
//! A map document has no `parents`. Instead it lists the pools it is
//! `apply_to`'d to, and for each of those it resolves as though it were a
//! child of that pool.

use std::path::Path;

use chrono::{DateTime, FixedOffset};
use pool_meta::{Architecture, Document, DocumentKind, Provider};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use super::fields::PoolFields;
use super::pool::PoolConfiguration;
use super::resolver::PoolResolver;
use crate::{Error, Result};

/// Resolved values every expansion of a map must agree on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedFields {
    pub cloud: Provider,
    pub cores_per_task: u32,
    pub cpu: Architecture,
    pub cycle_time: u64,
    pub disk_size: u64,
    pub imageset: String,
    pub metal: bool,
    pub minimum_memory_per_core: f64,
    pub platform: String,
    pub schedule_start: Option<DateTime<FixedOffset>>,
}

impl SharedFields {
    fn of(pool: &PoolConfiguration) -> Self {
        Self {
            cloud: pool.cloud,
            cores_per_task: pool.cores_per_task,
            cpu: pool.cpu,
            cycle_time: pool.cycle_time,
            disk_size: pool.disk_size,
            imageset: pool.imageset.clone(),
            metal: pool.metal,
            minimum_memory_per_core: pool.minimum_memory_per_core,
            platform: pool.platform.clone(),
            schedule_start: pool.schedule_start,
        }
    }

    /// Name of the first field that differs from `other`.
    fn first_difference(&self, other: &Self) -> Option<&'static str> {
        [
            ("cloud", self.cloud == other.cloud),
            ("cores_per_task", self.cores_per_task == other.cores_per_task),
            ("cpu", self.cpu == other.cpu),
            ("cycle_time", self.cycle_time == other.cycle_time),
            ("disk_size", self.disk_size == other.disk_size),
            ("imageset", self.imageset == other.imageset),
            ("metal", self.metal == other.metal),
            (
                "minimum_memory_per_core",
                self.minimum_memory_per_core == other.minimum_memory_per_core,
            ),
            ("platform", self.platform == other.platform),
            ("schedule_start", self.schedule_start == other.schedule_start),
        ]
        .into_iter()
        .find(|(_, same)| !same)
        .map(|(field, _)| field)
    }
}

/// A validated map document.
#[derive(Debug, Clone)]
pub struct PoolConfigMap {
    pool_id: String,
    name: String,
    apply_to: Vec<String>,
    fields: PoolFields,
    shared: SharedFields,
    resolver: PoolResolver,
}

impl PoolConfigMap {
    /// Load the map document `pool_id` from `base_dir`.
    pub fn load(base_dir: &Path, pool_id: &str) -> Result<Self> {
        let resolver = PoolResolver::new(base_dir);
        let data = resolver.store().load_pool(pool_id)?;
        Self::from_document(resolver, pool_id, &data)
    }

    /// Validate a map document and check it against every target.
    ///
    /// Each target is expanded once to verify that the shared fields agree
    /// and that none of the expansions end up with a preprocess step.
    pub fn from_document(resolver: PoolResolver, pool_id: &str, data: &Mapping) -> Result<Self> {
        let document = Document::validate(pool_id, DocumentKind::Map, data)?;
        let fields = PoolFields::from_document(&document)?;
        let apply_to = document.strings("apply_to").unwrap_or_default();

        let pools = apply_to
            .iter()
            .map(|target| expand(&resolver, pool_id, &fields, target))
            .collect::<Result<Vec<_>>>()?;
        let Some((first, rest)) = pools.split_first() else {
            return Err(Error::consistency(pool_id, "apply_to must name at least one pool"));
        };
        let shared = SharedFields::of(first);
        for pool in rest {
            if let Some(field) = shared.first_difference(&SharedFields::of(pool)) {
                return Err(Error::consistency(pool_id, format!("{field} has multiple values")));
            }
        }
        if pools.iter().any(|pool| !pool.preprocess.is_empty()) {
            return Err(Error::consistency(pool_id, "preprocess cannot be defined"));
        }

        tracing::debug!(pool_id, targets = apply_to.len(), "Created pool map");
        Ok(Self {
            pool_id: pool_id.to_string(),
            name: fields.name.clone(),
            apply_to,
            fields,
            shared,
            resolver,
        })
    }

    pub fn pool_id(&self) -> &str {
        &self.pool_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply_to(&self) -> &[String] {
        &self.apply_to
    }

    /// The map's own fields, before any target is applied.
    pub fn fields(&self) -> &PoolFields {
        &self.fields
    }

    /// Values all expansions share.
    pub fn shared(&self) -> &SharedFields {
        &self.shared
    }

    /// Resolve the map as a child of `target`.
    ///
    /// The result has pool id `<target>/<map id>` and is named
    /// `"<target name> (<map name>)"`.
    pub fn apply(&self, target: &str) -> Result<PoolConfiguration> {
        expand(&self.resolver, &self.pool_id, &self.fields, target)
    }

    /// Every expansion, in `apply_to` order.
    ///
    /// Each call starts over and re-reads all documents from disk.
    pub fn iter_pools(&self) -> impl Iterator<Item = Result<PoolConfiguration>> + '_ {
        self.apply_to.iter().map(|target| self.apply(target))
    }
}

fn expand(
    resolver: &PoolResolver,
    map_id: &str,
    fields: &PoolFields,
    target: &str,
) -> Result<PoolConfiguration> {
    let pool_id = format!("{target}/{map_id}");
    tracing::debug!(map = map_id, target, "Applying pool map");

    let target_name = resolver.resolve(target)?.name;
    let mut data = fields.to_document()?;
    data.insert("name".into(), format!("{target_name} ({})", fields.name).into());
    data.insert("parents".into(), Value::Sequence(vec![Value::from(target)]));

    resolver.resolve_document(&pool_id, &data)
}
