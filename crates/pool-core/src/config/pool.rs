//! Fully resolved pool configuration

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Utc};
use pool_meta::{Architecture, Artifact, Container, MachineCatalog, Provider};
use serde::Serialize;

use super::resolver::{FlattenedPool, INHERITED_FIELDS, PoolResolver};
use crate::schedule::{CronSchedule, cycle_crons};
use crate::{Error, Result};

/// A machine type a pool can run on, with how many of its tasks fit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineCandidate {
    pub name: String,
    pub capacity: u32,
    pub zone_blacklist: BTreeSet<String>,
}

/// A pool after flattening: every field set, ready for scheduling.
///
/// Only `schedule_start` may be absent, meaning "now" whenever schedules
/// are derived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolConfiguration {
    /// Basename of the pool document (`pool1` for `pool1.yml`)
    pub pool_id: String,
    /// Directory parent and preprocess documents are read from
    #[serde(skip)]
    pub base_dir: PathBuf,
    pub name: String,
    pub parents: Vec<String>,
    /// Local path to artifact
    pub artifacts: BTreeMap<String, Artifact>,
    pub cloud: Provider,
    pub command: Vec<String>,
    pub container: Container,
    pub cores_per_task: u32,
    pub cpu: Architecture,
    /// Seconds between scheduled runs
    pub cycle_time: u64,
    /// Whole gigabytes
    pub disk_size: u64,
    pub imageset: String,
    /// Environment passed to the target
    pub macros: BTreeMap<String, String>,
    /// Seconds
    pub max_run_time: u64,
    pub metal: bool,
    /// Gigabytes per core
    pub minimum_memory_per_core: f64,
    pub platform: String,
    /// Pool id run before this one, empty if none
    pub preprocess: String,
    pub run_as_admin: bool,
    pub schedule_start: Option<DateTime<FixedOffset>>,
    pub scopes: Vec<String>,
    pub tasks: u32,
}

impl PoolConfiguration {
    /// Fill defaults on a flattened top-level pool and require completeness.
    pub(crate) fn finalize(flattened: FlattenedPool, base_dir: &Path) -> Result<Self> {
        let FlattenedPool {
            pool_id,
            mut fields,
            parents,
        } = flattened;

        fields.command.get_or_insert_with(Vec::new);
        fields.preprocess.get_or_insert_with(String::new);
        if fields.max_run_time.is_none() {
            fields.max_run_time = fields.cycle_time;
        }

        let missing: Vec<&'static str> = INHERITED_FIELDS
            .iter()
            .filter(|field| field.name != "schedule_start" && !(field.is_set)(&fields))
            .map(|field| field.name)
            .collect();
        let missing_fields = || Error::MissingFields {
            pool_id: pool_id.clone(),
            fields: missing.clone(),
        };

        let (
            Some(cloud),
            Some(command),
            Some(container),
            Some(cores_per_task),
            Some(cpu),
            Some(cycle_time),
            Some(disk_size),
            Some(imageset),
            Some(max_run_time),
            Some(metal),
            Some(minimum_memory_per_core),
            Some(platform),
            Some(preprocess),
            Some(run_as_admin),
            Some(tasks),
        ) = (
            fields.cloud,
            fields.command,
            fields.container,
            fields.cores_per_task,
            fields.cpu,
            fields.cycle_time,
            fields.disk_size,
            fields.imageset,
            fields.max_run_time,
            fields.metal,
            fields.minimum_memory_per_core,
            fields.platform,
            fields.preprocess,
            fields.run_as_admin,
            fields.tasks,
        )
        else {
            return Err(missing_fields());
        };

        for (field, value) in [
            ("cycle_time", cycle_time),
            ("cores_per_task", u64::from(cores_per_task)),
            ("tasks", u64::from(tasks)),
        ] {
            if value == 0 {
                return Err(Error::invalid(&pool_id, field, "must be greater than zero"));
            }
        }

        Ok(Self {
            pool_id,
            base_dir: base_dir.to_path_buf(),
            name: fields.name,
            parents,
            artifacts: fields.artifacts,
            cloud,
            command,
            container,
            cores_per_task,
            cpu,
            cycle_time,
            disk_size,
            imageset,
            macros: fields.macros,
            max_run_time,
            metal,
            minimum_memory_per_core,
            platform,
            preprocess,
            run_as_admin,
            schedule_start: fields.schedule_start,
            scopes: fields.scopes,
            tasks,
        })
    }

    /// Machine types this pool can run on, with per-machine task capacity.
    ///
    /// Fails if the catalog has no machine of the pool's shape.
    pub fn machine_candidates(&self, catalog: &MachineCatalog) -> Result<Vec<MachineCandidate>> {
        let found = catalog.filter(
            self.cloud,
            self.cpu,
            self.cores_per_task,
            self.minimum_memory_per_core,
            self.metal,
        );
        if found.is_empty() {
            return Err(Error::NoMachineMatch {
                pool_id: self.pool_id.clone(),
                provider: self.cloud,
                architecture: self.cpu,
                cores: self.cores_per_task,
                ram_per_core: self.minimum_memory_per_core,
                metal: self.metal,
            });
        }
        Ok(found
            .into_iter()
            .map(|machine| MachineCandidate {
                name: machine.name.to_string(),
                capacity: machine.spec.cpu / self.cores_per_task,
                zone_blacklist: machine.spec.zone_blacklist.clone(),
            })
            .collect())
    }

    /// Cron expressions reproducing `cycle_time`, starting at `schedule_start` or now.
    pub fn schedule_crons(&self) -> Vec<CronSchedule> {
        self.schedule_crons_from(Utc::now())
    }

    /// Like [`schedule_crons`](Self::schedule_crons), with `now` standing in
    /// for the current time when `schedule_start` is unset.
    pub fn schedule_crons_from(&self, now: DateTime<Utc>) -> Vec<CronSchedule> {
        let start = self
            .schedule_start
            .map_or(now, |start| start.with_timezone(&Utc));
        cycle_crons(start, self.cycle_time)
    }

    /// The preprocess pool to run before this one, if any.
    pub fn derive_preprocess(&self) -> Result<Option<PoolConfiguration>> {
        PoolResolver::new(&self.base_dir).derive_preprocess(self)
    }
}
