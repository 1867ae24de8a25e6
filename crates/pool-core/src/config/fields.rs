//! Normalized field values of a single pool or map document

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use pool_meta::values::{decode_artifacts, decode_container, decode_macros};
use pool_meta::{
    Architecture, Artifact, Container, Document, GIGABYTE, Provider, parse_duration, parse_size,
};
use serde_yaml::{Mapping, Value};

use crate::{Error, Result};

/// Fields of one document after normalization, before inheritance.
///
/// Unset scalar fields are `None`; they may still be filled from a parent.
/// Sizes are in gigabytes and durations in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolFields {
    pub name: String,
    pub artifacts: BTreeMap<String, Artifact>,
    pub cloud: Option<Provider>,
    pub command: Option<Vec<String>>,
    pub container: Option<Container>,
    pub cores_per_task: Option<u32>,
    pub cpu: Option<Architecture>,
    pub cycle_time: Option<u64>,
    /// Whole gigabytes
    pub disk_size: Option<u64>,
    pub imageset: Option<String>,
    pub macros: BTreeMap<String, String>,
    pub max_run_time: Option<u64>,
    pub metal: Option<bool>,
    /// Gigabytes per core
    pub minimum_memory_per_core: Option<f64>,
    pub platform: Option<String>,
    pub preprocess: Option<String>,
    pub run_as_admin: Option<bool>,
    pub schedule_start: Option<DateTime<FixedOffset>>,
    pub scopes: Vec<String>,
    pub tasks: Option<u32>,
}

impl PoolFields {
    /// Normalize the fields of a validated document.
    pub fn from_document(doc: &Document<'_>) -> Result<Self> {
        let id = doc.id();
        let name = doc
            .str("name")
            .ok_or_else(|| pool_meta::Error::schema(id, "name is required for every configuration"))?
            .to_string();

        let cloud = doc.str("cloud").map(str::parse::<Provider>).transpose()?;
        let cpu = doc.str("cpu").map(str::parse::<Architecture>).transpose()?;

        let container = doc
            .value("container")
            .map(|value| decode_container(id, value))
            .transpose()?;
        let artifacts = doc
            .mapping("artifacts")
            .map(|map| decode_artifacts(id, map))
            .transpose()?
            .unwrap_or_default();
        let macros = doc
            .mapping("macros")
            .map(|map| decode_macros(id, map))
            .transpose()?
            .unwrap_or_default();

        let disk_size = size_in_gigabytes(doc, "disk_size")?.map(|gb| gb as u64);

        Ok(Self {
            name,
            artifacts,
            cloud,
            command: doc.strings("command"),
            container,
            cores_per_task: count(doc, "cores_per_task")?,
            cpu,
            cycle_time: seconds(doc, "cycle_time")?,
            disk_size,
            imageset: doc.str("imageset").map(str::to_string),
            macros,
            max_run_time: seconds(doc, "max_run_time")?,
            metal: doc.bool("metal"),
            minimum_memory_per_core: size_in_gigabytes(doc, "minimum_memory_per_core")?,
            platform: doc.str("platform").map(str::to_string),
            preprocess: doc.str("preprocess").map(str::to_string),
            run_as_admin: doc.bool("run_as_admin"),
            schedule_start: doc
                .str("schedule_start")
                .map(|text| parse_schedule_start(id, text))
                .transpose()?,
            scopes: doc.strings("scopes").unwrap_or_default(),
            tasks: count(doc, "tasks")?,
        })
    }

    /// Render the fields back into a raw pool document.
    ///
    /// Sizes go back to bytes and the schedule start back to text, so the
    /// result normalizes to the same values again.
    pub fn to_document(&self) -> Result<Mapping> {
        let mut data = Mapping::new();
        data.insert("name".into(), self.name.clone().into());
        if !self.artifacts.is_empty() {
            let artifacts = serde_yaml::to_value(&self.artifacts)
                .map_err(|e| Error::invalid(&self.name, "artifacts", e.to_string()))?;
            data.insert("artifacts".into(), artifacts);
        }
        if let Some(cloud) = self.cloud {
            data.insert("cloud".into(), cloud.as_str().into());
        }
        if let Some(command) = &self.command {
            data.insert("command".into(), strings(command));
        }
        if let Some(container) = &self.container {
            let container = serde_yaml::to_value(container)
                .map_err(|e| Error::invalid(&self.name, "container", e.to_string()))?;
            data.insert("container".into(), container);
        }
        if let Some(cores) = self.cores_per_task {
            data.insert("cores_per_task".into(), cores.into());
        }
        if let Some(cpu) = self.cpu {
            data.insert("cpu".into(), cpu.as_str().into());
        }
        if let Some(cycle_time) = self.cycle_time {
            data.insert("cycle_time".into(), cycle_time.into());
        }
        if let Some(disk_size) = self.disk_size {
            let bytes = disk_size.checked_mul(GIGABYTE as u64).ok_or_else(|| {
                Error::invalid(&self.name, "disk_size", format!("{disk_size} GB does not fit in bytes"))
            })?;
            data.insert("disk_size".into(), bytes.into());
        }
        if let Some(imageset) = &self.imageset {
            data.insert("imageset".into(), imageset.clone().into());
        }
        if !self.macros.is_empty() {
            let macros: Mapping = self
                .macros
                .iter()
                .map(|(k, v)| (Value::from(k.clone()), Value::from(v.clone())))
                .collect();
            data.insert("macros".into(), Value::Mapping(macros));
        }
        if let Some(max_run_time) = self.max_run_time {
            data.insert("max_run_time".into(), max_run_time.into());
        }
        if let Some(metal) = self.metal {
            data.insert("metal".into(), metal.into());
        }
        if let Some(memory) = self.minimum_memory_per_core {
            data.insert("minimum_memory_per_core".into(), (memory * GIGABYTE).into());
        }
        if let Some(platform) = &self.platform {
            data.insert("platform".into(), platform.clone().into());
        }
        if let Some(preprocess) = &self.preprocess {
            data.insert("preprocess".into(), preprocess.clone().into());
        }
        if let Some(run_as_admin) = self.run_as_admin {
            data.insert("run_as_admin".into(), run_as_admin.into());
        }
        if let Some(start) = self.schedule_start {
            data.insert("schedule_start".into(), start.to_rfc3339().into());
        }
        if !self.scopes.is_empty() {
            data.insert("scopes".into(), strings(&self.scopes));
        }
        if let Some(tasks) = self.tasks {
            data.insert("tasks".into(), tasks.into());
        }
        Ok(data)
    }
}

fn strings(items: &[String]) -> Value {
    Value::Sequence(items.iter().cloned().map(Value::from).collect())
}

/// A positive-or-zero count that fits in `u32`.
fn count(doc: &Document<'_>, field: &'static str) -> Result<Option<u32>> {
    let Some(value) = doc.value(field) else {
        return Ok(None);
    };
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| Error::invalid(doc.id(), field, format!("{} is not a valid count", render(value))))
}

fn render(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        other => format!("{other:?}"),
    }
}

/// Durations: integers are seconds, strings go through [`parse_duration`].
fn seconds(doc: &Document<'_>, field: &'static str) -> Result<Option<u64>> {
    match doc.value(field) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(parse_duration(text)?)),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| Error::invalid(doc.id(), field, format!("{n} is not a valid duration"))),
        Some(_) => Err(Error::invalid(doc.id(), field, "expected a duration")),
    }
}

/// Sizes: numbers are bytes, strings go through [`parse_size`]; result in gigabytes.
fn size_in_gigabytes(doc: &Document<'_>, field: &'static str) -> Result<Option<f64>> {
    let bytes = match doc.value(field) {
        None => return Ok(None),
        Some(Value::String(text)) => parse_size(text)?,
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|bytes| *bytes >= 0.0)
            .ok_or_else(|| Error::invalid(doc.id(), field, format!("{n} is not a valid size")))?,
        Some(_) => return Err(Error::invalid(doc.id(), field, "expected a size")),
    };
    Ok(Some(bytes / GIGABYTE))
}

/// Parse a schedule start instant; timestamps without an offset are UTC.
pub(crate) fn parse_schedule_start(pool_id: &str, text: &str) -> Result<DateTime<FixedOffset>> {
    let text = text.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant);
    }
    if let Ok(instant) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(instant);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc().fixed_offset());
    }
    Err(Error::invalid(
        pool_id,
        "schedule_start",
        format!("{text:?} is not an ISO 8601 timestamp"),
    ))
}
