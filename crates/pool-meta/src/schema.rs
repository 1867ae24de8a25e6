//! Field tables for pool and map documents
//!
//! A pool document may inherit from `parents`; a map document instead lists
//! the pools it is `apply_to`'d to. Apart from that one field both kinds share
//! the same table of fields and accepted types.
//!
//! ```yaml
//! name: Linux x64 fuzzing
//! parents: [linux-base]
//! cloud: aws
//! cpu: x86_64
//! cores_per_task: 2
//! cycle_time: 2h
//! minimum_memory_per_core: 2g
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde_yaml::{Mapping, Value};

use crate::values::{decode_artifacts, decode_container, decode_macros};
use crate::{Error, Result};

/// Semantic type a field value may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    List,
    Mapping,
}

impl FieldType {
    /// Whether `value` has this type.
    ///
    /// Integers are accepted where a float is expected.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::String, Value::String(_)) => true,
            (FieldType::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (FieldType::Float, Value::Number(_)) => true,
            (FieldType::Boolean, Value::Bool(_)) => true,
            (FieldType::List, Value::Sequence(_)) => true,
            (FieldType::Mapping, Value::Mapping(_)) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::List => "list",
            FieldType::Mapping => "mapping",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the type of a raw value, for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}

/// One entry of a field table.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub types: &'static [FieldType],
}

const fn field(name: &'static str, types: &'static [FieldType]) -> FieldSpec {
    FieldSpec { name, types }
}

use FieldType as T;

/// Fields shared by pool and map documents.
pub const COMMON_FIELDS: &[FieldSpec] = &[
    field("artifacts", &[T::Mapping]),
    field("cloud", &[T::String]),
    field("command", &[T::List]),
    field("container", &[T::String, T::Mapping]),
    field("cores_per_task", &[T::Integer]),
    field("cpu", &[T::String]),
    field("cycle_time", &[T::Integer, T::String]),
    field("disk_size", &[T::Integer, T::String]),
    field("imageset", &[T::String]),
    field("macros", &[T::Mapping]),
    field("max_run_time", &[T::Integer, T::String]),
    field("metal", &[T::Boolean]),
    field("minimum_memory_per_core", &[T::Float, T::String]),
    field("name", &[T::String]),
    field("platform", &[T::String]),
    field("preprocess", &[T::String]),
    field("run_as_admin", &[T::Boolean]),
    field("schedule_start", &[T::String]),
    field("scopes", &[T::List]),
    field("tasks", &[T::Integer]),
];

const POOL_ONLY_FIELDS: &[FieldSpec] = &[field("parents", &[T::List])];
const MAP_ONLY_FIELDS: &[FieldSpec] = &[field("apply_to", &[T::List])];

/// The two document variants and their field tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pool,
    Map,
}

impl DocumentKind {
    /// All fields the variant accepts.
    pub fn fields(self) -> impl Iterator<Item = &'static FieldSpec> {
        let own = match self {
            DocumentKind::Pool => POOL_ONLY_FIELDS,
            DocumentKind::Map => MAP_ONLY_FIELDS,
        };
        COMMON_FIELDS.iter().chain(own.iter())
    }

    /// Fields every document of the variant must declare.
    pub fn required(self) -> &'static [&'static str] {
        match self {
            DocumentKind::Pool => &["name"],
            DocumentKind::Map => &["apply_to", "name"],
        }
    }

    pub fn field(self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().find(|spec| spec.name == name)
    }

    /// Whether a key set fits this variant: nothing unknown, nothing required missing.
    pub fn accepts_keys<'a>(self, keys: impl IntoIterator<Item = &'a str>) -> bool {
        let keys: BTreeSet<&str> = keys.into_iter().collect();
        keys.iter().all(|key| self.field(key).is_some())
            && self.required().iter().all(|req| keys.contains(req))
    }
}

/// A raw document that passed validation against its [`DocumentKind`].
///
/// The typed accessors assume validation already happened: they return
/// `None` for absent or null fields and never fail on type mismatches.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    id: &'a str,
    kind: DocumentKind,
    data: &'a Mapping,
}

impl<'a> Document<'a> {
    /// Validate `data` against the table for `kind`.
    ///
    /// Checks, in order: required fields present, no unknown fields, every
    /// non-null value of an accepted type, list items are strings, and the
    /// nested shapes of `container`, `artifacts` and `macros`.
    pub fn validate(id: &'a str, kind: DocumentKind, data: &'a Mapping) -> Result<Self> {
        let mut keys = BTreeSet::new();
        let mut extra = Vec::new();
        for key in data.keys() {
            match key.as_str() {
                Some(name) if kind.field(name).is_some() => {
                    keys.insert(name);
                }
                Some(name) => extra.push(name.to_string()),
                None => extra.push(format!("{key:?}")),
            }
        }

        let missing: Vec<&str> = kind
            .required()
            .iter()
            .copied()
            .filter(|req| !keys.contains(req))
            .collect();
        if !missing.is_empty() {
            return Err(Error::schema(
                id,
                format!("configuration is missing fields: {missing:?}"),
            ));
        }
        if !extra.is_empty() {
            return Err(Error::schema(
                id,
                format!("configuration has extra fields: {extra:?}"),
            ));
        }

        for spec in kind.fields() {
            let Some(value) = data.get(spec.name) else {
                continue;
            };
            if value.is_null() {
                if kind.required().contains(&spec.name) {
                    return Err(Error::schema(
                        id,
                        format!("'{}' is required for every configuration", spec.name),
                    ));
                }
                continue;
            }
            if !spec.types.iter().any(|ty| ty.matches(value)) {
                let expected: Vec<String> = spec.types.iter().map(|ty| format!("'{ty}'")).collect();
                return Err(Error::schema(
                    id,
                    format!(
                        "expected '{}' to be {}, got '{}'",
                        spec.name,
                        expected.join(" or "),
                        type_name(value)
                    ),
                ));
            }
            if let Value::Sequence(items) = value {
                if let Some(item) = items.iter().find(|item| !item.is_string()) {
                    return Err(Error::schema(
                        id,
                        format!(
                            "expected '{}' items to be 'string', got '{}'",
                            spec.name,
                            type_name(item)
                        ),
                    ));
                }
            }
        }

        let document = Self { id, kind, data };
        if let Some(value) = document.value("container") {
            decode_container(id, value)?;
        }
        if let Some(Value::Mapping(map)) = document.value("artifacts") {
            decode_artifacts(id, map)?;
        }
        if let Some(Value::Mapping(map)) = document.value("macros") {
            decode_macros(id, map)?;
        }
        Ok(document)
    }

    pub fn id(&self) -> &'a str {
        self.id
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn raw(&self) -> &'a Mapping {
        self.data
    }

    /// Non-null value of `field`.
    pub fn value(&self, field: &str) -> Option<&'a Value> {
        self.data.get(field).filter(|value| !value.is_null())
    }

    pub fn str(&self, field: &str) -> Option<&'a str> {
        self.value(field).and_then(Value::as_str)
    }

    /// Signed integer value; `None` as well when it does not fit in `i64`.
    pub fn int(&self, field: &str) -> Option<i64> {
        self.value(field).and_then(Value::as_i64)
    }

    pub fn bool(&self, field: &str) -> Option<bool> {
        self.value(field).and_then(Value::as_bool)
    }

    pub fn strings(&self, field: &str) -> Option<Vec<String>> {
        self.value(field).and_then(Value::as_sequence).map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
    }

    pub fn mapping(&self, field: &str) -> Option<&'a Mapping> {
        self.value(field).and_then(Value::as_mapping)
    }
}
