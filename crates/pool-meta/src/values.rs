//! Structured field values: containers, artifacts and macros
//!
//! Each decoder checks the nested shape of one field and returns the typed
//! value, failing with a schema error that names the offending key.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::schema::type_name;
use crate::{Error, Result};

/// Image a pool's tasks run in.
///
/// Either a plain image reference or one of the tagged forms accepted by
/// the worker payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Container {
    Image(String),
    Tagged(TaggedContainer),
}

/// Container forms discriminated by their `type` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TaggedContainer {
    DockerImage {
        name: String,
    },
    IndexedImage {
        path: String,
        namespace: String,
    },
    TaskImage {
        path: String,
        #[serde(rename = "taskId")]
        task_id: String,
    },
}

impl TaggedContainer {
    fn required_keys(kind: &str) -> Option<&'static [&'static str]> {
        match kind {
            "docker-image" => Some(&["type", "name"]),
            "indexed-image" => Some(&["type", "path", "namespace"]),
            "task-image" => Some(&["type", "path", "taskId"]),
            _ => None,
        }
    }
}

/// Where a fetched artifact ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    File,
    Directory,
}

/// A task artifact mounted at a local path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
}

/// Decode a `container` value.
pub fn decode_container(document: &str, value: &Value) -> Result<Container> {
    let map = match value {
        Value::String(image) => return Ok(Container::Image(image.clone())),
        Value::Mapping(map) => map,
        other => {
            return Err(Error::schema(
                document,
                format!(
                    "expected 'container' to be 'string' or 'mapping', got '{}'",
                    type_name(other)
                ),
            ));
        }
    };

    let kind = match map.get("type") {
        Some(Value::String(kind)) => kind.as_str(),
        Some(other) => {
            return Err(Error::schema(
                document,
                format!("unexpected type for 'container.type': {}", type_name(other)),
            ));
        }
        None => {
            return Err(Error::schema(
                document,
                "'container' missing required key: 'type'",
            ));
        }
    };
    let required = TaggedContainer::required_keys(kind).ok_or_else(|| {
        Error::schema(document, format!("unknown 'container.type': {kind}"))
    })?;

    let have = string_keys(document, "container", map)?;
    let required: BTreeSet<&str> = required.iter().copied().collect();
    let missing: Vec<&str> = required.difference(&have).copied().collect();
    if !missing.is_empty() {
        return Err(Error::schema(
            document,
            format!(
                "missing required keys for 'container' with type '{kind}': {}",
                missing.join(", ")
            ),
        ));
    }
    let extra: Vec<&str> = have.difference(&required).copied().collect();
    if !extra.is_empty() {
        return Err(Error::schema(
            document,
            format!(
                "unknown keys for 'container' with type '{kind}': {}",
                extra.join(", ")
            ),
        ));
    }
    for (key, value) in map {
        if !value.is_string() {
            return Err(Error::schema(
                document,
                format!(
                    "unexpected type for 'container.{}': {}",
                    key.as_str().unwrap_or_default(),
                    type_name(value)
                ),
            ));
        }
    }

    let tagged: TaggedContainer = serde_yaml::from_value(value.clone())
        .map_err(|e| Error::schema(document, format!("invalid 'container': {e}")))?;
    Ok(Container::Tagged(tagged))
}

/// Decode the `artifacts` mapping of local path to artifact.
pub fn decode_artifacts(document: &str, value: &Mapping) -> Result<BTreeMap<String, Artifact>> {
    let mut artifacts = BTreeMap::new();
    for (key, entry) in value {
        let Value::String(path) = key else {
            return Err(Error::schema(
                document,
                format!(
                    "expected artifact '{key:?}' name to be 'string', got '{}'",
                    type_name(key)
                ),
            ));
        };
        let Value::Mapping(fields) = entry else {
            return Err(Error::schema(
                document,
                format!(
                    "expected artifact '{path}' value to be 'mapping', got '{}'",
                    type_name(entry)
                ),
            ));
        };
        let keys = string_keys(document, "artifacts", fields)?;
        if keys != BTreeSet::from(["url", "type"]) {
            return Err(Error::schema(
                document,
                format!("expected artifact '{path}' object to contain only keys: url, type"),
            ));
        }
        let url = match fields.get("url") {
            Some(Value::String(url)) => url.clone(),
            other => {
                return Err(Error::schema(
                    document,
                    format!(
                        "expected artifact '{path}' .url to be 'string', got '{}'",
                        other.map_or("null", type_name)
                    ),
                ));
            }
        };
        let kind = match fields.get("type").and_then(Value::as_str) {
            Some("file") => ArtifactKind::File,
            Some("directory") => ArtifactKind::Directory,
            _ => {
                return Err(Error::schema(
                    document,
                    format!("expected artifact '{path}' .type to be one of: file, directory"),
                ));
            }
        };
        artifacts.insert(path.clone(), Artifact { url, kind });
    }
    Ok(artifacts)
}

/// Decode the `macros` mapping; integer values are rendered as strings.
pub fn decode_macros(document: &str, value: &Mapping) -> Result<BTreeMap<String, String>> {
    let mut macros = BTreeMap::new();
    for (key, entry) in value {
        let Value::String(name) = key else {
            return Err(Error::schema(
                document,
                format!(
                    "expected macro '{key:?}' name to be 'string', got '{}'",
                    type_name(key)
                ),
            ));
        };
        let rendered = match entry {
            Value::String(text) => text.clone(),
            Value::Number(number) if number.is_i64() || number.is_u64() => number.to_string(),
            other => {
                return Err(Error::schema(
                    document,
                    format!(
                        "expected macro '{name}' value to be 'integer' or 'string', got '{}'",
                        type_name(other)
                    ),
                ));
            }
        };
        macros.insert(name.clone(), rendered);
    }
    Ok(macros)
}

fn string_keys<'a>(document: &str, field: &str, map: &'a Mapping) -> Result<BTreeSet<&'a str>> {
    map.keys()
        .map(|key| {
            key.as_str().ok_or_else(|| {
                Error::schema(
                    document,
                    format!("expected '{field}' keys to be 'string', got '{}'", type_name(key)),
                )
            })
        })
        .collect()
}
