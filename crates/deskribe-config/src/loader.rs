//! JSON loaders for the three Deskribe input documents.
//!
//! The loader reads the manifest from an arbitrary path and the platform
//! documents from a directory: `<platform>/base.json` plus the optional
//! `<platform>/envs/<env>.json` overlay. A missing overlay is not an error;
//! loading falls back to a default overlay carrying only the environment
//! name and flags the absence so callers can surface a warning.
//!
//! Manifest resources are decoded by inspecting each object's `type` tag and
//! dispatching to the concrete variant. Property names match
//! case-insensitively and unknown properties are ignored; unknown tags fail
//! with [`ConfigError::UnknownResourceType`].

use std::fs;
use std::io;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::ConfigError;
use crate::manifest::{
    KafkaMessagingResource, KafkaTopic, Manifest, PostgresResource, RedisResource, Resource,
};
use crate::platform::{EnvironmentConfig, PlatformConfig};

/// Tracing target for loader operations.
const LOADER_TARGET: &str = "deskribe_config::loader";

/// Result of loading an environment overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedEnvironment {
    /// The overlay, defaulted when no file exists.
    pub config: EnvironmentConfig,
    /// Whether the overlay file was absent and the default was used.
    pub overlay_missing: bool,
}

/// Loads and decodes a developer manifest.
///
/// # Errors
///
/// Returns [`ConfigError::Missing`] when the file does not exist,
/// [`ConfigError::Parse`] for malformed JSON, [`ConfigError::Schema`] for
/// shape violations (including duplicate resource types), and
/// [`ConfigError::UnknownResourceType`] for unrecognised resource tags.
pub fn load_manifest(path: &Path) -> Result<Manifest, ConfigError> {
    let value = read_required(path)?;
    decode_manifest(&value, path)
}

/// Loads the platform base configuration from `<platform_dir>/base.json`.
///
/// # Errors
///
/// Returns [`ConfigError::Missing`] when the file does not exist,
/// [`ConfigError::Parse`] for malformed JSON, and [`ConfigError::Schema`]
/// when the document does not match [`PlatformConfig`].
pub fn load_platform(platform_dir: &Path) -> Result<PlatformConfig, ConfigError> {
    let path = platform_dir.join("base.json");
    let value = read_required(&path)?;
    serde_json::from_value(value)
        .map_err(|source| ConfigError::schema(&path, source.to_string()))
}

/// Loads the environment overlay from `<platform_dir>/envs/<env>.json`.
///
/// A missing overlay file produces a default overlay named after the
/// requested environment; a present overlay whose `name` differs from the
/// requested environment is rejected.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for malformed JSON and
/// [`ConfigError::Schema`] for shape violations or a mismatched `name`.
pub fn load_environment(
    platform_dir: &Path,
    environment: &str,
) -> Result<LoadedEnvironment, ConfigError> {
    let path = platform_dir.join("envs").join(format!("{environment}.json"));
    let Some(value) = read_optional(&path)? else {
        warn!(
            target: LOADER_TARGET,
            environment,
            path = %path.display(),
            "environment overlay not found, using platform defaults"
        );
        return Ok(LoadedEnvironment {
            config: EnvironmentConfig::named(environment),
            overlay_missing: true,
        });
    };

    let config: EnvironmentConfig = serde_json::from_value(value)
        .map_err(|source| ConfigError::schema(&path, source.to_string()))?;
    if config.name != environment {
        return Err(ConfigError::schema(
            &path,
            format!(
                "overlay is named '{}' but the command targets environment '{environment}'",
                config.name
            ),
        ));
    }
    Ok(LoadedEnvironment {
        config,
        overlay_missing: false,
    })
}

fn read_required(path: &Path) -> Result<Value, ConfigError> {
    read_optional(path)?.ok_or_else(|| ConfigError::Missing {
        path: path.to_path_buf(),
    })
}

fn read_optional(path: &Path) -> Result<Option<Value>, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

fn decode_manifest(value: &Value, path: &Path) -> Result<Manifest, ConfigError> {
    let object = value
        .as_object()
        .ok_or_else(|| ConfigError::schema(path, "manifest must be a JSON object"))?;

    let name = object
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ConfigError::schema(path, "manifest is missing its 'name'"))?
        .to_owned();
    let raw_resources = object
        .get("resources")
        .and_then(Value::as_array)
        .ok_or_else(|| ConfigError::schema(path, "manifest is missing its 'resources' array"))?;
    let raw_services = object
        .get("services")
        .cloned()
        .filter(|value| value.is_array())
        .ok_or_else(|| ConfigError::schema(path, "manifest is missing its 'services' array"))?;

    let mut resources = Vec::with_capacity(raw_resources.len());
    for (index, raw) in raw_resources.iter().enumerate() {
        let resource = decode_resource(raw, path, index)?;
        if resources
            .iter()
            .any(|existing: &Resource| existing.resource_type() == resource.resource_type())
        {
            return Err(ConfigError::schema(
                path,
                format!(
                    "resource type '{}' is declared more than once",
                    resource.resource_type()
                ),
            ));
        }
        resources.push(resource);
    }

    let services = serde_json::from_value(raw_services)
        .map_err(|source| ConfigError::schema(path, source.to_string()))?;

    Ok(Manifest {
        name,
        resources,
        services,
    })
}

/// Dispatches a raw resource object to its concrete variant by `type` tag.
fn decode_resource(value: &Value, path: &Path, index: usize) -> Result<Resource, ConfigError> {
    let object = value
        .as_object()
        .ok_or_else(|| ConfigError::schema(path, format!("resource {index} must be an object")))?;
    let tag = get_ci(object, "type")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ConfigError::schema(path, format!("resource {index} is missing its 'type' tag"))
        })?;

    match tag {
        "postgres" => Ok(Resource::Postgres(PostgresResource {
            version: opt_string(object, "version", path, index)?,
            ha: opt_bool(object, "ha", path, index)?,
            sku: opt_string(object, "sku", path, index)?,
            size: opt_string(object, "size", path, index)?,
        })),
        "redis" => Ok(Resource::Redis(RedisResource {
            version: opt_string(object, "version", path, index)?,
            ha: opt_bool(object, "ha", path, index)?,
            max_memory_mb: opt_u32(object, "maxMemoryMb", path, index)?,
            size: opt_string(object, "size", path, index)?,
        })),
        "kafka.messaging" => Ok(Resource::KafkaMessaging(KafkaMessagingResource {
            topics: decode_topics(object, path, index)?,
            size: opt_string(object, "size", path, index)?,
        })),
        other => Err(ConfigError::UnknownResourceType {
            resource_type: other.to_owned(),
            path: path.to_path_buf(),
            index,
        }),
    }
}

fn decode_topics(
    object: &Map<String, Value>,
    path: &Path,
    index: usize,
) -> Result<Vec<KafkaTopic>, ConfigError> {
    let Some(raw) = get_ci(object, "topics").filter(|value| !value.is_null()) else {
        return Ok(Vec::new());
    };
    let entries = raw.as_array().ok_or_else(|| {
        ConfigError::schema(path, format!("resource {index}: 'topics' must be an array"))
    })?;
    entries
        .iter()
        .map(|entry| decode_topic(entry, path, index))
        .collect()
}

fn decode_topic(value: &Value, path: &Path, index: usize) -> Result<KafkaTopic, ConfigError> {
    let object = value.as_object().ok_or_else(|| {
        ConfigError::schema(path, format!("resource {index}: each topic must be an object"))
    })?;
    let name = get_ci(object, "name")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ConfigError::schema(path, format!("resource {index}: topic is missing its 'name'"))
        })?
        .to_owned();
    Ok(KafkaTopic {
        name,
        partitions: opt_u32(object, "partitions", path, index)?,
        retention_hours: opt_u32(object, "retentionHours", path, index)?,
        owners: string_list(object, "owners", path, index)?,
        consumers: string_list(object, "consumers", path, index)?,
    })
}

/// Case-insensitive property lookup. The first matching key wins.
fn get_ci<'v>(object: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    object
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
        .map(|(_, value)| value)
}

fn opt_string(
    object: &Map<String, Value>,
    key: &str,
    path: &Path,
    index: usize,
) -> Result<Option<String>, ConfigError> {
    match get_ci(object, key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(type_mismatch(path, index, key, "a string")),
    }
}

fn opt_bool(
    object: &Map<String, Value>,
    key: &str,
    path: &Path,
    index: usize,
) -> Result<Option<bool>, ConfigError> {
    match get_ci(object, key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(_) => Err(type_mismatch(path, index, key, "a boolean")),
    }
}

fn opt_u32(
    object: &Map<String, Value>,
    key: &str,
    path: &Path,
    index: usize,
) -> Result<Option<u32>, ConfigError> {
    match get_ci(object, key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|number| u32::try_from(number).ok())
            .map(Some)
            .ok_or_else(|| type_mismatch(path, index, key, "a non-negative integer")),
    }
}

fn string_list(
    object: &Map<String, Value>,
    key: &str,
    path: &Path,
    index: usize,
) -> Result<Vec<String>, ConfigError> {
    let Some(raw) = get_ci(object, key).filter(|value| !value.is_null()) else {
        return Ok(Vec::new());
    };
    raw.as_array()
        .and_then(|entries| {
            entries
                .iter()
                .map(|entry| entry.as_str().map(str::to_owned))
                .collect::<Option<Vec<String>>>()
        })
        .ok_or_else(|| type_mismatch(path, index, key, "an array of strings"))
}

fn type_mismatch(path: &Path, index: usize, key: &str, expected: &str) -> ConfigError {
    ConfigError::schema(
        path,
        format!("resource {index}: '{key}' must be {expected}"),
    )
}
