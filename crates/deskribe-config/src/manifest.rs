//! Developer-authored manifest types.
//!
//! A [`Manifest`] declares everything a service needs from the platform: the
//! infrastructure resources it depends on and the workload that consumes
//! them. Resources form a tagged union dispatched on their `type` property;
//! the declared order is preserved because planning output is ordered.
//!
//! Deserialisation of resources is hand-rolled in the loader so that
//! property names match case-insensitively and unknown tags produce a
//! distinguished error. Serialisation uses derives, so a manifest written
//! back out as JSON reloads to an equal record.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// The developer's declaration of what a service needs.
///
/// # Example
///
/// ```
/// use deskribe_config::{Manifest, Resource, PostgresResource};
///
/// let manifest = Manifest {
///     name: "checkout".into(),
///     resources: vec![Resource::Postgres(PostgresResource::default())],
///     services: Vec::new(),
/// };
/// assert_eq!(manifest.declared_types(), ["postgres"].into());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Logical application name, used in naming and namespace expansion.
    pub name: String,
    /// Declared infrastructure dependencies, in source order.
    pub resources: Vec<Resource>,
    /// Workload descriptions. The engine consumes only the first service.
    pub services: Vec<Service>,
}

impl Manifest {
    /// Returns the set of declared resource type tags.
    #[must_use]
    pub fn declared_types(&self) -> BTreeSet<&str> {
        self.resources
            .iter()
            .map(Resource::resource_type)
            .collect()
    }

    /// Returns the first declared service, when one exists.
    #[must_use]
    pub fn primary_service(&self) -> Option<&Service> {
        self.services.first()
    }
}

/// A declared infrastructure dependency, dispatched on its `type` tag.
///
/// The set of variants is closed at load time; a manifest carrying any other
/// tag fails to load. Whether a tag can actually be provisioned is decided
/// later, when the registry is consulted for a matching provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Resource {
    /// A PostgreSQL database.
    #[serde(rename = "postgres")]
    Postgres(PostgresResource),
    /// A Redis cache.
    #[serde(rename = "redis")]
    Redis(RedisResource),
    /// A managed Kafka topic set.
    #[serde(rename = "kafka.messaging")]
    KafkaMessaging(KafkaMessagingResource),
}

impl Resource {
    /// Returns the tag this resource is registered and planned under.
    #[must_use]
    pub const fn resource_type(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Redis(_) => "redis",
            Self::KafkaMessaging(_) => "kafka.messaging",
        }
    }

    /// Returns the free-form size tag, when set.
    ///
    /// Sizes are interpreted by the matching provider; the engine only
    /// carries them through.
    #[must_use]
    pub fn size(&self) -> Option<&str> {
        match self {
            Self::Postgres(resource) => resource.size.as_deref(),
            Self::Redis(resource) => resource.size.as_deref(),
            Self::KafkaMessaging(resource) => resource.size.as_deref(),
        }
    }
}

/// Declaration of a PostgreSQL database dependency.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostgresResource {
    /// Requested engine version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Whether a highly-available deployment is requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ha: Option<bool>,
    /// Provider-specific SKU selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Free-form size tag, interpreted by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// Declaration of a Redis cache dependency.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedisResource {
    /// Requested engine version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Whether a highly-available deployment is requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ha: Option<bool>,
    /// Memory ceiling in megabytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_memory_mb: Option<u32>,
    /// Free-form size tag, interpreted by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// Declaration of a Kafka topic set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KafkaMessagingResource {
    /// Topics to provision, in source order.
    #[serde(default)]
    pub topics: Vec<KafkaTopic>,
    /// Free-form size tag, interpreted by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// A single Kafka topic with its access lists.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KafkaTopic {
    /// Topic name.
    pub name: String,
    /// Requested partition count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partitions: Option<u32>,
    /// Retention window in hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_hours: Option<u32>,
    /// Principals allowed to produce.
    #[serde(default)]
    pub owners: Vec<String>,
    /// Principals allowed to consume.
    #[serde(default)]
    pub consumers: Vec<String>,
}

/// A workload description inside the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Logical name, used to match CLI-provided image overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Environment variables; values may embed reference expressions.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Per-environment overrides, keyed by environment name.
    #[serde(default)]
    pub overrides: BTreeMap<String, ServiceOverride>,
}

/// Developer override for a single environment.
///
/// Every field is optional; an absent field defers to the environment
/// overlay and platform defaults. Presence is the only signal — setting a
/// field to the platform's default value still counts as an override.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOverride {
    /// Replica count for the workload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
    /// CPU request, in the runtime's own units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    /// Memory request, in the runtime's own units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}
