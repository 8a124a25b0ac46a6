//! Typed data model and loaders for Deskribe input documents.
//!
//! The `deskribe-config` crate owns the three on-disk documents the
//! orchestrator consumes: the developer-authored **manifest**, the platform
//! team's **base configuration**, and the optional per-environment
//! **overlay**. Loading produces plain immutable value records; nothing in
//! this crate writes to disk or mutates its inputs.
//!
//! Resources in the manifest are a tagged union dispatched on their `type`
//! property. Unknown tags fail loading with a distinguished
//! [`ConfigError::UnknownResourceType`] carrying the offending string and its
//! source location, so a typo in a manifest is reported rather than silently
//! dropped.

pub mod error;
pub mod loader;
pub mod manifest;
pub mod platform;

pub use self::error::ConfigError;
pub use self::loader::{load_environment, load_manifest, load_platform, LoadedEnvironment};
pub use self::manifest::{
    KafkaMessagingResource, KafkaTopic, Manifest, PostgresResource, RedisResource, Resource,
    Service, ServiceOverride,
};
pub use self::platform::{
    EnvironmentConfig, EnvironmentDefaults, PlatformConfig, PlatformDefaults, PlatformPolicies,
    SecretsStrategy,
};
