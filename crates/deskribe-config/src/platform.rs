//! Platform-team configuration types.
//!
//! The platform base document sets organisation-wide defaults, routes each
//! resource type to a backend, and declares policy. A per-environment
//! overlay may patch the defaults and re-route backends; overlay fields are
//! explicit options so "unset" never collides with "set to the default".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Serialisation convention for workload secrets handed to the runtime.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum SecretsStrategy {
    /// Plain opaque secrets managed by the runtime itself.
    #[default]
    Opaque,
    /// Secrets synchronised from an external store.
    ExternalSecrets,
    /// Secrets sealed for at-rest storage in source control.
    SealedSecrets,
}

/// The platform team's base configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    /// Owning organisation, for display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Organisation-wide workload defaults.
    pub defaults: PlatformDefaults,
    /// Backend routing: resource type tag to backend adapter name.
    #[serde(default)]
    pub backends: BTreeMap<String, String>,
    /// Policy knobs enforced before planning.
    #[serde(default)]
    pub policies: PlatformPolicies,
}

/// Organisation-wide workload defaults.
///
/// These are the bottom layer of the merge: an environment overlay patch and
/// the developer's per-environment override are applied on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformDefaults {
    /// Runtime adapter name used to deploy workloads.
    pub runtime: String,
    /// Deployment region.
    pub region: String,
    /// Default replica count.
    pub replicas: u32,
    /// Default CPU request.
    pub cpu: String,
    /// Default memory request.
    pub memory: String,
    /// Namespace template with `{app}` and `{env}` placeholders.
    pub namespace_pattern: String,
    /// Whether workloads default to highly-available deployments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ha: Option<bool>,
    /// Secrets serialisation convention.
    #[serde(default)]
    pub secrets_strategy: SecretsStrategy,
    /// External secrets store name; required when the strategy is
    /// `external-secrets`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_secrets_store: Option<String>,
}

/// Policy knobs the validator enforces on the merged configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformPolicies {
    /// Regions workloads may deploy into. Empty means unrestricted.
    #[serde(default)]
    pub allowed_regions: Vec<String>,
    /// Whether transport security is mandated for provisioned resources.
    /// The core carries this through to providers; it defines no
    /// TLS-bearing fields of its own to check.
    #[serde(default)]
    pub enforce_tls: bool,
}

/// A per-environment overlay on the platform configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    /// Environment name; must equal the environment the command targets.
    pub name: String,
    /// Partial patch over [`PlatformDefaults`].
    #[serde(default)]
    pub defaults: EnvironmentDefaults,
    /// Alert routing: severity to notification sinks.
    #[serde(default)]
    pub alert_routing: BTreeMap<String, Vec<String>>,
    /// Backend re-routing; wins over the platform mapping per key.
    #[serde(default)]
    pub backends: BTreeMap<String, String>,
}

impl EnvironmentConfig {
    /// Builds the default overlay used when no overlay file exists.
    #[must_use]
    pub fn named(environment: impl Into<String>) -> Self {
        Self {
            name: environment.into(),
            defaults: EnvironmentDefaults::default(),
            alert_routing: BTreeMap::new(),
            backends: BTreeMap::new(),
        }
    }
}

/// Partial patch over [`PlatformDefaults`] carried by an environment
/// overlay.
///
/// Every field is optional and "present wins": a set field replaces the
/// platform value even when the two are equal. The runtime name and the
/// namespace template stay platform-owned and cannot be patched here, which
/// keeps namespace derivation and runtime resolution stable across
/// environments.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentDefaults {
    /// Deployment region for this environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Replica count for this environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
    /// CPU request for this environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    /// Memory request for this environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    /// High-availability flag for this environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ha: Option<bool>,
    /// Secrets strategy for this environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets_strategy: Option<SecretsStrategy>,
    /// External secrets store for this environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_secrets_store: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::opaque("opaque", SecretsStrategy::Opaque)]
    #[case::external("external-secrets", SecretsStrategy::ExternalSecrets)]
    #[case::sealed("sealed-secrets", SecretsStrategy::SealedSecrets)]
    #[case::mixed_case("External-Secrets", SecretsStrategy::ExternalSecrets)]
    fn secrets_strategy_parses(#[case] input: &str, #[case] expected: SecretsStrategy) {
        assert_eq!(
            SecretsStrategy::from_str(input).expect("parse strategy"),
            expected
        );
    }

    #[test]
    fn secrets_strategy_defaults_to_opaque() {
        let json = r#"{
            "runtime": "kubernetes",
            "region": "eu-west-1",
            "replicas": 2,
            "cpu": "250m",
            "memory": "512Mi",
            "namespacePattern": "{app}-{env}"
        }"#;
        let defaults: PlatformDefaults = serde_json::from_str(json).expect("parse defaults");
        assert_eq!(defaults.secrets_strategy, SecretsStrategy::Opaque);
        assert!(defaults.external_secrets_store.is_none());
    }

    #[test]
    fn overlay_fields_stay_unset_when_absent() {
        let json = r#"{"name": "dev"}"#;
        let overlay: EnvironmentConfig = serde_json::from_str(json).expect("parse overlay");
        assert_eq!(overlay, EnvironmentConfig::named("dev"));
        assert!(overlay.defaults.replicas.is_none());
        assert!(overlay.backends.is_empty());
    }

    #[test]
    fn overlay_round_trips_through_json() {
        let mut overlay = EnvironmentConfig::named("prod");
        overlay.defaults.replicas = Some(3);
        overlay.defaults.ha = Some(true);
        overlay
            .backends
            .insert("postgres".into(), "helm".into());
        let json = serde_json::to_string(&overlay).expect("serialise overlay");
        let reloaded: EnvironmentConfig = serde_json::from_str(&json).expect("reload overlay");
        assert_eq!(reloaded, overlay);
    }
}
