//! Layered workload merge.
//!
//! The merge computes the final workload configuration from three layers:
//! platform defaults at the bottom, the environment overlay patch in the
//! middle, and the first service's per-environment override on top.
//! Presence is the only signal — a layer wins by setting a field, even to
//! the same value the layer below carries. The runtime name and namespace
//! template are platform-owned and never overridden.

use std::collections::BTreeMap;

use deskribe_adapters::WorkloadPlan;
use deskribe_config::{EnvironmentConfig, Manifest, PlatformConfig};

/// Service name used to match image overrides when the service is unnamed.
const DEFAULT_SERVICE_NAME: &str = "api";

/// Result of merging a manifest against the platform layers.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// The merged workload, absent when the manifest declares no services.
    pub workload: Option<WorkloadPlan>,
    /// Non-fatal findings raised during the merge.
    pub warnings: Vec<String>,
}

/// Expands a namespace template by substituting `{app}` and `{env}`.
///
/// No other placeholder is recognised; unknown text passes through
/// literally.
#[must_use]
pub fn expand_namespace(pattern: &str, app: &str, environment: &str) -> String {
    pattern.replace("{app}", app).replace("{env}", environment)
}

/// Computes the merged [`WorkloadPlan`] for the manifest's first service.
///
/// `images` maps service names to container image references supplied by
/// the caller; an unnamed service matches the literal `api`. The returned
/// plan still carries unresolved reference expressions in its environment
/// map; resolution happens during apply.
#[must_use]
pub fn merge_workload(
    manifest: &Manifest,
    platform: &PlatformConfig,
    env_config: &EnvironmentConfig,
    environment: &str,
    images: &BTreeMap<String, String>,
) -> MergeOutcome {
    let mut warnings = Vec::new();
    if manifest.services.len() > 1 {
        warnings.push(format!(
            "manifest declares {} services; only the first is deployed",
            manifest.services.len()
        ));
    }
    let Some(service) = manifest.primary_service() else {
        warnings.push(String::from(
            "manifest declares no services; workload merge skipped",
        ));
        return MergeOutcome {
            workload: None,
            warnings,
        };
    };

    let defaults = &platform.defaults;
    let overlay = &env_config.defaults;

    // Platform first, then overlay where present.
    let mut replicas = overlay.replicas.unwrap_or(defaults.replicas);
    let mut cpu = overlay.cpu.clone().unwrap_or_else(|| defaults.cpu.clone());
    let mut memory = overlay
        .memory
        .clone()
        .unwrap_or_else(|| defaults.memory.clone());
    let ha = overlay.ha.or(defaults.ha).unwrap_or(false);
    let secrets_strategy = overlay
        .secrets_strategy
        .unwrap_or(defaults.secrets_strategy);
    let external_secrets_store = overlay
        .external_secrets_store
        .clone()
        .or_else(|| defaults.external_secrets_store.clone());

    // Developer override wins last, field by field.
    if let Some(developer) = service.overrides.get(environment) {
        if let Some(value) = developer.replicas {
            replicas = value;
        }
        if let Some(value) = &developer.cpu {
            cpu = value.clone();
        }
        if let Some(value) = &developer.memory {
            memory = value.clone();
        }
    }

    let service_name = service.name.as_deref().unwrap_or(DEFAULT_SERVICE_NAME);
    let workload = WorkloadPlan {
        app_name: manifest.name.clone(),
        environment: environment.to_owned(),
        namespace: expand_namespace(&defaults.namespace_pattern, &manifest.name, environment),
        image: images.get(service_name).cloned(),
        replicas,
        cpu,
        memory,
        ha,
        environment_variables: service.env.clone(),
        secrets_strategy,
        external_secrets_store,
    };

    MergeOutcome {
        workload: Some(workload),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use deskribe_config::{
        EnvironmentDefaults, PlatformDefaults, PlatformPolicies, SecretsStrategy, Service,
        ServiceOverride,
    };

    use super::*;

    fn platform() -> PlatformConfig {
        PlatformConfig {
            organization: None,
            defaults: PlatformDefaults {
                runtime: "kubernetes".into(),
                region: "eu-west-1".into(),
                replicas: 2,
                cpu: "250m".into(),
                memory: "512Mi".into(),
                namespace_pattern: "{app}-{env}".into(),
                ha: None,
                secrets_strategy: SecretsStrategy::Opaque,
                external_secrets_store: None,
            },
            backends: BTreeMap::new(),
            policies: PlatformPolicies::default(),
        }
    }

    fn manifest_with(services: Vec<Service>) -> Manifest {
        Manifest {
            name: "svc".into(),
            resources: Vec::new(),
            services,
        }
    }

    fn service_with_override(environment: &str, replicas: Option<u32>) -> Service {
        Service {
            name: None,
            env: BTreeMap::new(),
            overrides: [(
                environment.to_owned(),
                ServiceOverride {
                    replicas,
                    cpu: None,
                    memory: None,
                },
            )]
            .into(),
        }
    }

    #[rstest]
    #[case::app_and_env("{app}-{env}", "svc-dev")]
    #[case::nested("team/{app}/{env}", "team/svc/dev")]
    #[case::no_placeholders("static", "static")]
    fn expands_namespace_placeholders(#[case] pattern: &str, #[case] expected: &str) {
        assert_eq!(expand_namespace(pattern, "svc", "dev"), expected);
    }

    #[test]
    fn platform_defaults_flow_through_unmodified() {
        let manifest = manifest_with(vec![Service::default()]);
        let outcome =
            merge_workload(&manifest, &platform(), &EnvironmentConfig::named("dev"), "dev", &BTreeMap::new());
        let workload = outcome.workload.expect("merged workload");
        assert_eq!(workload.namespace, "svc-dev");
        assert_eq!(workload.replicas, 2);
        assert_eq!(workload.cpu, "250m");
        assert_eq!(workload.memory, "512Mi");
        assert!(!workload.ha);
        assert_eq!(workload.secrets_strategy, SecretsStrategy::Opaque);
    }

    #[test]
    fn developer_override_beats_overlay_and_platform() {
        // Developer sets replicas and cpu; overlay sets replicas, memory
        // and ha. Developer wins where set, overlay where not, platform
        // last.
        let mut service = service_with_override("prod", Some(5));
        service
            .overrides
            .get_mut("prod")
            .expect("override present")
            .cpu = Some("500m".into());
        let manifest = manifest_with(vec![service]);

        let mut overlay = EnvironmentConfig::named("prod");
        overlay.defaults = EnvironmentDefaults {
            replicas: Some(3),
            memory: Some("1Gi".into()),
            ha: Some(true),
            ..EnvironmentDefaults::default()
        };

        let outcome = merge_workload(&manifest, &platform(), &overlay, "prod", &BTreeMap::new());
        let workload = outcome.workload.expect("merged workload");
        assert_eq!(workload.replicas, 5);
        assert_eq!(workload.cpu, "500m");
        assert_eq!(workload.memory, "1Gi");
        assert!(workload.ha);
    }

    #[test]
    fn overlay_value_equal_to_platform_still_counts_as_set() {
        let manifest = manifest_with(vec![Service::default()]);
        let mut overlay = EnvironmentConfig::named("dev");
        // Identical to the platform default; presence must still win.
        overlay.defaults.cpu = Some("250m".into());
        let outcome = merge_workload(&manifest, &platform(), &overlay, "dev", &BTreeMap::new());
        assert_eq!(outcome.workload.expect("merged workload").cpu, "250m");
    }

    #[test]
    fn override_for_another_environment_is_ignored() {
        let manifest = manifest_with(vec![service_with_override("prod", Some(5))]);
        let outcome = merge_workload(
            &manifest,
            &platform(),
            &EnvironmentConfig::named("dev"),
            "dev",
            &BTreeMap::new(),
        );
        assert_eq!(outcome.workload.expect("merged workload").replicas, 2);
    }

    #[test]
    fn unnamed_service_matches_the_api_image() {
        let manifest = manifest_with(vec![Service::default()]);
        let images = [("api".to_owned(), "registry/svc:1.2.3".to_owned())].into();
        let outcome = merge_workload(
            &manifest,
            &platform(),
            &EnvironmentConfig::named("dev"),
            "dev",
            &images,
        );
        assert_eq!(
            outcome.workload.expect("merged workload").image.as_deref(),
            Some("registry/svc:1.2.3")
        );
    }

    #[test]
    fn named_service_matches_its_own_image() {
        let manifest = manifest_with(vec![Service {
            name: Some("worker".into()),
            ..Service::default()
        }]);
        let images = [
            ("api".to_owned(), "registry/api:1".to_owned()),
            ("worker".to_owned(), "registry/worker:1".to_owned()),
        ]
        .into();
        let outcome = merge_workload(
            &manifest,
            &platform(),
            &EnvironmentConfig::named("dev"),
            "dev",
            &images,
        );
        assert_eq!(
            outcome.workload.expect("merged workload").image.as_deref(),
            Some("registry/worker:1")
        );
    }

    #[test]
    fn missing_services_yield_no_workload() {
        let manifest = manifest_with(Vec::new());
        let outcome = merge_workload(
            &manifest,
            &platform(),
            &EnvironmentConfig::named("dev"),
            "dev",
            &BTreeMap::new(),
        );
        assert!(outcome.workload.is_none());
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn extra_services_raise_a_warning() {
        let manifest = manifest_with(vec![Service::default(), Service::default()]);
        let outcome = merge_workload(
            &manifest,
            &platform(),
            &EnvironmentConfig::named("dev"),
            "dev",
            &BTreeMap::new(),
        );
        assert!(outcome.workload.is_some());
        assert!(outcome.warnings[0].contains("only the first"));
    }

    #[test]
    fn external_secrets_settings_propagate() {
        let mut config = platform();
        config.defaults.secrets_strategy = SecretsStrategy::ExternalSecrets;
        config.defaults.external_secrets_store = Some("kv-prod".into());
        let manifest = manifest_with(vec![Service::default()]);
        let outcome = merge_workload(
            &manifest,
            &config,
            &EnvironmentConfig::named("prod"),
            "prod",
            &BTreeMap::new(),
        );
        let workload = outcome.workload.expect("merged workload");
        assert_eq!(workload.secrets_strategy, SecretsStrategy::ExternalSecrets);
        assert_eq!(workload.external_secrets_store.as_deref(), Some("kv-prod"));
    }
}
