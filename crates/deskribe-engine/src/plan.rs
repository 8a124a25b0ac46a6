//! Plan and outcome records produced by the engine.

use std::collections::BTreeMap;

use serde::Serialize;

use deskribe_adapters::{ResourcePlanResult, WorkloadManifest, WorkloadPlan};
use deskribe_config::{EnvironmentConfig, PlatformConfig};

/// The engine's complete plan for one application in one environment.
///
/// Resource plans keep the manifest's declared order. The plan is a pure
/// projection of its inputs: planning identical documents with identical
/// images yields an equal plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeskribePlan {
    /// Application name from the manifest.
    pub app_name: String,
    /// Target environment.
    pub environment: String,
    /// The platform base configuration the plan was computed against.
    pub platform: PlatformConfig,
    /// The environment overlay in effect.
    pub environment_config: EnvironmentConfig,
    /// Per-resource plans in declared order.
    pub resource_plans: Vec<ResourcePlanResult>,
    /// The merged workload, absent when the manifest declares no services.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload: Option<WorkloadPlan>,
    /// Non-fatal findings raised while planning.
    pub warnings: Vec<String>,
}

impl DeskribePlan {
    /// Computes the effective backend routing for apply.
    ///
    /// The environment overlay wins over the platform base per resource
    /// type.
    #[must_use]
    pub fn effective_backends(&self) -> BTreeMap<String, String> {
        let mut backends = self.platform.backends.clone();
        backends.extend(
            self.environment_config
                .backends
                .iter()
                .map(|(resource_type, backend)| (resource_type.clone(), backend.clone())),
        );
        backends
    }
}

/// Outcome of a successful apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutcome {
    /// Union of outputs from every backend applied, keyed by resource
    /// type, then property.
    pub resource_outputs: BTreeMap<String, BTreeMap<String, String>>,
    /// The workload with its references resolved, when one was planned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload: Option<WorkloadPlan>,
    /// The rendered runtime manifest, when a runtime deployed the
    /// workload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<WorkloadManifest>,
    /// Non-fatal findings, including unresolved references.
    pub warnings: Vec<String>,
}

/// Outcome of a destroy command.
///
/// Destroy is best-effort, so individual teardown failures surface here as
/// warnings rather than aborting the command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestroyOutcome {
    /// Namespace whose workload was torn down.
    pub namespace: String,
    /// Teardown failures and skipped steps.
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskribe_config::{PlatformDefaults, PlatformPolicies, SecretsStrategy};

    fn plan_with_backends(
        platform_backends: &[(&str, &str)],
        environment_backends: &[(&str, &str)],
    ) -> DeskribePlan {
        let mut environment_config = EnvironmentConfig::named("dev");
        environment_config.backends = environment_backends
            .iter()
            .map(|(resource_type, backend)| {
                ((*resource_type).to_owned(), (*backend).to_owned())
            })
            .collect();
        DeskribePlan {
            app_name: "svc".into(),
            environment: "dev".into(),
            platform: PlatformConfig {
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
                backends: platform_backends
                    .iter()
                    .map(|(resource_type, backend)| {
                        ((*resource_type).to_owned(), (*backend).to_owned())
                    })
                    .collect(),
                policies: PlatformPolicies::default(),
            },
            environment_config,
            resource_plans: Vec::new(),
            workload: None,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn environment_backends_win_per_key() {
        let plan = plan_with_backends(
            &[("postgres", "pulumi"), ("redis", "pulumi")],
            &[("postgres", "helm")],
        );
        let backends = plan.effective_backends();
        assert_eq!(backends["postgres"], "helm");
        assert_eq!(backends["redis"], "pulumi");
    }

    #[test]
    fn platform_backends_apply_when_no_overlay() {
        let plan = plan_with_backends(&[("postgres", "pulumi")], &[]);
        assert_eq!(plan.effective_backends()["postgres"], "pulumi");
    }
}
