//! Value records exchanged across the adapter boundary.
//!
//! Every record here is an immutable value: the engine and adapters
//! communicate by constructing new records, never by mutating shared state.
//! Records serialise with camelCase keys so plans render as the same JSON
//! dialect the input documents use.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use deskribe_config::SecretsStrategy;

/// Action a provider plans for a resource.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PlanAction {
    /// The resource does not exist yet and will be created.
    Create,
    /// The resource exists and will be reconfigured.
    Update,
    /// The resource already matches the declaration.
    NoChange,
}

/// A provider's plan for a single declared resource.
///
/// `planned_outputs` names the output properties the backend is expected to
/// produce, with placeholder values; `configuration` carries
/// provider-specific settings the backend adapter interprets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePlanResult {
    /// Resource type tag this plan belongs to.
    pub resource_type: String,
    /// Planned action.
    pub action: PlanAction,
    /// Expected output properties with placeholder values.
    #[serde(default)]
    pub planned_outputs: BTreeMap<String, String>,
    /// Provider-specific configuration for the backend.
    #[serde(default)]
    pub configuration: BTreeMap<String, serde_json::Value>,
}

impl ResourcePlanResult {
    /// Creates a plan with no outputs or configuration.
    #[must_use]
    pub fn new(resource_type: impl Into<String>, action: PlanAction) -> Self {
        Self {
            resource_type: resource_type.into(),
            action,
            planned_outputs: BTreeMap::new(),
            configuration: BTreeMap::new(),
        }
    }

    /// Adds an expected output property.
    #[must_use]
    pub fn with_planned_output(
        mut self,
        property: impl Into<String>,
        placeholder: impl Into<String>,
    ) -> Self {
        self.planned_outputs
            .insert(property.into(), placeholder.into());
        self
    }

    /// Adds a provider-specific configuration entry.
    #[must_use]
    pub fn with_configuration(
        mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        self.configuration.insert(key.into(), value);
        self
    }

    /// Merges another plan's outputs and configuration into this one.
    ///
    /// Used when a messaging provider contributes entries on top of the
    /// resource provider's plan; the other plan wins on key conflicts.
    #[must_use]
    pub fn merged_with(mut self, other: Self) -> Self {
        self.planned_outputs.extend(other.planned_outputs);
        self.configuration.extend(other.configuration);
        self
    }
}

/// Result of a backend adapter applying one resource plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendApplyResult {
    success: bool,
    /// Resolved outputs keyed by resource type, then property.
    #[serde(default)]
    resource_outputs: BTreeMap<String, BTreeMap<String, String>>,
    /// Failure descriptions when `success` is false.
    #[serde(default)]
    errors: Vec<String>,
}

impl BackendApplyResult {
    /// Creates a successful result carrying the given outputs.
    #[must_use]
    pub fn success(resource_outputs: BTreeMap<String, BTreeMap<String, String>>) -> Self {
        Self {
            success: true,
            resource_outputs,
            errors: Vec::new(),
        }
    }

    /// Creates a failed result with failure descriptions.
    #[must_use]
    pub fn failure(errors: Vec<String>) -> Self {
        Self {
            success: false,
            resource_outputs: BTreeMap::new(),
            errors,
        }
    }

    /// Returns whether the backend completed successfully.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the resolved outputs.
    #[must_use]
    pub const fn resource_outputs(&self) -> &BTreeMap<String, BTreeMap<String, String>> {
        &self.resource_outputs
    }

    /// Consumes the result, returning the resolved outputs.
    #[must_use]
    pub fn into_resource_outputs(self) -> BTreeMap<String, BTreeMap<String, String>> {
        self.resource_outputs
    }

    /// Returns the failure descriptions.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// The merged, environment-specialised description of how a service runs.
///
/// Produced by the merge engine; `environment_variables` may still contain
/// unresolved reference expressions until the apply phase substitutes
/// backend outputs. The namespace is always derived from the platform's
/// template and is never supplied directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadPlan {
    /// Application name from the manifest.
    pub app_name: String,
    /// Target environment name.
    pub environment: String,
    /// Namespace expanded from the platform template.
    pub namespace: String,
    /// Container image selected for the workload, when one was provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Replica count after the layered merge.
    pub replicas: u32,
    /// CPU request after the layered merge.
    pub cpu: String,
    /// Memory request after the layered merge.
    pub memory: String,
    /// Whether the workload runs highly available.
    #[serde(default)]
    pub ha: bool,
    /// Environment variables; values may embed reference expressions.
    #[serde(default)]
    pub environment_variables: BTreeMap<String, String>,
    /// Secrets serialisation convention handed to the runtime.
    pub secrets_strategy: SecretsStrategy,
    /// External secrets store, when the strategy requires one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_secrets_store: Option<String>,
}

impl WorkloadPlan {
    /// Returns a copy of the plan with its environment map replaced.
    ///
    /// Used after reference resolution; the original plan is left
    /// untouched.
    #[must_use]
    pub fn with_environment_variables(
        &self,
        environment_variables: BTreeMap<String, String>,
    ) -> Self {
        Self {
            environment_variables,
            ..self.clone()
        }
    }
}

/// A rendered, deployable artefact description from a runtime adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadManifest {
    /// Namespace the workload deploys into.
    pub namespace: String,
    /// Opaque serialised payload in the runtime's own dialect.
    pub yaml: String,
    /// Human-readable identifiers of the rendered objects.
    #[serde(default)]
    pub resource_names: Vec<String>,
}

/// Aggregate outcome of a validation pass.
///
/// Findings accumulate instead of short-circuiting so one run surfaces the
/// full set; a report is valid while it carries no errors.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Fatal findings; any entry gates planning.
    pub errors: Vec<String>,
    /// Non-fatal findings.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Creates an empty (valid) report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a report carrying a single error.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            warnings: Vec::new(),
        }
    }

    /// Returns whether the report carries no errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records an error.
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Records a warning.
    pub fn push_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Absorbs another report's findings.
    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Drops exact duplicate findings, keeping first occurrences.
    ///
    /// The reference cross-check runs both in the policy validator and in
    /// the engine, so identical findings can arrive twice.
    pub fn dedupe(&mut self) {
        dedupe_in_place(&mut self.errors);
        dedupe_in_place(&mut self.warnings);
    }
}

fn dedupe_in_place(messages: &mut Vec<String>) {
    let mut seen = std::collections::BTreeSet::new();
    messages.retain(|message| seen.insert(message.clone()));
}
