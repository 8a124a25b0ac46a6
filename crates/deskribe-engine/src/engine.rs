//! The four engine entry points.
//!
//! Every command follows the same state sequence; any step may fail and
//! skip the rest:
//!
//! ```text
//! Loaded -> Merged -> Validated -> Planned -> InfraApplied -> Resolved -> RuntimeApplied
//! ```
//!
//! Within a phase, resources are processed in the manifest's declared
//! order. Across phases the sequence is strict: the runtime is invoked
//! only after every backend apply succeeded, so a workload never deploys
//! against a partially-resolved environment. Destroy reverses the deploy
//! order: runtime teardown first, then each configured backend.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use deskribe_adapters::{
    AdapterError, AdapterRegistry, CancelToken, PlanContext, ProviderContext, ValidationReport,
};
use deskribe_config::{load_environment, load_manifest, load_platform, Manifest};
use deskribe_refs::{extract_references, resolve_references, validate_references};

use crate::error::EngineError;
use crate::merge::{expand_namespace, merge_workload};
use crate::plan::{ApplyOutcome, DeskribePlan, DestroyOutcome};
use crate::policy::validate_policies;

/// Tracing target for engine operations.
const ENGINE_TARGET: &str = "deskribe_engine::engine";

/// Identifies the documents and environment a command operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTarget {
    /// Path of the developer manifest.
    pub manifest_path: PathBuf,
    /// Directory holding `base.json` and `envs/`.
    pub platform_dir: PathBuf,
    /// Environment name the command targets.
    pub environment: String,
}

impl CommandTarget {
    /// Creates a command target.
    #[must_use]
    pub fn new(
        manifest_path: impl Into<PathBuf>,
        platform_dir: impl Into<PathBuf>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            manifest_path: manifest_path.into(),
            platform_dir: platform_dir.into(),
            environment: environment.into(),
        }
    }
}

/// The manifest orchestration engine.
///
/// Owns the adapter registry, which must be fully populated before the
/// first command runs; registration is a plain sequence of calls at
/// startup and the registry is read-only afterwards.
#[derive(Debug)]
pub struct Engine {
    registry: AdapterRegistry,
}

impl Engine {
    /// Creates an engine over a populated registry.
    #[must_use]
    pub fn new(registry: AdapterRegistry) -> Self {
        Self { registry }
    }

    /// Returns the adapter registry.
    #[must_use]
    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Statically checks a manifest against the platform configuration.
    ///
    /// Aggregates policy findings, reference findings, and per-resource
    /// provider findings into one report. Policy errors stop the pass
    /// early; otherwise every check contributes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] when loading any input document
    /// fails. Validation findings are data, not errors: they arrive in the
    /// returned report.
    pub fn validate(&self, target: &CommandTarget) -> Result<ValidationReport, EngineError> {
        let (manifest, platform, loaded_env) = self.load(target)?;

        let mut report = validate_policies(&manifest, &platform, &loaded_env.config);
        if loaded_env.overlay_missing {
            report.push_warning(overlay_missing_warning(target));
        }
        if !report.is_valid() {
            debug!(
                target: ENGINE_TARGET,
                errors = report.errors.len(),
                "policy validation failed, skipping provider validation"
            );
            return Ok(report);
        }

        if let Some(service) = manifest.primary_service() {
            let declared = manifest.declared_types();
            let references = extract_references(&service.env);
            for issue in validate_references(&references, declared.iter().copied()) {
                report.push_error(issue.to_string());
            }
        }

        let context = ProviderContext {
            platform: &platform,
            environment: &target.environment,
        };
        for resource in &manifest.resources {
            let resource_type = resource.resource_type();
            match self.registry.resource_provider(resource_type) {
                None => report.push_error(format!(
                    "no resource provider registered for type '{resource_type}'"
                )),
                Some(provider) => report.merge(provider.validate(resource, &context)),
            }
            if let Some(messaging) = self.registry.messaging_provider(resource_type) {
                report.merge(messaging.validate(resource, &context));
            }
        }

        report.dedupe();
        Ok(report)
    }

    /// Computes the full execution plan for one environment.
    ///
    /// Planning is a pure projection: providers must not contact external
    /// systems, so planning identical inputs yields an equal plan.
    /// Resources without a registered provider are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] when loading fails and
    /// [`EngineError::ValidationFailed`] when policy or reference
    /// validation produced errors.
    pub fn plan(
        &self,
        target: &CommandTarget,
        images: &BTreeMap<String, String>,
    ) -> Result<DeskribePlan, EngineError> {
        let (manifest, platform, loaded_env) = self.load(target)?;

        let mut report = validate_policies(&manifest, &platform, &loaded_env.config);
        if let Some(service) = manifest.primary_service() {
            let declared = manifest.declared_types();
            let references = extract_references(&service.env);
            for issue in validate_references(&references, declared.iter().copied()) {
                report.push_error(issue.to_string());
            }
        }
        report.dedupe();
        if !report.is_valid() {
            return Err(EngineError::ValidationFailed { report });
        }

        let mut warnings = report.warnings;
        if loaded_env.overlay_missing {
            warnings.push(overlay_missing_warning(target));
        }

        let merge = merge_workload(
            &manifest,
            &platform,
            &loaded_env.config,
            &target.environment,
            images,
        );
        warnings.extend(merge.warnings);

        let context = PlanContext {
            platform: &platform,
            env_config: &loaded_env.config,
            environment: &target.environment,
            app_name: &manifest.name,
        };
        let mut resource_plans = Vec::with_capacity(manifest.resources.len());
        for resource in &manifest.resources {
            let resource_type = resource.resource_type();
            let Some(provider) = self.registry.resource_provider(resource_type) else {
                warn!(
                    target: ENGINE_TARGET,
                    resource_type,
                    "no provider registered, skipping resource"
                );
                warnings.push(format!(
                    "skipping resource type '{resource_type}': no provider registered"
                ));
                continue;
            };
            let mut resource_plan = provider.plan(resource, &context);
            if let Some(messaging) = self.registry.messaging_provider(resource_type) {
                resource_plan = resource_plan.merged_with(messaging.plan(resource, &context));
            }
            debug!(
                target: ENGINE_TARGET,
                resource_type,
                action = %resource_plan.action,
                "planned resource"
            );
            resource_plans.push(resource_plan);
        }

        Ok(DeskribePlan {
            app_name: manifest.name.clone(),
            environment: target.environment.clone(),
            platform,
            environment_config: loaded_env.config,
            resource_plans,
            workload: merge.workload,
            warnings,
        })
    }

    /// Provisions the plan's resources and deploys its workload.
    ///
    /// Backends run sequentially in declared order; the first failure
    /// aborts the command so the runtime never observes an
    /// incompletely-resolved environment. After every backend succeeded,
    /// reference expressions are substituted with the aggregated outputs
    /// and the runtime renders and deploys the workload. A configured but
    /// unregistered runtime is a warning, not an error: the infrastructure
    /// stays applied and deployment is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::BackendApplyFailed`] on the first backend
    /// failure (including a missing backend route or adapter),
    /// [`EngineError::RuntimeApplyFailed`] when rendering or deployment
    /// fails, and [`EngineError::Cancelled`] when cancellation is
    /// observed.
    pub fn apply(
        &self,
        plan: &DeskribePlan,
        cancel: &CancelToken,
    ) -> Result<ApplyOutcome, EngineError> {
        let backends = plan.effective_backends();
        let mut outputs: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        let mut warnings = Vec::new();

        for resource_plan in &plan.resource_plans {
            ensure_active(cancel)?;
            let resource_type = resource_plan.resource_type.as_str();
            let backend_name = backends.get(resource_type).ok_or_else(|| backend_failed(
                resource_type,
                format!("no backend configured for resource type '{resource_type}'"),
            ))?;
            let adapter = self.registry.backend(backend_name).ok_or_else(|| {
                backend_failed(
                    resource_type,
                    format!("backend '{backend_name}' is not registered"),
                )
            })?;

            info!(
                target: ENGINE_TARGET,
                resource_type,
                backend = %backend_name,
                "applying resource plan"
            );
            let result = adapter.apply(resource_plan, cancel).map_err(|error| {
                match error {
                    AdapterError::Cancelled => EngineError::Cancelled,
                    other => backend_failed(resource_type, other.to_string()),
                }
            })?;
            if !result.is_success() {
                return Err(EngineError::BackendApplyFailed {
                    resource_type: resource_type.to_owned(),
                    errors: result.errors().to_vec(),
                });
            }
            for (kind, properties) in result.into_resource_outputs() {
                outputs.entry(kind).or_default().extend(properties);
            }
        }

        let resolved_workload = match &plan.workload {
            None => {
                warnings.push(String::from(
                    "manifest declares no services; runtime deployment skipped",
                ));
                None
            }
            Some(workload) => {
                let resolved = resolve_references(&workload.environment_variables, &outputs);
                for warning in &resolved.warnings {
                    warn!(target: ENGINE_TARGET, %warning, "reference left unresolved");
                    warnings.push(warning.to_string());
                }
                Some(workload.with_environment_variables(resolved.env))
            }
        };

        let mut rendered = None;
        if let Some(workload) = &resolved_workload {
            let runtime_name = plan.platform.defaults.runtime.as_str();
            match self.registry.runtime(runtime_name) {
                None => {
                    warn!(
                        target: ENGINE_TARGET,
                        runtime = runtime_name,
                        "runtime not registered, skipping deployment"
                    );
                    warnings.push(format!(
                        "runtime '{runtime_name}' is not registered; deployment skipped"
                    ));
                }
                Some(runtime) => {
                    ensure_active(cancel)?;
                    let manifest = runtime
                        .render(workload)
                        .map_err(|error| runtime_failed(runtime_name, error))?;
                    runtime
                        .apply(&manifest, cancel)
                        .map_err(|error| runtime_failed(runtime_name, error))?;
                    info!(
                        target: ENGINE_TARGET,
                        runtime = runtime_name,
                        namespace = %manifest.namespace,
                        "workload deployed"
                    );
                    rendered = Some(manifest);
                }
            }
        }

        Ok(ApplyOutcome {
            resource_outputs: outputs,
            workload: resolved_workload,
            manifest: rendered,
            warnings,
        })
    }

    /// Tears down the application's workload and infrastructure.
    ///
    /// Runtime teardown runs first, then every backend named in the
    /// platform routing. Teardown is best-effort: individual failures are
    /// logged and collected as warnings so one failing resource does not
    /// block the rest.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] when loading fails and
    /// [`EngineError::Cancelled`] when cancellation is observed.
    pub fn destroy(
        &self,
        target: &CommandTarget,
        cancel: &CancelToken,
    ) -> Result<DestroyOutcome, EngineError> {
        let manifest = load_manifest(&target.manifest_path)?;
        let platform = load_platform(&target.platform_dir)?;
        let namespace = expand_namespace(
            &platform.defaults.namespace_pattern,
            &manifest.name,
            &target.environment,
        );
        let mut warnings = Vec::new();

        match self.registry.runtime(&platform.defaults.runtime) {
            None => warnings.push(format!(
                "runtime '{}' is not registered; workload teardown skipped",
                platform.defaults.runtime
            )),
            Some(runtime) => {
                ensure_active(cancel)?;
                if let Err(error) = runtime.destroy(&namespace, cancel) {
                    if matches!(error, AdapterError::Cancelled) {
                        return Err(EngineError::Cancelled);
                    }
                    warn!(
                        target: ENGINE_TARGET,
                        namespace = %namespace,
                        %error,
                        "runtime destroy failed"
                    );
                    warnings.push(format!(
                        "runtime destroy failed for namespace '{namespace}': {error}"
                    ));
                }
            }
        }

        for (resource_type, backend_name) in &platform.backends {
            ensure_active(cancel)?;
            let Some(adapter) = self.registry.backend(backend_name) else {
                warnings.push(format!(
                    "backend '{backend_name}' is not registered; resources of type '{resource_type}' were not destroyed"
                ));
                continue;
            };
            if let Err(error) =
                adapter.destroy(&manifest.name, &target.environment, &platform, cancel)
            {
                if matches!(error, AdapterError::Cancelled) {
                    return Err(EngineError::Cancelled);
                }
                warn!(
                    target: ENGINE_TARGET,
                    resource_type = %resource_type,
                    backend = %backend_name,
                    %error,
                    "backend destroy failed"
                );
                warnings.push(format!(
                    "backend '{backend_name}' failed to destroy resources of type '{resource_type}': {error}"
                ));
            }
        }

        Ok(DestroyOutcome {
            namespace,
            warnings,
        })
    }

    fn load(
        &self,
        target: &CommandTarget,
    ) -> Result<
        (
            Manifest,
            deskribe_config::PlatformConfig,
            deskribe_config::LoadedEnvironment,
        ),
        EngineError,
    > {
        let manifest = load_manifest(&target.manifest_path)?;
        let platform = load_platform(&target.platform_dir)?;
        let loaded_env = load_environment(&target.platform_dir, &target.environment)?;
        debug!(
            target: ENGINE_TARGET,
            app = %manifest.name,
            environment = %target.environment,
            resources = manifest.resources.len(),
            "documents loaded"
        );
        Ok((manifest, platform, loaded_env))
    }
}

fn overlay_missing_warning(target: &CommandTarget) -> String {
    format!(
        "no overlay found for environment '{}'; platform defaults apply unchanged",
        target.environment
    )
}

fn backend_failed(resource_type: &str, message: String) -> EngineError {
    EngineError::BackendApplyFailed {
        resource_type: resource_type.to_owned(),
        errors: vec![message],
    }
}

fn runtime_failed(runtime: &str, error: AdapterError) -> EngineError {
    match error {
        AdapterError::Cancelled => EngineError::Cancelled,
        other => EngineError::RuntimeApplyFailed {
            runtime: runtime.to_owned(),
            message: other.to_string(),
        },
    }
}

fn ensure_active(cancel: &CancelToken) -> Result<(), EngineError> {
    cancel.ensure_active().map_err(|_| EngineError::Cancelled)
}
