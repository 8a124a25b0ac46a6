//! The four adapter capability contracts.
//!
//! Providers are pure: validation and planning must not perform I/O and
//! must be deterministic for identical inputs. Backend and runtime
//! adapters may perform I/O; every I/O-capable operation takes a
//! [`CancelToken`] and is expected to abort at its next suspension point
//! once cancellation is requested. The core never rolls back committed
//! side effects.
//!
//! All contracts are `Send + Sync` so a populated registry can be shared
//! across threads without locking once startup registration completes.

use deskribe_config::{EnvironmentConfig, PlatformConfig, Resource};

use crate::cancel::CancelToken;
use crate::error::AdapterError;
use crate::records::{
    BackendApplyResult, ResourcePlanResult, ValidationReport, WorkloadManifest, WorkloadPlan,
};

/// Context handed to providers during validation.
#[derive(Debug, Clone, Copy)]
pub struct ProviderContext<'a> {
    /// The platform base configuration.
    pub platform: &'a PlatformConfig,
    /// The environment the command targets.
    pub environment: &'a str,
}

/// Context handed to providers during planning.
#[derive(Debug, Clone, Copy)]
pub struct PlanContext<'a> {
    /// The platform base configuration.
    pub platform: &'a PlatformConfig,
    /// The environment overlay in effect.
    pub env_config: &'a EnvironmentConfig,
    /// The environment the command targets.
    pub environment: &'a str,
    /// The application name from the manifest.
    pub app_name: &'a str,
}

/// Validates and plans one resource type.
///
/// Implementations register under their [`resource_type`] tag and are
/// resolved per declared resource during validation and planning.
///
/// [`resource_type`]: ResourceProvider::resource_type
pub trait ResourceProvider: Send + Sync {
    /// The resource type tag this provider handles (registration key).
    fn resource_type(&self) -> &str;

    /// Statically checks a declared resource. Pure; must not perform I/O.
    fn validate(&self, resource: &Resource, context: &ProviderContext<'_>) -> ValidationReport;

    /// Projects a declared resource into a plan. Pure and deterministic
    /// for identical inputs.
    fn plan(&self, resource: &Resource, context: &PlanContext<'_>) -> ResourcePlanResult;
}

/// Provisions planned resources through an infrastructure driver.
pub trait BackendAdapter: Send + Sync {
    /// The backend name this adapter registers under (registration key).
    fn name(&self) -> &str;

    /// Applies one resource plan, returning the resolved outputs.
    ///
    /// Implementations must populate the outputs for the resource type
    /// they applied; properties the workload references but the backend
    /// omits surface later as unresolved-reference warnings.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Cancelled`] when cancellation is observed,
    /// or [`AdapterError::Operation`] for driver failures that produced no
    /// structured result.
    fn apply(
        &self,
        plan: &ResourcePlanResult,
        cancel: &CancelToken,
    ) -> Result<BackendApplyResult, AdapterError>;

    /// Tears down whatever this backend provisioned for the application.
    ///
    /// Best-effort and idempotent; the engine logs failures and continues
    /// with the remaining backends.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when teardown fails or is cancelled.
    fn destroy(
        &self,
        app_name: &str,
        environment: &str,
        platform: &PlatformConfig,
        cancel: &CancelToken,
    ) -> Result<(), AdapterError>;
}

/// Deploys resolved workload plans through a runtime driver.
pub trait RuntimeAdapter: Send + Sync {
    /// The runtime name this adapter registers under (registration key).
    fn name(&self) -> &str;

    /// Renders a resolved workload plan into a deployable artefact
    /// description. Pure transformation.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Operation`] when the plan cannot be
    /// rendered.
    fn render(&self, workload: &WorkloadPlan) -> Result<WorkloadManifest, AdapterError>;

    /// Deploys a rendered manifest. Create-or-update: applying the same
    /// inputs twice is idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when deployment fails or is cancelled.
    fn apply(&self, manifest: &WorkloadManifest, cancel: &CancelToken)
        -> Result<(), AdapterError>;

    /// Removes the workload deployed into the given namespace. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when teardown fails or is cancelled.
    fn destroy(&self, namespace: &str, cancel: &CancelToken) -> Result<(), AdapterError>;
}

/// Specialised validation and planning for messaging resources.
///
/// Consulted in addition to the resource provider when one is registered
/// under a matching type: findings merge into the validation report, and
/// planned outputs and configuration (topic settings, ACLs) merge into the
/// provider's plan.
pub trait MessagingProvider: Send + Sync {
    /// The provider type tag this provider handles (registration key).
    fn provider_type(&self) -> &str;

    /// Runs messaging-specific checks such as minimum partition counts.
    /// Pure; must not perform I/O.
    fn validate(&self, resource: &Resource, context: &ProviderContext<'_>) -> ValidationReport;

    /// Plans messaging-specific configuration such as topic ACLs. Pure and
    /// deterministic for identical inputs.
    fn plan(&self, resource: &Resource, context: &PlanContext<'_>) -> ResourcePlanResult;
}
