//! Process-wide adapter registry.
//!
//! The registry holds the four capability tables, each keyed by the
//! adapter's string identifier. It is populated by a plain sequence of
//! registration calls at startup and treated as read-only thereafter, so
//! concurrent readers need no locking. Registration is last-wins:
//! replacing an existing key succeeds and emits a warning rather than
//! failing, which lets embedders override a stock adapter deliberately.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::contract::{BackendAdapter, MessagingProvider, ResourceProvider, RuntimeAdapter};

/// Tracing target for registry operations.
const REGISTRY_TARGET: &str = "deskribe_adapters::registry";

/// Registry of the four adapter capability kinds.
///
/// # Example
///
/// ```
/// use deskribe_adapters::{AdapterRegistry, ResourceProvider, ProviderContext, PlanContext};
/// use deskribe_adapters::{PlanAction, ResourcePlanResult, ValidationReport};
/// use deskribe_config::Resource;
/// use std::sync::Arc;
///
/// struct PostgresProvider;
///
/// impl ResourceProvider for PostgresProvider {
///     fn resource_type(&self) -> &str {
///         "postgres"
///     }
///     fn validate(&self, _: &Resource, _: &ProviderContext<'_>) -> ValidationReport {
///         ValidationReport::new()
///     }
///     fn plan(&self, _: &Resource, _: &PlanContext<'_>) -> ResourcePlanResult {
///         ResourcePlanResult::new("postgres", PlanAction::Create)
///     }
/// }
///
/// let mut registry = AdapterRegistry::new();
/// registry.register_resource_provider(Arc::new(PostgresProvider));
/// assert!(registry.resource_provider("postgres").is_some());
/// ```
#[derive(Default)]
pub struct AdapterRegistry {
    resource_providers: BTreeMap<String, Arc<dyn ResourceProvider>>,
    backends: BTreeMap<String, Arc<dyn BackendAdapter>>,
    runtimes: BTreeMap<String, Arc<dyn RuntimeAdapter>>,
    messaging_providers: BTreeMap<String, Arc<dyn MessagingProvider>>,
}

impl AdapterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resource provider under its declared type.
    pub fn register_resource_provider(&mut self, provider: Arc<dyn ResourceProvider>) {
        let key = provider.resource_type().to_owned();
        if self.resource_providers.insert(key.clone(), provider).is_some() {
            warn_replaced("resource provider", &key);
        }
    }

    /// Registers a backend adapter under its name.
    pub fn register_backend(&mut self, backend: Arc<dyn BackendAdapter>) {
        let key = backend.name().to_owned();
        if self.backends.insert(key.clone(), backend).is_some() {
            warn_replaced("backend adapter", &key);
        }
    }

    /// Registers a runtime adapter under its name.
    pub fn register_runtime(&mut self, runtime: Arc<dyn RuntimeAdapter>) {
        let key = runtime.name().to_owned();
        if self.runtimes.insert(key.clone(), runtime).is_some() {
            warn_replaced("runtime adapter", &key);
        }
    }

    /// Registers a messaging provider under its provider type.
    pub fn register_messaging_provider(&mut self, provider: Arc<dyn MessagingProvider>) {
        let key = provider.provider_type().to_owned();
        if self
            .messaging_providers
            .insert(key.clone(), provider)
            .is_some()
        {
            warn_replaced("messaging provider", &key);
        }
    }

    /// Looks up a resource provider by type tag.
    #[must_use]
    pub fn resource_provider(&self, resource_type: &str) -> Option<&Arc<dyn ResourceProvider>> {
        self.resource_providers.get(resource_type)
    }

    /// Looks up a backend adapter by name.
    #[must_use]
    pub fn backend(&self, name: &str) -> Option<&Arc<dyn BackendAdapter>> {
        self.backends.get(name)
    }

    /// Looks up a runtime adapter by name.
    #[must_use]
    pub fn runtime(&self, name: &str) -> Option<&Arc<dyn RuntimeAdapter>> {
        self.runtimes.get(name)
    }

    /// Looks up a messaging provider by provider type.
    #[must_use]
    pub fn messaging_provider(&self, provider_type: &str) -> Option<&Arc<dyn MessagingProvider>> {
        self.messaging_providers.get(provider_type)
    }

    /// Returns the set of registered resource-provider types.
    ///
    /// Exposed for the reference validator, which needs to know which
    /// declared types have a provider behind them.
    #[must_use]
    pub fn provider_types(&self) -> BTreeSet<&str> {
        self.resource_providers.keys().map(String::as_str).collect()
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AdapterRegistry")
            .field(
                "resource_providers",
                &self.resource_providers.keys().collect::<Vec<_>>(),
            )
            .field("backends", &self.backends.keys().collect::<Vec<_>>())
            .field("runtimes", &self.runtimes.keys().collect::<Vec<_>>())
            .field(
                "messaging_providers",
                &self.messaging_providers.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn warn_replaced(kind: &str, key: &str) {
    warn!(
        target: REGISTRY_TARGET,
        kind,
        key,
        "replacing previously registered adapter"
    );
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use rstest::{fixture, rstest};

    use deskribe_config::Resource;

    use super::*;
    use crate::cancel::CancelToken;
    use crate::contract::{PlanContext, ProviderContext};
    use crate::error::AdapterError;
    use crate::records::{
        BackendApplyResult, PlanAction, ResourcePlanResult, ValidationReport, WorkloadManifest,
        WorkloadPlan,
    };

    struct StubProvider {
        resource_type: &'static str,
    }

    impl ResourceProvider for StubProvider {
        fn resource_type(&self) -> &str {
            self.resource_type
        }

        fn validate(&self, _: &Resource, _: &ProviderContext<'_>) -> ValidationReport {
            ValidationReport::new()
        }

        fn plan(&self, _: &Resource, _: &PlanContext<'_>) -> ResourcePlanResult {
            ResourcePlanResult::new(self.resource_type, PlanAction::Create)
        }
    }

    struct StubBackend {
        name: &'static str,
    }

    impl BackendAdapter for StubBackend {
        fn name(&self) -> &str {
            self.name
        }

        fn apply(
            &self,
            _: &ResourcePlanResult,
            _: &CancelToken,
        ) -> Result<BackendApplyResult, AdapterError> {
            Ok(BackendApplyResult::success(BTreeMap::new()))
        }

        fn destroy(
            &self,
            _: &str,
            _: &str,
            _: &deskribe_config::PlatformConfig,
            _: &CancelToken,
        ) -> Result<(), AdapterError> {
            Ok(())
        }
    }

    struct StubRuntime;

    impl RuntimeAdapter for StubRuntime {
        fn name(&self) -> &str {
            "kubernetes"
        }

        fn render(&self, workload: &WorkloadPlan) -> Result<WorkloadManifest, AdapterError> {
            Ok(WorkloadManifest {
                namespace: workload.namespace.clone(),
                yaml: String::new(),
                resource_names: Vec::new(),
            })
        }

        fn apply(&self, _: &WorkloadManifest, _: &CancelToken) -> Result<(), AdapterError> {
            Ok(())
        }

        fn destroy(&self, _: &str, _: &CancelToken) -> Result<(), AdapterError> {
            Ok(())
        }
    }

    #[fixture]
    fn populated() -> AdapterRegistry {
        let mut registry = AdapterRegistry::new();
        registry.register_resource_provider(Arc::new(StubProvider {
            resource_type: "postgres",
        }));
        registry.register_resource_provider(Arc::new(StubProvider {
            resource_type: "redis",
        }));
        registry.register_backend(Arc::new(StubBackend { name: "pulumi" }));
        registry.register_runtime(Arc::new(StubRuntime));
        registry
    }

    #[test]
    fn new_registry_is_empty() {
        let registry = AdapterRegistry::new();
        assert!(registry.provider_types().is_empty());
        assert!(registry.backend("pulumi").is_none());
    }

    #[rstest]
    fn lookup_returns_registered_adapters(populated: AdapterRegistry) {
        assert!(populated.resource_provider("postgres").is_some());
        assert!(populated.backend("pulumi").is_some());
        assert!(populated.runtime("kubernetes").is_some());
        assert!(populated.resource_provider("mongo").is_none());
        assert!(populated.messaging_provider("kafka").is_none());
    }

    #[rstest]
    fn provider_types_reflect_registrations(populated: AdapterRegistry) {
        let types: Vec<&str> = populated.provider_types().into_iter().collect();
        assert_eq!(types, vec!["postgres", "redis"]);
    }

    #[test]
    fn registration_is_last_wins() {
        struct CountingProvider {
            marker: u32,
        }

        impl ResourceProvider for CountingProvider {
            fn resource_type(&self) -> &str {
                "postgres"
            }

            fn validate(&self, _: &Resource, _: &ProviderContext<'_>) -> ValidationReport {
                ValidationReport::new()
            }

            fn plan(&self, _: &Resource, _: &PlanContext<'_>) -> ResourcePlanResult {
                ResourcePlanResult::new("postgres", PlanAction::Create)
                    .with_configuration("marker", serde_json::json!(self.marker))
            }
        }

        let mut registry = AdapterRegistry::new();
        registry.register_resource_provider(Arc::new(CountingProvider { marker: 1 }));
        registry.register_resource_provider(Arc::new(CountingProvider { marker: 2 }));

        let provider = registry
            .resource_provider("postgres")
            .expect("provider registered");
        let platform = test_platform();
        let env_config = deskribe_config::EnvironmentConfig::named("dev");
        let plan = provider.plan(
            &Resource::Postgres(deskribe_config::PostgresResource::default()),
            &PlanContext {
                platform: &platform,
                env_config: &env_config,
                environment: "dev",
                app_name: "svc",
            },
        );
        assert_eq!(plan.configuration["marker"], serde_json::json!(2));
    }

    fn test_platform() -> deskribe_config::PlatformConfig {
        deskribe_config::PlatformConfig {
            organization: None,
            defaults: deskribe_config::PlatformDefaults {
                runtime: "kubernetes".into(),
                region: "eu-west-1".into(),
                replicas: 2,
                cpu: "250m".into(),
                memory: "512Mi".into(),
                namespace_pattern: "{app}-{env}".into(),
                ha: None,
                secrets_strategy: deskribe_config::SecretsStrategy::Opaque,
                external_secrets_store: None,
            },
            backends: BTreeMap::new(),
            policies: deskribe_config::PlatformPolicies::default(),
        }
    }
}
