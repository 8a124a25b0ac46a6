//! Static policy checks on the merged configuration.
//!
//! The policy validator runs after loading and before per-resource provider
//! validation. Checks are independent and their findings aggregate; a
//! single run reports everything it can find rather than stopping at the
//! first failure. Errors from this stage gate planning, warnings do not.

use deskribe_adapters::ValidationReport;
use deskribe_config::{EnvironmentConfig, Manifest, PlatformConfig, SecretsStrategy};
use deskribe_refs::{extract_references, validate_references};

/// Runs every policy check and returns the aggregate report.
#[must_use]
pub fn validate_policies(
    manifest: &Manifest,
    platform: &PlatformConfig,
    env_config: &EnvironmentConfig,
) -> ValidationReport {
    let mut report = ValidationReport::new();
    check_manifest_name(manifest, &mut report);
    check_backend_coverage(manifest, platform, env_config, &mut report);
    check_reference_targets(manifest, &mut report);
    check_allowed_regions(platform, env_config, &mut report);
    check_secrets_strategy(platform, env_config, &mut report);
    report
}

fn check_manifest_name(manifest: &Manifest, report: &mut ValidationReport) {
    if manifest.name.trim().is_empty() {
        report.push_error("manifest name must not be blank");
    }
}

/// Every declared resource type needs a backend route in the platform base
/// or the environment overlay. Missing coverage is a warning: validation
/// and planning still work, only apply would fail.
fn check_backend_coverage(
    manifest: &Manifest,
    platform: &PlatformConfig,
    env_config: &EnvironmentConfig,
    report: &mut ValidationReport,
) {
    for resource in &manifest.resources {
        let resource_type = resource.resource_type();
        if !platform.backends.contains_key(resource_type)
            && !env_config.backends.contains_key(resource_type)
        {
            report.push_warning(format!(
                "resource type '{resource_type}' has no backend mapping in platform or environment configuration"
            ));
        }
    }
}

/// Cross-checks env values against declared resource types. The engine
/// runs the reference validator as well; this duplicate stays for defence
/// in depth and duplicate findings are dropped when reports merge.
fn check_reference_targets(manifest: &Manifest, report: &mut ValidationReport) {
    let Some(service) = manifest.primary_service() else {
        return;
    };
    let declared = manifest.declared_types();
    let references = extract_references(&service.env);
    for issue in validate_references(&references, declared.iter().copied()) {
        report.push_error(issue.to_string());
    }
}

fn check_allowed_regions(
    platform: &PlatformConfig,
    env_config: &EnvironmentConfig,
    report: &mut ValidationReport,
) {
    let allowed = &platform.policies.allowed_regions;
    if allowed.is_empty() {
        return;
    }
    let effective_region = env_config
        .defaults
        .region
        .as_deref()
        .unwrap_or(&platform.defaults.region);
    if !allowed.iter().any(|region| region == effective_region) {
        report.push_error(format!(
            "region '{effective_region}' is not in the allowed regions [{}]",
            allowed.join(", ")
        ));
    }
}

fn check_secrets_strategy(
    platform: &PlatformConfig,
    env_config: &EnvironmentConfig,
    report: &mut ValidationReport,
) {
    let strategy = env_config
        .defaults
        .secrets_strategy
        .unwrap_or(platform.defaults.secrets_strategy);
    let store = env_config
        .defaults
        .external_secrets_store
        .as_deref()
        .or(platform.defaults.external_secrets_store.as_deref());
    if strategy == SecretsStrategy::ExternalSecrets && store.is_none() {
        report.push_error(
            "secrets strategy 'external-secrets' requires an external secrets store",
        );
    }
}
