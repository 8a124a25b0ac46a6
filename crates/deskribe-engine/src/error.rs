//! Errors raised by the orchestration engine.

use thiserror::Error;

use deskribe_adapters::ValidationReport;
use deskribe_config::ConfigError;

/// Failures surfaced by engine commands.
///
/// Pre-apply phases aggregate findings into [`ValidationReport`]s; the
/// variants here are the hard stops. Apply short-circuits on the first
/// backend failure so the runtime never deploys against incomplete
/// infrastructure.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Loading one of the input documents failed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation produced errors that gate planning.
    #[error("validation failed with {} error(s)", report.errors.len())]
    ValidationFailed {
        /// The aggregate findings, errors first.
        report: ValidationReport,
    },

    /// A backend adapter failed to provision a resource.
    #[error("backend apply failed for resource type '{resource_type}': {}", errors.join("; "))]
    BackendApplyFailed {
        /// Resource type whose apply failed.
        resource_type: String,
        /// Failure descriptions reported by the backend.
        errors: Vec<String>,
    },

    /// The runtime adapter failed to render or deploy the workload.
    #[error("runtime '{runtime}' failed to deploy the workload: {message}")]
    RuntimeApplyFailed {
        /// Runtime adapter name.
        runtime: String,
        /// Failure description.
        message: String,
    },

    /// The command observed a cancellation request.
    ///
    /// Side effects already committed by backends or runtimes are not
    /// rolled back.
    #[error("command cancelled before completion")]
    Cancelled,
}
